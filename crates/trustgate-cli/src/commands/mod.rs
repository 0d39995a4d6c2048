pub mod gate;
pub mod progress;
pub mod score;
pub mod tier;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;

use trustgate_core::Address;
use trustgate_client::{SnapshotSource, TrustClient};

/// Arguments shared by every subcommand: where the claims come from and how
/// to print the result.
#[derive(Args, Debug)]
pub struct SnapshotArgs {
    /// Path to an attestation snapshot JSON file.
    #[arg(short, long)]
    pub snapshot: PathBuf,

    /// Network to query; defaults to the snapshot's own network.
    #[arg(short, long)]
    pub network: Option<String>,

    /// Emit machine-readable JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

impl SnapshotArgs {
    /// Load the snapshot and build a client over it.
    pub fn open(&self) -> anyhow::Result<(TrustClient, String)> {
        let source = SnapshotSource::from_path(&self.snapshot)?;
        let network = self
            .network
            .clone()
            .unwrap_or_else(|| source.network().to_string());
        Ok((TrustClient::new(Arc::new(source)), network))
    }
}

pub fn parse_address(raw: &str) -> anyhow::Result<Address> {
    Ok(Address::parse(raw)?)
}
