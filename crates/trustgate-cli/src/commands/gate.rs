//! `trustgate gate` — Check whether an identity meets a minimum tier.
//!
//! Exits 0 when the identity qualifies and 1 when it does not, so the
//! command can gate scripts directly.

use clap::Args;
use serde::Serialize;

use super::{parse_address, SnapshotArgs};

#[derive(Args, Debug)]
pub struct GateArgs {
    /// Identity address (0x-prefixed, 40 hex characters).
    pub address: String,

    /// Minimum tier level required, 0-4.
    #[arg(short, long)]
    pub min_tier: u8,

    #[command(flatten)]
    pub snapshot: SnapshotArgs,
}

#[derive(Serialize)]
struct GateResult {
    address: String,
    min_tier: u8,
    tier: u8,
    allowed: bool,
}

pub async fn run(args: &GateArgs) -> anyhow::Result<()> {
    let subject = parse_address(&args.address)?;
    let (client, network) = args.snapshot.open()?;

    let allowed = client
        .meets_tier_level(&subject, &network, args.min_tier)
        .await?;
    let tier = client.tier(&subject, &network).await;

    if args.snapshot.json {
        let result = GateResult {
            address: subject.to_checksum(),
            min_tier: args.min_tier,
            tier: tier.level(),
            allowed,
        };
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!(
            "{} is tier {} ({}); minimum {}: {}",
            subject,
            tier.level(),
            tier.name(),
            args.min_tier,
            if allowed { "ALLOW" } else { "DENY" }
        );
    }

    if !allowed {
        std::process::exit(1);
    }
    Ok(())
}
