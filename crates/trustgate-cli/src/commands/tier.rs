//! `trustgate tier` — Show an identity's tier and next-tier progress.

use clap::Args;

use trustgate_client::TierProgress;

use super::{parse_address, SnapshotArgs};

#[derive(Args, Debug)]
pub struct TierArgs {
    /// Identity address (0x-prefixed, 40 hex characters).
    pub address: String,

    #[command(flatten)]
    pub snapshot: SnapshotArgs,
}

pub async fn run(args: &TierArgs) -> anyhow::Result<()> {
    let subject = parse_address(&args.address)?;
    let (client, network) = args.snapshot.open()?;

    let info = client.tier_info(&subject, &network).await;

    if args.snapshot.json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("Tier for {}:", subject);
    println!("  Tier: {} ({})", info.tier.level(), info.name);

    match (info.next_tier, &info.progress) {
        (Some(next), Some(progress)) => {
            println!("  Progress toward {} ({}):", next.level(), next.name());
            print_progress(progress);
        }
        _ => println!("  At maximum tier."),
    }

    Ok(())
}

pub(super) fn print_progress(progress: &TierProgress) {
    let rows = [
        ("Attestations", &progress.attestations),
        ("Vouches", &progress.vouches),
        ("Approval %", &progress.approval_rate),
        ("Days active", &progress.days_active),
    ];
    for (label, row) in rows {
        let mark = if row.met { "✓" } else { "✗" };
        println!("    {} {:<13} {:.0}/{:.0}", mark, label, row.current, row.required);
    }
}
