//! `trustgate progress` — Show per-requirement progress toward a tier.

use clap::Args;

use trustgate_core::Tier;

use super::{parse_address, tier::print_progress, SnapshotArgs};

#[derive(Args, Debug)]
pub struct ProgressArgs {
    /// Identity address (0x-prefixed, 40 hex characters).
    pub address: String,

    /// Target tier level, 0-4; defaults to the tier above the current one.
    #[arg(short, long)]
    pub target: Option<u8>,

    #[command(flatten)]
    pub snapshot: SnapshotArgs,
}

pub async fn run(args: &ProgressArgs) -> anyhow::Result<()> {
    let subject = parse_address(&args.address)?;
    let (client, network) = args.snapshot.open()?;

    let target = match args.target {
        Some(level) => Tier::from_level(level)?,
        None => {
            let current = client.tier(&subject, &network).await;
            match current.next() {
                Some(next) => next,
                None => {
                    println!("{} is already at the maximum tier.", subject);
                    return Ok(());
                }
            }
        }
    };

    let progress = client.tier_progress(&subject, &network, target).await;

    if args.snapshot.json {
        println!("{}", serde_json::to_string_pretty(&progress)?);
        return Ok(());
    }

    println!(
        "Progress of {} toward tier {} ({}):",
        subject,
        target.level(),
        target.name()
    );
    print_progress(&progress);

    Ok(())
}
