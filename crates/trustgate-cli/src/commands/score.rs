//! `trustgate score` — Compute the trust score for an identity.

use clap::Args;

use super::{parse_address, SnapshotArgs};

#[derive(Args, Debug)]
pub struct ScoreArgs {
    /// Identity address (0x-prefixed, 40 hex characters).
    pub address: String,

    #[command(flatten)]
    pub snapshot: SnapshotArgs,
}

pub async fn run(args: &ScoreArgs) -> anyhow::Result<()> {
    let subject = parse_address(&args.address)?;
    let (client, network) = args.snapshot.open()?;

    let score = client.trust_score(&subject, &network).await;

    if args.snapshot.json {
        println!("{}", serde_json::to_string_pretty(&score)?);
        return Ok(());
    }

    println!("Trust score for {}:", subject);
    println!("  Score:        {:.1}", score.score);
    println!("  Confidence:   {:.2}", score.confidence);
    println!("  Attestations: {}", score.attestation_count);
    println!("  Verified:     {}", if score.verified { "yes" } else { "no" });
    if score.linked_platforms.is_empty() {
        println!("  Platforms:    (none)");
    } else {
        println!("  Platforms:    {}", score.linked_platforms.join(", "));
    }

    Ok(())
}
