use anyhow::Result;
use clap::Args as ClapArgs;

use crate::commands::common::Core;
use crate::utils::truncate_str;

#[derive(ClapArgs)]
pub struct Args {
    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn execute(args: Args) -> Result<()> {
    let core = Core::open().await?;
    let pending = core.registry().list_pending().await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&pending)?);
        return Ok(());
    }

    if pending.is_empty() {
        println!("No pending consultations.");
        return Ok(());
    }

    for c in pending {
        let when = c
            .scheduled_for
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "anytime".to_string());
        println!(
            "{:<34} {:<40} from {:<12} ({when})",
            c.id,
            truncate_str(&c.topic, 40),
            c.farmer_id,
        );
    }

    Ok(())
}
