use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args as ClapArgs;

use crate::commands::common::Core;

#[derive(ClapArgs)]
pub struct Args {
    /// What the consultation is about
    pub topic: String,

    /// Preferred time, RFC 3339 (e.g. 2026-09-01T10:00:00Z)
    #[arg(long)]
    pub scheduled_for: Option<String>,
}

pub async fn execute(args: Args) -> Result<()> {
    let core = Core::open().await?;

    let scheduled_for = args
        .scheduled_for
        .map(|s| {
            DateTime::parse_from_rfc3339(&s)
                .map(|dt| dt.with_timezone(&Utc))
                .with_context(|| format!("Invalid --scheduled-for timestamp: {s}"))
        })
        .transpose()?;

    let consultation = core
        .coordinator()
        .open_request(args.topic, scheduled_for)
        .await?;

    println!(
        "Opened consultation {} (pending, open to any consultant).",
        consultation.id
    );
    Ok(())
}
