use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use std::path::PathBuf;

use crate::commands::common::Core;
use crate::models::Expert;

#[derive(ClapArgs)]
pub struct Args {
    /// YAML file holding the full expert roster
    pub file: PathBuf,
}

/// Replaces the expert roster. Onboarding and editing happen outside the
/// engine; this is the hand-off point for whatever produces the roster.
pub async fn execute(args: Args) -> Result<()> {
    let core = Core::open().await?;

    let content = tokio::fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("Failed to read roster file: {:?}", args.file))?;
    let experts: Vec<Expert> = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse roster file: {:?}", args.file))?;

    core.experts.save_all(&experts).await?;
    println!("Imported {} experts.", experts.len());
    Ok(())
}
