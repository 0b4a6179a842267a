use anyhow::Result;
use clap::Args as ClapArgs;

use crate::commands::common::Core;

#[derive(ClapArgs)]
pub struct Args {
    /// Scheduled or in-progress consultation to provision a call for
    pub consultation_id: String,
}

pub async fn execute(args: Args) -> Result<()> {
    let core = Core::open().await?;
    let handle = core.initiator().initiate(&args.consultation_id).await?;
    println!("Call session for {}: {handle}", args.consultation_id);
    Ok(())
}
