use anyhow::Result;
use clap::Args as ClapArgs;

use crate::commands::common::Core;

#[derive(ClapArgs)]
pub struct Args {
    /// Consultation to close out
    pub consultation_id: String,
}

pub async fn execute(args: Args) -> Result<()> {
    let core = Core::open().await?;
    let consultation = core.registry().complete(&args.consultation_id).await?;
    println!("Consultation {} completed.", consultation.id);
    Ok(())
}
