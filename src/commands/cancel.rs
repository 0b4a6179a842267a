use anyhow::Result;
use clap::Args as ClapArgs;

use crate::commands::common::Core;

#[derive(ClapArgs)]
pub struct Args {
    /// Consultation to withdraw
    pub consultation_id: String,
}

pub async fn execute(args: Args) -> Result<()> {
    let core = Core::open().await?;
    let consultation = core.registry().cancel(&args.consultation_id).await?;
    println!("Consultation {} cancelled.", consultation.id);
    Ok(())
}
