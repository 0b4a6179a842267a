use anyhow::Result;
use clap::Args as ClapArgs;

use crate::commands::common::Core;
use crate::error::EngineError;

#[derive(ClapArgs)]
pub struct Args {
    /// Pending consultation to claim for the signed-in consultant
    pub consultation_id: String,
}

pub async fn execute(args: Args) -> Result<()> {
    let core = Core::open().await?;

    match core.coordinator().claim(&args.consultation_id).await {
        Ok(consultation) => {
            println!(
                "Claimed {} - \"{}\" is now scheduled for you.",
                consultation.id, consultation.topic
            );
            Ok(())
        }
        Err(EngineError::AlreadyClaimed(id)) => {
            println!("Too late: {id} was claimed by another consultant.");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
