use anyhow::{bail, Result};
use clap::Args as ClapArgs;

use crate::commands::common::Core;

#[derive(ClapArgs)]
pub struct Args {
    /// Expert to call right now
    pub expert_id: String,

    /// What the consultation is about
    pub topic: String,
}

pub async fn execute(args: Args) -> Result<()> {
    let core = Core::open().await?;

    let Some(actor) = core.config.actor() else {
        bail!("No signed-in actor in config; cannot place a direct call");
    };

    let consultation = core
        .coordinator()
        .create_and_assign(&actor.id, &args.expert_id, args.topic)
        .await?;

    println!(
        "Direct consultation {} created with {} (in progress).",
        consultation.id, args.expert_id
    );

    let handle = core.initiator().initiate(&consultation.id).await?;
    println!("Call session: {handle}");
    Ok(())
}
