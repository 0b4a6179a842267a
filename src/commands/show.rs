use anyhow::Result;
use clap::Args as ClapArgs;

use crate::commands::common::Core;

#[derive(ClapArgs)]
pub struct Args {
    /// Consultation to display
    pub consultation_id: String,

    /// Print the record as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn execute(args: Args) -> Result<()> {
    let core = Core::open().await?;
    let consultation = core.registry().get(&args.consultation_id).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&consultation)?);
        return Ok(());
    }

    println!("Consultation: {}", consultation.id);
    println!("  Status:     {}", consultation.status);
    println!("  Farmer:     {}", consultation.farmer_id);
    println!(
        "  Consultant: {}",
        consultation.consultant_id.as_deref().unwrap_or("(unclaimed)")
    );
    println!("  Topic:      {}", consultation.topic);
    println!("  Created:    {}", consultation.created_at.to_rfc3339());
    if let Some(when) = consultation.scheduled_for {
        println!("  Scheduled:  {}", when.to_rfc3339());
    }
    if let Some(handle) = consultation.session_handle {
        println!("  Session:    {handle}");
    }
    if let Some(notes) = consultation.notes {
        println!("  Notes:      {notes}");
    }
    Ok(())
}
