use clap::{Parser, Subcommand};

use crate::commands::{call, cancel, claim, complete, experts, import, pending, request, session, show};

#[derive(Parser)]
#[command(name = "agricall")]
#[command(about = "AgriCall - match farmers with advisory experts and run the consultation lifecycle")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Browse the expert directory with filters and sorting
    Experts(experts::Args),

    /// Replace the expert roster from a YAML file
    Import(import::Args),

    /// Open a marketplace consultation request (farmer)
    Request(request::Args),

    /// Call an available expert directly (farmer)
    Call(call::Args),

    /// List pending consultation requests (consultant)
    Pending(pending::Args),

    /// Claim a pending consultation (consultant)
    Claim(claim::Args),

    /// Complete a consultation you are assigned to
    Complete(complete::Args),

    /// Cancel a pending or scheduled consultation
    Cancel(cancel::Args),

    /// Provision (or look up) the call session handle
    Session(session::Args),

    /// Show a single consultation record
    Show(show::Args),
}
