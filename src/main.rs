use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod config;
mod coordinator;
mod directory;
mod error;
mod identity;
mod models;
mod notify;
mod registry;
mod session;
mod store;
mod utils;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Experts(args) => commands::experts::execute(args).await,
        Commands::Import(args) => commands::import::execute(args).await,
        Commands::Request(args) => commands::request::execute(args).await,
        Commands::Call(args) => commands::call::execute(args).await,
        Commands::Pending(args) => commands::pending::execute(args).await,
        Commands::Claim(args) => commands::claim::execute(args).await,
        Commands::Complete(args) => commands::complete::execute(args).await,
        Commands::Cancel(args) => commands::cancel::execute(args).await,
        Commands::Session(args) => commands::session::execute(args).await,
        Commands::Show(args) => commands::show::execute(args).await,
    }
}
