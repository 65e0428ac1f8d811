//! CLI command definitions and handlers.

use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod request;
pub mod serve;

/// LabDesk - Lab Maintenance Request Desk
#[derive(Parser)]
#[command(name = "labdesk")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage maintenance requests
    #[command(subcommand)]
    Request(request::RequestCommands),

    /// Start the web server
    Serve(serve::ServeArgs),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Request(cmd) => request::execute(cmd).await,
            Commands::Serve(args) => serve::execute(args).await,
        }
    }
}
