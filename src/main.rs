use anyhow::Result;
use clap::Parser;

mod auth;
mod cli;
mod config;
mod error;
mod handlers;
mod places;
mod router;
mod schemas;
mod test_utils;
mod weather;

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing (RUST_LOG controls the level)
    model::init_tracing();

    let cli = Cli::parse();
    cli.run().await?;

    Ok(())
}
