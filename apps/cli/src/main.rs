//! mdreader CLI — load Markdown files as documents for indexing.
//!
//! Prints the loaded documents as JSON so they can be piped into an
//! indexing pipeline.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
