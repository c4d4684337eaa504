//! tabxml CLI — delimited tables to tagged markup, parents to lineages.
//!
//! Streams line-oriented tabular input through the converter crates and
//! writes the rendered result to stdout.

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
