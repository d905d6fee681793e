//! Ballot CLI: build-time extraction of presidential candidate records.
//!
//! Reads the election article, follows each candidate to their own article,
//! and writes the records as JSON for the site build.

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
