//! scrapeapi — serve declarative CSS extraction schemas as JSON endpoints.
//!
//! Each configured endpoint fetches a templated source URL, applies its
//! field schema, and returns the extracted record.

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
