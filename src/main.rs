use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod cli;
mod config;
mod error;
mod history;
mod language;
mod parser;
mod pipeline;
mod prompt;
mod provider;
mod report;
mod server;
mod static_check;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins when set; otherwise --verbose picks debug
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("fixify=debug,tower_http=debug")
        } else {
            EnvFilter::new("fixify=info")
        }
    });

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Serve(args) => cli::serve::execute(args).await,
        Commands::Analyze(args) => cli::analyze::execute(args).await,
        Commands::History(args) => cli::history::execute(args).await,
        Commands::Detect(args) => cli::detect::execute(args),
        Commands::Schema => cli::schema::execute(),
    }
}
