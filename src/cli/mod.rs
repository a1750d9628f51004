pub mod analyze;
pub mod detect;
pub mod history;
pub mod schema;
pub mod serve;

use crate::config::Config;
use crate::history::HistoryGateway;
use crate::pipeline::Analyzer;
use crate::provider::create_client;
use crate::static_check::{CommandChecker, StaticAnalyzer};
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "fixify")]
#[command(
    author,
    version,
    about = "AI code debugger: structured bug reports from Gemini models"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose/debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP service
    Serve(ServeArgs),

    /// Analyze one file (or stdin) and print the response JSON
    Analyze(AnalyzeArgs),

    /// Print recent analyses
    History(HistoryArgs),

    /// Print the language detected for a file (or stdin)
    Detect(DetectArgs),

    /// Print JSON Schema for config validation
    Schema,
}

#[derive(Parser, Clone)]
pub struct ServeArgs {
    /// Path to config file (optional; defaults apply when missing)
    #[arg(short, long, default_value = "fixify.yaml", env = "FIXIFY_CONFIG")]
    pub config: PathBuf,

    /// Override listen address (host:port)
    #[arg(long)]
    pub bind: Option<String>,
}

#[derive(Parser, Clone)]
pub struct AnalyzeArgs {
    /// Source file to analyze, or `-` for stdin
    #[arg(value_name = "FILE", default_value = "-")]
    pub file: PathBuf,

    /// Path to config file
    #[arg(short, long, default_value = "fixify.yaml", env = "FIXIFY_CONFIG")]
    pub config: PathBuf,

    /// Language of the snippet (`auto` to detect)
    #[arg(short, long, default_value = "auto")]
    pub language: String,

    /// Analysis depth: fast, balanced or accurate
    #[arg(short, long, default_value = "balanced")]
    pub mode: String,

    /// Print the legacy `{fixedCode, explanation, report, model}` shape
    #[arg(long)]
    pub legacy: bool,
}

#[derive(Parser, Clone)]
pub struct HistoryArgs {
    /// Path to config file
    #[arg(short, long, default_value = "fixify.yaml", env = "FIXIFY_CONFIG")]
    pub config: PathBuf,

    /// Number of entries (defaults to history.recent_limit)
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Parser, Clone)]
pub struct DetectArgs {
    /// Source file, or `-` for stdin
    #[arg(value_name = "FILE", default_value = "-")]
    pub file: PathBuf,
}

/// Read a source file, treating `-` as stdin.
pub(crate) fn read_source(path: &Path) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        let mut code = String::new();
        std::io::stdin().read_to_string(&mut code)?;
        return Ok(code);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Wire the model client, static checker and history store from config.
pub(crate) async fn build_analyzer(config: Config) -> anyhow::Result<Arc<Analyzer>> {
    let client = create_client(&config)?;
    let static_checker: Option<Arc<dyn StaticAnalyzer>> = if config.static_analysis.enabled {
        info!("Static analysis enabled");
        Some(Arc::new(CommandChecker::from_config(&config.static_analysis)))
    } else {
        None
    };
    let history = Arc::new(HistoryGateway::open(&config).await);
    Ok(Arc::new(Analyzer::new(
        Arc::new(config),
        client,
        static_checker,
        history,
    )))
}
