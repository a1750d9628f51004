use crate::cli::HistoryArgs;
use crate::config::Config;
use crate::history::HistoryGateway;
use tracing::debug;

pub async fn execute(args: HistoryArgs) -> anyhow::Result<()> {
    let config = Config::resolve(&args.config)?;
    let limit = args.limit.unwrap_or(config.history.recent_limit);

    let gateway = HistoryGateway::open(&config).await;
    debug!("Reading history from {} backend", gateway.backend());
    let entries = gateway.recent(limit).await;
    gateway.shutdown().await;

    println!("{}", serde_json::to_string_pretty(&entries?)?);
    Ok(())
}
