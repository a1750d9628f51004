use crate::cli::{build_analyzer, ServeArgs};
use crate::config::Config;
use crate::server;
use tracing::{info, warn};

pub async fn execute(args: ServeArgs) -> anyhow::Result<()> {
    info!("Loading config from {:?}", args.config);
    let mut config = Config::resolve(&args.config)?;
    if let Some(bind) = args.bind {
        config.bind = bind;
    }
    if config.api_key.is_none() {
        warn!("GEMINI_API_KEY is not set; analysis requests will fail");
    }

    let bind = config.bind.clone();
    let analyzer = build_analyzer(config).await?;
    server::serve(analyzer, &bind).await
}
