use crate::cli::{build_analyzer, read_source, AnalyzeArgs};
use crate::config::Config;
use crate::report::to_legacy_explanation;
use crate::server::parse_request;
use serde_json::json;
use tracing::info;

pub async fn execute(args: AnalyzeArgs) -> anyhow::Result<()> {
    let config = Config::resolve(&args.config)?;
    let code = read_source(&args.file)?;

    // Same validation as the HTTP body, before any client is built
    let request = parse_request(
        &json!({ "code": code, "language": args.language, "modePreference": args.mode }),
        config.max_code_chars,
    )?;
    info!(
        "Analyzing {:?} as {} ({:?} mode)",
        args.file, request.language, request.mode
    );

    let analyzer = build_analyzer(config).await?;
    let result = analyzer.analyze(request).await;
    analyzer.history().shutdown().await;
    let outcome = result?;

    let output = if args.legacy {
        json!({
            "fixedCode": outcome.report.corrected_code,
            "explanation": to_legacy_explanation(&outcome.report),
            "report": outcome.report,
            "model": outcome.model,
        })
    } else {
        json!({ "report": outcome.report, "model": outcome.model })
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
