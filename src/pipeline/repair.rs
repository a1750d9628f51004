use crate::error::ParseFailure;
use crate::language::Language;
use crate::parser;
use crate::prompt::build_repair_prompt;
use crate::provider::ModelClient;
use serde_json::Value;
use tracing::{info, warn};

/// Parse model output, spending at most one extra call on the same model to
/// have it rewrite invalid output. Never recurses and never cascades.
pub async fn parse_with_repair(
    client: &dyn ModelClient,
    model: &str,
    raw: &str,
    language: Language,
) -> Result<Value, ParseFailure> {
    let first_failure = match parser::parse(raw) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    info!("Output from {} did not parse ({}); requesting repair", model, first_failure);
    let prompt = build_repair_prompt(raw, language);
    let repaired = match client.generate(model, &prompt).await {
        Ok(text) => text,
        Err(e) => {
            warn!("Repair call to {} failed: {}", model, e);
            return Err(first_failure);
        }
    };

    parser::parse(&repaired).map_err(|e| {
        warn!("Repaired output from {} still invalid: {}", model, e);
        e
    })
}
