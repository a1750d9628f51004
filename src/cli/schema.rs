use crate::config::Config;
use schemars::schema_for;

/// Print the JSON Schema for `fixify.yaml`.
pub fn execute() -> anyhow::Result<()> {
    let mut schema = schema_for!(Config);
    schema.schema.metadata().description = Some(
        "fixify configuration. GEMINI_API_KEY is read from the environment only.".to_string(),
    );
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
