use crate::error::ValidationError;
use crate::language::{detect, Mode};
use crate::prompt::AnalysisRequest;
use serde_json::Value;

/// Language value that asks for detection instead of naming a language
const AUTO_LANGUAGE: &str = "auto";

/// Validate a request body. Runs before any model call.
///
/// Accepted fields: `code` (required, non-empty string), `language`
/// (optional; absent or `"auto"` triggers detection) and `modePreference`.
pub fn parse_request(body: &Value, max_code_chars: usize) -> Result<AnalysisRequest, ValidationError> {
    let obj = body.as_object().ok_or(ValidationError::InvalidPayload)?;

    let code = match obj.get("code") {
        None | Some(Value::Null) => return Err(ValidationError::MissingCode),
        Some(Value::String(s)) if s.is_empty() => return Err(ValidationError::MissingCode),
        Some(Value::String(s)) => s.clone(),
        Some(_) => return Err(ValidationError::InvalidPayload),
    };

    let language = match obj.get("language") {
        None | Some(Value::Null) => detect(&code),
        Some(Value::String(s)) if s.is_empty() || s == AUTO_LANGUAGE => detect(&code),
        Some(Value::String(s)) => s.parse()?,
        Some(_) => return Err(ValidationError::InvalidPayload),
    };

    let mode = match obj.get("modePreference") {
        None | Some(Value::Null) => Mode::default(),
        Some(Value::String(s)) => s.parse()?,
        Some(_) => return Err(ValidationError::InvalidPayload),
    };

    if code.chars().count() > max_code_chars {
        return Err(ValidationError::CodeTooLarge {
            max: max_code_chars,
        });
    }

    Ok(AnalysisRequest {
        code,
        language,
        mode,
    })
}
