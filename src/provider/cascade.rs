//! Ordered fallback across model identifiers.
//!
//! Only "this model does not exist / cannot serve generateContent" failures
//! advance to the next candidate. Everything else (quota, bad request,
//! network) aborts immediately. There is no retry of the same candidate and
//! no delay between candidates.

use super::ModelClient;
use crate::error::ProviderError;
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, info, warn};

/// HTTP status that always means the requested model is unavailable
const MODEL_NOT_FOUND_STATUS: u16 = 404;

/// Provider messages that mean the requested model is unavailable
const MODEL_UNAVAILABLE_PATTERNS: &[&str] = &[
    r"(?i)models?/.*not found",
    r"(?i)is not supported for generateContent",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub text: String,
    /// The candidate that actually answered; not necessarily the preferred one
    pub model: String,
}

fn unavailable_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        MODEL_UNAVAILABLE_PATTERNS
            .iter()
            .filter_map(|p| Regex::new(p).ok())
            .collect()
    })
}

/// The single place deciding whether a failure triggers fallback.
pub fn is_model_unavailable(err: &ProviderError) -> bool {
    if err.status() == Some(MODEL_NOT_FOUND_STATUS) {
        return true;
    }
    match err {
        ProviderError::Upstream { message, .. } => {
            unavailable_patterns().iter().any(|re| re.is_match(message))
        }
        _ => false,
    }
}

/// Preferred model first, then the fallback list with blanks and
/// duplicates of earlier entries removed.
pub fn candidate_list(preferred: &str, fallbacks: &[String]) -> Vec<String> {
    let mut candidates: Vec<String> = Vec::with_capacity(fallbacks.len() + 1);
    for candidate in std::iter::once(preferred).chain(fallbacks.iter().map(String::as_str)) {
        let candidate = candidate.trim();
        if candidate.is_empty() || candidates.iter().any(|c| c == candidate) {
            continue;
        }
        candidates.push(candidate.to_string());
    }
    candidates
}

/// Try each candidate in order until one answers.
pub async fn invoke(
    client: &dyn ModelClient,
    prompt: &str,
    candidates: &[String],
) -> Result<Invocation, ProviderError> {
    let mut last_error = ProviderError::NoCandidates;

    for (idx, model) in candidates.iter().enumerate() {
        debug!("Trying model {} ({}/{})", model, idx + 1, candidates.len());
        match client.generate(model, prompt).await {
            Ok(text) => {
                if idx > 0 {
                    info!("Model {} answered after {} fallback(s)", model, idx);
                }
                return Ok(Invocation {
                    text,
                    model: model.clone(),
                });
            }
            Err(e) if is_model_unavailable(&e) => {
                warn!("Model {} unavailable: {}", model, e);
                last_error = e;
            }
            Err(e) => {
                warn!("Model {} failed, not falling back: {}", model, e);
                return Err(e);
            }
        }
    }

    Err(last_error)
}
