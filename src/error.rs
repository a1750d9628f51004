use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid value for {key}: {value}")]
    InvalidEnv { key: &'static str, value: String },

    #[error("max_code_chars must be greater than zero")]
    ZeroCodeLimit,

    #[error("history.max_entries must be greater than zero")]
    ZeroHistoryLimit,
}

/// Caller-fixable request problems. Reported before any network call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Code and language required")]
    MissingCode,

    #[error("Invalid payload")]
    InvalidPayload,

    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("Unsupported mode: {0}")]
    UnsupportedMode(String),

    #[error("Code too large (max {max} characters)")]
    CodeTooLarge { max: usize },
}

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("GEMINI_API_KEY is missing")]
    MissingApiKey,

    #[error("No model candidates configured")]
    NoCandidates,

    #[error("Provider returned HTTP {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("Request to provider failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to decode provider response: {0}")]
    Decode(String),
}

impl ProviderError {
    /// HTTP status reported by the provider, if the failure came with one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ProviderError::Upstream { status, .. } => Some(*status),
            ProviderError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Provider-facing message, as relayed to callers on upstream failures.
    pub fn provider_message(&self) -> String {
        match self {
            ProviderError::Upstream { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Model output is not valid JSON: {reason}")]
pub struct ParseFailure {
    pub reason: String,
}

impl ParseFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Failed to create history directory: {0}")]
    CreateDir(std::io::Error),

    #[error("Failed to write history file: {0}")]
    WriteFile(std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database is not connected")]
    NotConnected,

    #[error("History writer has shut down")]
    WriterClosed,

    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_status_and_message() {
        let err = ProviderError::Upstream {
            status: 429,
            message: "Quota exceeded".to_string(),
        };
        assert_eq!(err.status(), Some(429));
        assert_eq!(err.provider_message(), "Quota exceeded");
    }

    #[test]
    fn test_missing_key_has_no_status() {
        assert_eq!(ProviderError::MissingApiKey.status(), None);
        assert_eq!(
            ProviderError::MissingApiKey.provider_message(),
            "GEMINI_API_KEY is missing"
        );
    }

    #[test]
    fn test_validation_messages() {
        assert_eq!(
            ValidationError::CodeTooLarge { max: 20000 }.to_string(),
            "Code too large (max 20000 characters)"
        );
        assert_eq!(
            ValidationError::UnsupportedLanguage("ruby".into()).to_string(),
            "Unsupported language: ruby"
        );
    }
}
