use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use super::defaults::*;
use crate::language::Mode;

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct Config {
    /// Explicit model identifier. When unset, the mode table picks one.
    #[serde(default)]
    pub model: Option<String>,

    /// Alternates tried in order when the preferred model is unavailable
    #[serde(default = "default_fallback_models")]
    pub fallback_models: Vec<String>,

    #[serde(default)]
    pub modes: ModeModels,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Credential for the provider. Only ever read from the environment.
    #[serde(skip)]
    pub api_key: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    #[serde(default = "default_max_code_chars")]
    pub max_code_chars: usize,

    #[serde(default = "default_bind")]
    pub bind: String,

    #[serde(default)]
    pub history: HistoryConfig,

    #[serde(default)]
    pub static_analysis: StaticAnalysisConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct ModeModels {
    #[serde(default = "default_fast_model")]
    pub fast: String,

    #[serde(default = "default_balanced_model")]
    pub balanced: String,

    #[serde(default = "default_accurate_model")]
    pub accurate: String,
}

impl Default for ModeModels {
    fn default() -> Self {
        Self {
            fast: default_fast_model(),
            balanced: default_balanced_model(),
            accurate: default_accurate_model(),
        }
    }
}

impl ModeModels {
    pub fn for_mode(&self, mode: Mode) -> &str {
        match mode {
            Mode::Fast => &self.fast,
            Mode::Balanced => &self.balanced,
            Mode::Accurate => &self.accurate,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct HistoryConfig {
    /// Record completed analyses at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_history_file")]
    pub file: PathBuf,

    /// Retention bound for the file-backed store
    #[serde(default = "default_history_max_entries")]
    pub max_entries: usize,

    /// SQLite database path. File-backed history is used when unset.
    #[serde(default)]
    pub database: Option<PathBuf>,

    #[serde(default)]
    pub database_disabled: bool,

    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            file: default_history_file(),
            max_entries: default_history_max_entries(),
            database: None,
            database_disabled: false,
            recent_limit: default_recent_limit(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct StaticAnalysisConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_static_timeout_sec")]
    pub timeout_sec: u64,

    /// Checker argv per language; `{file}` is replaced with the snippet path
    #[serde(default = "default_static_commands")]
    pub commands: HashMap<String, Vec<String>>,
}

impl Default for StaticAnalysisConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            timeout_sec: default_static_timeout_sec(),
            commands: default_static_commands(),
        }
    }
}
