mod defaults;
mod types;

pub use types::*;

use crate::error::ConfigError;
use crate::language::Mode;
use defaults::*;
use std::path::{Path, PathBuf};

impl Default for Config {
    fn default() -> Self {
        Self {
            model: None,
            fallback_models: default_fallback_models(),
            modes: ModeModels::default(),
            base_url: default_base_url(),
            api_key: None,
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            max_code_chars: default_max_code_chars(),
            bind: default_bind(),
            history: HistoryConfig::default(),
            static_analysis: StaticAnalysisConfig::default(),
        }
    }
}

impl Config {
    /// Load config from a YAML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load the YAML file if it exists, apply environment overrides and validate.
    pub fn resolve(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            Self::load(path)?
        } else {
            tracing::debug!("Config file {:?} not found, using defaults", path);
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides. `lookup` abstracts `std::env::var` for tests.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("GEMINI_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(model) = non_empty("GEMINI_MODEL") {
            self.model = Some(model);
        }
        if let Some(url) = non_empty("GEMINI_BASE_URL") {
            self.base_url = url;
        }
        if let Some(file) = non_empty("HISTORY_FILE") {
            self.history.file = PathBuf::from(file);
        }
        if let Some(db) = non_empty("HISTORY_DB") {
            self.history.database = Some(PathBuf::from(db));
        }
        if ["DISABLE_DB", "MONGO_DISABLED"]
            .iter()
            .any(|key| non_empty(key).is_some_and(|v| is_truthy(&v)))
        {
            self.history.database_disabled = true;
        }
        if non_empty("DISABLE_HISTORY").is_some_and(|v| is_truthy(&v)) {
            self.history.enabled = false;
        }
        if let Some(value) = non_empty("MAX_CODE_CHARS") {
            self.max_code_chars = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                key: "MAX_CODE_CHARS",
                value: value.clone(),
            })?;
        }
        if let Some(port) = non_empty("PORT") {
            let port: u16 = port.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                key: "PORT",
                value: port.clone(),
            })?;
            let host = self
                .bind
                .rsplit_once(':')
                .map(|(host, _)| host.to_string())
                .unwrap_or_else(|| "127.0.0.1".to_string());
            self.bind = format!("{}:{}", host, port);
        }
        Ok(())
    }

    /// Validate the config
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_code_chars == 0 {
            return Err(ConfigError::ZeroCodeLimit);
        }
        if self.history.max_entries == 0 {
            return Err(ConfigError::ZeroHistoryLimit);
        }
        Ok(())
    }

    /// Model tried first: the explicit override, else the one mapped to `mode`.
    pub fn preferred_model(&self, mode: Mode) -> String {
        self.model
            .clone()
            .unwrap_or_else(|| self.modes.for_mode(mode).to_string())
    }

    /// Whether the database backend should be attempted at all.
    pub fn database_enabled(&self) -> bool {
        self.history.database.is_some() && !self.history.database_disabled
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim(), "1" | "true")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.max_code_chars, 20_000);
        assert_eq!(config.history.max_entries, 50);
        assert_eq!(config.history.recent_limit, 10);
        assert_eq!(config.fallback_models.len(), 4);
        assert!(!config.database_enabled());
    }

    #[test]
    fn test_parse_partial_yaml() {
        let yaml = r#"
model: gemini-pro
history:
  file: /tmp/fixify/history.json
  max_entries: 5
static_analysis:
  enabled: true
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.model.as_deref(), Some("gemini-pro"));
        assert_eq!(config.history.max_entries, 5);
        assert!(config.history.enabled);
        assert!(config.static_analysis.enabled);
        assert!(config.static_analysis.commands.contains_key("python"));
        assert_eq!(config.bind, "127.0.0.1:5000");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_env(env(&[
                ("GEMINI_API_KEY", "test-key"),
                ("GEMINI_MODEL", "gemini-pro"),
                ("HISTORY_FILE", "/tmp/h.json"),
                ("HISTORY_DB", "/tmp/h.db"),
                ("DISABLE_DB", "1"),
                ("PORT", "8080"),
            ]))
            .unwrap();

        assert_eq!(config.api_key.as_deref(), Some("test-key"));
        assert_eq!(config.model.as_deref(), Some("gemini-pro"));
        assert_eq!(config.history.file, PathBuf::from("/tmp/h.json"));
        assert!(config.history.database_disabled);
        assert!(!config.database_enabled());
        assert_eq!(config.bind, "127.0.0.1:8080");
    }

    #[test]
    fn test_env_rejects_bad_numbers() {
        let mut config = Config::default();
        let err = config
            .apply_env(env(&[("MAX_CODE_CHARS", "lots")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { key: "MAX_CODE_CHARS", .. }));
    }

    #[test]
    fn test_preferred_model_follows_mode_unless_overridden() {
        let mut config = Config::default();
        assert_eq!(config.preferred_model(Mode::Fast), "gemini-2.0-flash-lite");
        assert_eq!(config.preferred_model(Mode::Accurate), "gemini-1.5-pro");

        config.model = Some("gemini-pro".to_string());
        assert_eq!(config.preferred_model(Mode::Fast), "gemini-pro");
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        let mut config = Config::default();
        config.history.max_entries = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroHistoryLimit)
        ));
    }
}
