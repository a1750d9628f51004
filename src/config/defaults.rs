use std::collections::HashMap;
use std::path::PathBuf;

pub fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

pub fn default_fallback_models() -> Vec<String> {
    vec![
        "gemini-1.5-flash".to_string(),
        "gemini-1.5-pro".to_string(),
        "gemini-2.0-flash".to_string(),
        "gemini-2.0-flash-lite".to_string(),
    ]
}

pub fn default_fast_model() -> String {
    "gemini-2.0-flash-lite".to_string()
}

pub fn default_balanced_model() -> String {
    "gemini-1.5-flash".to_string()
}

pub fn default_accurate_model() -> String {
    "gemini-1.5-pro".to_string()
}

pub fn default_temperature() -> f32 {
    0.2
}

pub fn default_max_output_tokens() -> u32 {
    2048
}

pub fn default_max_code_chars() -> usize {
    20_000
}

pub fn default_bind() -> String {
    "127.0.0.1:5000".to_string()
}

pub fn default_history_file() -> PathBuf {
    PathBuf::from("data/history.json")
}

pub fn default_history_max_entries() -> usize {
    50
}

pub fn default_recent_limit() -> usize {
    10
}

pub fn default_static_timeout_sec() -> u64 {
    5
}

pub fn default_static_commands() -> HashMap<String, Vec<String>> {
    let mut commands = HashMap::new();
    commands.insert(
        "javascript".to_string(),
        vec!["node".to_string(), "--check".to_string(), "{file}".to_string()],
    );
    commands.insert(
        "python".to_string(),
        vec![
            "python3".to_string(),
            "-m".to_string(),
            "py_compile".to_string(),
            "{file}".to_string(),
        ],
    );
    commands.insert(
        "go".to_string(),
        vec!["gofmt".to_string(), "-e".to_string(), "{file}".to_string()],
    );
    commands
}

pub fn default_true() -> bool {
    true
}
