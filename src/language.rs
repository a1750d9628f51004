//! Language tags, analysis modes and source-pattern language detection.

use crate::error::ValidationError;
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Only the leading lines are inspected when guessing a language.
const DETECT_MAX_LINES: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Javascript,
    Typescript,
    Python,
    Java,
    Cpp,
    Go,
}

impl Language {
    pub const ALL: [Language; 6] = [
        Language::Javascript,
        Language::Typescript,
        Language::Python,
        Language::Java,
        Language::Cpp,
        Language::Go,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Javascript => "javascript",
            Language::Typescript => "typescript",
            Language::Python => "python",
            Language::Java => "java",
            Language::Cpp => "cpp",
            Language::Go => "go",
        }
    }

    /// File extension used when the snippet has to be written to disk.
    pub fn extension(&self) -> &'static str {
        match self {
            Language::Javascript => "js",
            Language::Typescript => "ts",
            Language::Python => "py",
            Language::Java => "java",
            Language::Cpp => "cpp",
            Language::Go => "go",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Language {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::ALL
            .into_iter()
            .find(|lang| lang.as_str() == s)
            .ok_or_else(|| ValidationError::UnsupportedLanguage(s.to_string()))
    }
}

/// How much effort the caller wants spent; selects the preferred model when
/// no explicit model is configured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Fast,
    #[default]
    Balanced,
    Accurate,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Fast => "fast",
            Mode::Balanced => "balanced",
            Mode::Accurate => "accurate",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Mode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fast" => Ok(Mode::Fast),
            "balanced" => Ok(Mode::Balanced),
            "accurate" => Ok(Mode::Accurate),
            _ => Err(ValidationError::UnsupportedMode(s.to_string())),
        }
    }
}

struct DetectRule {
    language: Language,
    patterns: Vec<Regex>,
}

fn detect_rules() -> &'static [DetectRule] {
    static RULES: OnceLock<Vec<DetectRule>> = OnceLock::new();
    RULES.get_or_init(|| {
        let table: [(Language, &[&str]); 5] = [
            (Language::Cpp, &[r#"#include\s+[<"].+[>"]"#, r"\bstd::"]),
            (Language::Java, &[r"(?m)^\s*package\s+\w+", r"\bpublic\s+class\b"]),
            (
                Language::Python,
                &[r"(?m)^\s*def\s+\w+\(.*\)\s*:", r"(?m)^\s*import\s+\w+"],
            ),
            (
                Language::Typescript,
                &[
                    r"\binterface\s+\w+",
                    r":\s*(string|number|boolean|any|unknown|never)\b",
                ],
            ),
            (
                Language::Go,
                &[r"(?m)^\s*func\s+\w+\(.*\)\s*\{", r"\bfmt\.(Print|Println|Printf)\b"],
            ),
        ];
        table
            .into_iter()
            .map(|(language, patterns)| DetectRule {
                language,
                patterns: patterns
                    .iter()
                    .filter_map(|p| Regex::new(p).ok())
                    .collect(),
            })
            .collect()
    })
}

/// Guess the language of a snippet from characteristic source patterns.
/// Rules are checked in a fixed order; javascript is the fallback.
pub fn detect(code: &str) -> Language {
    let head = code
        .lines()
        .take(DETECT_MAX_LINES)
        .collect::<Vec<_>>()
        .join("\n");

    detect_rules()
        .iter()
        .find(|rule| rule.patterns.iter().any(|re| re.is_match(&head)))
        .map(|rule| rule.language)
        .unwrap_or(Language::Javascript)
}
