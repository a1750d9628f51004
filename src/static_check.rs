//! Optional compiler/linter checks run before the model's findings are merged.
//!
//! A check that times out, cannot be spawned, or has no configured command
//! produces no findings. It never fails the request.

use crate::config::StaticAnalysisConfig;
use crate::language::Language;
use crate::report::{Problem, ProblemType, Severity};
use async_trait::async_trait;
use regex::Regex;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout as tokio_timeout;
use tracing::{debug, warn};

const FILE_PLACEHOLDER: &str = "{file}";
const MAX_FINDING_CHARS: usize = 300;

#[async_trait]
pub trait StaticAnalyzer: Send + Sync {
    async fn check(&self, code: &str, language: Language) -> Vec<Problem>;
}

pub struct CommandChecker {
    pub timeout: Duration,
    pub commands: HashMap<String, Vec<String>>,
}

impl CommandChecker {
    pub fn from_config(config: &StaticAnalysisConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeout_sec),
            commands: config.commands.clone(),
        }
    }

    async fn run(&self, argv: &[String], code: &str, language: Language) -> std::io::Result<Option<Problem>> {
        let mut file = tempfile::Builder::new()
            .prefix("fixify-")
            .suffix(&format!(".{}", language.extension()))
            .tempfile()?;
        file.write_all(code.as_bytes())?;
        file.flush()?;
        let path = file.path().to_path_buf();
        let path_str = path.to_string_lossy().to_string();

        let args: Vec<String> = argv
            .iter()
            .map(|arg| arg.replace(FILE_PLACEHOLDER, &path_str))
            .collect();
        let Some((program, rest)) = args.split_first() else {
            return Ok(None);
        };

        let mut cmd = Command::new(program);
        cmd.args(rest)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match tokio_timeout(self.timeout, cmd.output()).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(
                    "Static check '{}' timed out after {:?}; ignoring",
                    program, self.timeout
                );
                return Ok(None);
            }
        };

        if output.status.success() {
            return Ok(None);
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let diagnostics = if stderr.trim().is_empty() { stdout } else { stderr };
        Ok(Some(diagnostic_to_problem(&diagnostics, &path)))
    }
}

#[async_trait]
impl StaticAnalyzer for CommandChecker {
    async fn check(&self, code: &str, language: Language) -> Vec<Problem> {
        let Some(argv) = self.commands.get(language.as_str()) else {
            return Vec::new();
        };
        match self.run(argv, code, language).await {
            Ok(Some(problem)) => {
                debug!("Static check for {} reported: {}", language, problem.message);
                vec![problem]
            }
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Static check for {} could not run: {}", language, e);
                Vec::new()
            }
        }
    }
}

/// Build a syntax finding from checker output, hiding the temp file path.
fn diagnostic_to_problem(output: &str, path: &Path) -> Problem {
    let path_str = path.to_string_lossy();
    let approx_line = Regex::new(&format!(
        r#"{}"?(?::|,\s*line\s+)(\d+)"#,
        regex::escape(&path_str)
    ))
    .ok()
    .and_then(|re| re.captures(output))
    .and_then(|caps| caps.get(1))
    .and_then(|m| m.as_str().parse().ok());

    let lines: Vec<&str> = output
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    let line = lines
        .iter()
        .find(|l| l.contains("Error") || l.contains("error"))
        .or_else(|| lines.first())
        .copied()
        .unwrap_or("Static check failed");

    let message: String = line
        .replace(path_str.as_ref(), "<snippet>")
        .chars()
        .take(MAX_FINDING_CHARS)
        .collect();

    Problem {
        problem_type: ProblemType::Syntax,
        severity: Severity::High,
        message,
        approx_line,
        snippet: None,
    }
}
