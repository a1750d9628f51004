use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemType {
    Syntax,
    Logic,
    Performance,
    BadPractice,
    Security,
    #[default]
    Other,
}

impl ProblemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProblemType::Syntax => "syntax",
            ProblemType::Logic => "logic",
            ProblemType::Performance => "performance",
            ProblemType::BadPractice => "bad_practice",
            ProblemType::Security => "security",
            ProblemType::Other => "other",
        }
    }

    /// Lenient lookup used when coercing model output.
    pub fn from_loose(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "syntax" => Some(ProblemType::Syntax),
            "logic" => Some(ProblemType::Logic),
            "performance" => Some(ProblemType::Performance),
            "bad_practice" => Some(ProblemType::BadPractice),
            "security" => Some(ProblemType::Security),
            "other" => Some(ProblemType::Other),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProblemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }

    pub fn from_loose(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Severity::Low),
            "medium" => Some(Severity::Medium),
            "high" => Some(Severity::High),
            _ => None,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Letter grade for overall code quality
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum QualityScore {
    A,
    B,
    #[default]
    C,
    D,
    E,
    F,
}

impl QualityScore {
    pub fn from_loose(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Some(QualityScore::A),
            "B" => Some(QualityScore::B),
            "C" => Some(QualityScore::C),
            "D" => Some(QualityScore::D),
            "E" => Some(QualityScore::E),
            "F" => Some(QualityScore::F),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    #[serde(rename = "type")]
    pub problem_type: ProblemType,
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approx_line: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Fix {
    pub message: String,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceScore {
    pub problem_index: usize,
    /// Percentage, 0..=100
    pub score: u8,
}

/// The schema-stable report every consumer relies on.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalReport {
    pub analysis: String,
    pub problems: Vec<Problem>,
    pub fixes: Vec<Fix>,
    /// Never empty; a placeholder is substituted when the model supplied none
    pub corrected_code: String,
    pub optimized_code: Option<String>,
    pub quality_score: QualityScore,
    pub confidence_scores: Vec<ConfidenceScore>,
}
