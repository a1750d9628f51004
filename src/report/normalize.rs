//! Reconciles loosely-typed model output into a [`CanonicalReport`].
//!
//! The model's schema has drifted across prompt versions, so every report
//! field is looked up through one ordered alias table. Normalization is total
//! (garbage in, defaults out) and idempotent: feeding a serialized canonical
//! report back in yields the same report.

use super::types::*;
use crate::language::Language;
use serde_json::{json, Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Analysis,
    Problems,
    Fixes,
    CorrectedCode,
    OptimizedCode,
    QualityScore,
    ConfidenceScores,
}

/// Recognized names per report field, highest priority first.
const FIELD_ALIASES: &[(Field, &[&str])] = &[
    (Field::Analysis, &["analysis", "summary"]),
    (Field::Problems, &["detectedProblems", "problems", "issues"]),
    (Field::Fixes, &["fixes", "suggestedFixes", "suggested_fixes"]),
    (
        Field::CorrectedCode,
        &["correctedCode", "corrected_code", "corrected"],
    ),
    (
        Field::OptimizedCode,
        &["optimizedCode", "optimized_code", "optimized"],
    ),
    (Field::QualityScore, &["qualityScore", "quality_score", "grade"]),
    (
        Field::ConfidenceScores,
        &["confidenceScores", "confidence_scores", "confidence"],
    ),
];

const PROBLEM_MESSAGE_ALIASES: &[&str] = &["message", "description"];
const PROBLEM_LINE_ALIASES: &[&str] = &["approxLine", "approx_line", "line"];
const CONFIDENCE_INDEX_ALIASES: &[&str] = &["problemIndex", "problem_index", "index"];

#[derive(Debug, Clone, Copy)]
pub struct NormalizeContext {
    pub language: Language,
}

fn aliases(field: Field) -> &'static [&'static str] {
    FIELD_ALIASES
        .iter()
        .find(|(f, _)| *f == field)
        .map(|(_, names)| *names)
        .unwrap_or(&[])
}

/// First alias value satisfying `pick`, in table order.
fn lookup<'a, T>(
    obj: &'a Map<String, Value>,
    names: &[&str],
    pick: impl Fn(&'a Value) -> Option<T>,
) -> Option<T> {
    names.iter().filter_map(|name| obj.get(*name)).find_map(pick)
}

fn field<'a, T>(
    obj: &'a Map<String, Value>,
    field: Field,
    pick: impl Fn(&'a Value) -> Option<T>,
) -> Option<T> {
    lookup(obj, aliases(field), pick)
}

pub fn placeholder_code(language: Language) -> String {
    format!("/* Model did not return correctedCode for {} */", language)
}

/// Normalize any JSON value into a canonical report. Never fails.
pub fn normalize(raw: &Value, ctx: &NormalizeContext) -> CanonicalReport {
    let empty = Map::new();
    let obj = raw.as_object().unwrap_or(&empty);

    let analysis = field(obj, Field::Analysis, |v| v.as_str().map(str::to_string))
        .unwrap_or_default();

    let problems = field(obj, Field::Problems, Value::as_array)
        .map(|items| items.iter().filter_map(coerce_problem).collect())
        .unwrap_or_default();

    let fixes = field(obj, Field::Fixes, Value::as_array)
        .map(|items| items.iter().filter_map(coerce_fix).collect())
        .unwrap_or_default();

    let corrected_code = field(obj, Field::CorrectedCode, |v| {
        v.as_str()
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
    })
    .unwrap_or_else(|| placeholder_code(ctx.language));

    let optimized_code = field(obj, Field::OptimizedCode, |v| match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    });

    let quality_score = field(obj, Field::QualityScore, |v| {
        v.as_str().and_then(QualityScore::from_loose)
    })
    .unwrap_or_default();

    let confidence_scores = field(obj, Field::ConfidenceScores, Value::as_array)
        .map(|items| items.iter().filter_map(coerce_confidence).collect())
        .unwrap_or_default();

    CanonicalReport {
        analysis,
        problems,
        fixes,
        corrected_code,
        optimized_code,
        quality_score,
        confidence_scores,
    }
}

/// Report used when the model output could not be parsed even after repair.
pub fn degraded_report(ctx: &NormalizeContext) -> CanonicalReport {
    normalize(
        &json!({
            "analysis": "Model returned non-JSON output. Try again or reduce code length.",
            "detectedProblems": [
                { "type": "other", "severity": "high", "message": "Unparseable model output." }
            ],
            "fixes": [],
            "correctedCode": "",
            "optimizedCode": null
        }),
        ctx,
    )
}

/// Prepend static-analysis findings ahead of model findings. Confidence
/// indices are shifted so they keep pointing at the same model problems.
pub fn merge_static_findings(mut report: CanonicalReport, findings: Vec<Problem>) -> CanonicalReport {
    if findings.is_empty() {
        return report;
    }
    let offset = findings.len();
    for score in &mut report.confidence_scores {
        score.problem_index += offset;
    }
    let mut problems = findings;
    problems.append(&mut report.problems);
    report.problems = problems;
    report
}

fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn is_dropped_entry(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn non_negative_integer(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.is_finite() && *f >= 0.0)
            .map(|f| f as u64)
    })
}

fn coerce_problem(value: &Value) -> Option<Problem> {
    if is_dropped_entry(value) {
        return None;
    }
    let Some(obj) = value.as_object() else {
        return Some(Problem {
            problem_type: ProblemType::Other,
            severity: Severity::Medium,
            message: stringify(value),
            approx_line: None,
            snippet: None,
        });
    };

    Some(Problem {
        problem_type: obj
            .get("type")
            .and_then(Value::as_str)
            .and_then(ProblemType::from_loose)
            .unwrap_or_default(),
        severity: obj
            .get("severity")
            .and_then(Value::as_str)
            .and_then(Severity::from_loose)
            .unwrap_or_default(),
        message: lookup(obj, PROBLEM_MESSAGE_ALIASES, |v| Some(stringify(v))).unwrap_or_default(),
        approx_line: lookup(obj, PROBLEM_LINE_ALIASES, non_negative_integer),
        snippet: obj
            .get("snippet")
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}

fn coerce_fix(value: &Value) -> Option<Fix> {
    if is_dropped_entry(value) {
        return None;
    }
    match value.as_object() {
        Some(obj) => Some(Fix {
            message: obj.get("message").map(stringify).unwrap_or_default(),
            reason: obj.get("reason").map(stringify).unwrap_or_default(),
        }),
        None => Some(Fix {
            message: stringify(value),
            reason: String::new(),
        }),
    }
}

fn coerce_confidence(value: &Value) -> Option<ConfidenceScore> {
    let obj = value.as_object()?;
    let problem_index = lookup(obj, CONFIDENCE_INDEX_ALIASES, non_negative_integer)?;
    let score = obj
        .get("score")
        .and_then(Value::as_f64)
        .filter(|f| f.is_finite())?;
    Some(ConfidenceScore {
        problem_index: usize::try_from(problem_index).ok()?,
        score: score.round().clamp(0.0, 100.0) as u8,
    })
}
