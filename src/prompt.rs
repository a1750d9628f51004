//! Instruction text sent to the model. Pure functions, no I/O.

use crate::language::{Language, Mode};

/// Longest slice of a previous invalid reply embedded in a repair prompt
pub const REPAIR_INPUT_MAX_CHARS: usize = 12_000;

const REPORT_SCHEMA: &str = r#"{
  "analysis": string,
  "detectedProblems": Array<{ type: "syntax"|"logic"|"performance"|"bad_practice"|"security"|"other", severity: "low"|"medium"|"high", message: string, approxLine?: number, snippet?: string }>,
  "fixes": Array<{ message: string, reason: string }>,
  "correctedCode": string,
  "optimizedCode": string | null,
  "qualityScore": "A"|"B"|"C"|"D"|"E"|"F",
  "confidenceScores": Array<{ problemIndex: number, score: number (0-100) }>
}"#;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub code: String,
    pub language: Language,
    pub mode: Mode,
}

fn depth_hint(mode: Mode) -> &'static str {
    match mode {
        Mode::Fast => "Depth: report only the most important problems; keep explanations short.",
        Mode::Balanced => "Depth: report all clear problems with brief explanations.",
        Mode::Accurate => {
            "Depth: be thorough; consider edge cases, performance and security before answering."
        }
    }
}

pub fn build_prompt(request: &AnalysisRequest) -> String {
    [
        "You are an advanced Code Debugger and Code Explainer AI.",
        "",
        "Rules:",
        "- Analyze ONLY the provided code. Do not invent missing files or functions.",
        "- Preserve the user's coding style unless it is a bad practice.",
        "- Include comments in corrected code to show what changed.",
        "- Be concise, accurate, and developer-friendly.",
        depth_hint(request.mode),
        "",
        "Return ONLY valid JSON (no prose, no markdown, no code fences) matching this shape:",
        REPORT_SCHEMA,
        "",
        format!("Language: {}", request.language).as_str(),
        "",
        "Code:",
        request.code.as_str(),
    ]
    .join("\n")
}

/// Prompt asking the model to turn its own invalid reply into valid JSON.
pub fn build_repair_prompt(invalid_output: &str, language: Language) -> String {
    let excerpt: String = invalid_output.chars().take(REPAIR_INPUT_MAX_CHARS).collect();
    [
        "Your previous reply was not valid JSON.",
        "Rewrite it as a single JSON object with exactly this shape, keeping its content:",
        REPORT_SCHEMA,
        "",
        "Return ONLY the JSON object (no prose, no markdown, no code fences).",
        format!("Language: {}", language).as_str(),
        "",
        "Previous reply:",
        excerpt.as_str(),
    ]
    .join("\n")
}
