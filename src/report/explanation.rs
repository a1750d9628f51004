use super::types::CanonicalReport;

/// Render the plain-text explanation used by the legacy `/api/fix` response
/// and stored alongside each history entry.
pub fn to_legacy_explanation(report: &CanonicalReport) -> String {
    let problems = report
        .problems
        .iter()
        .map(|p| {
            let line = match p.approx_line {
                Some(line) if line > 0 => format!(" (line ~{})", line),
                _ => String::new(),
            };
            format!("- [{}] ({}) {}{}", p.severity, p.problem_type, p.message, line)
        })
        .collect::<Vec<_>>()
        .join("\n");

    let fixes = report
        .fixes
        .iter()
        .map(|f| format!("- {}\n  - Why: {}", f.message, f.reason))
        .collect::<Vec<_>>()
        .join("\n");

    let or_none = |s: &str| {
        if s.is_empty() {
            "(none)".to_string()
        } else {
            s.to_string()
        }
    };

    [
        "Analysis:".to_string(),
        or_none(&report.analysis),
        String::new(),
        "Detected Problems:".to_string(),
        or_none(&problems),
        String::new(),
        "Fixes & Explanations:".to_string(),
        or_none(&fixes),
    ]
    .join("\n")
}
