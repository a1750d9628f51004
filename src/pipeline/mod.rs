//! Report generation: prompt → model cascade → parse/repair → normalize →
//! static-finding merge → history.

mod repair;

pub use repair::parse_with_repair;

use crate::config::Config;
use crate::error::AnalyzeError;
use crate::history::{HistoryEntry, HistoryGateway};
use crate::prompt::{build_prompt, AnalysisRequest};
use crate::provider::{candidate_list, invoke, Invocation, ModelClient};
use crate::report::{
    degraded_report, merge_static_findings, normalize, CanonicalReport, NormalizeContext,
};
use crate::static_check::StaticAnalyzer;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisOutcome {
    pub report: CanonicalReport,
    pub model: String,
}

pub struct Analyzer {
    config: Arc<Config>,
    client: Arc<dyn ModelClient>,
    static_checker: Option<Arc<dyn StaticAnalyzer>>,
    history: Arc<HistoryGateway>,
}

impl Analyzer {
    pub fn new(
        config: Arc<Config>,
        client: Arc<dyn ModelClient>,
        static_checker: Option<Arc<dyn StaticAnalyzer>>,
        history: Arc<HistoryGateway>,
    ) -> Self {
        Self {
            config,
            client,
            static_checker,
            history,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn history(&self) -> &HistoryGateway {
        &self.history
    }

    /// Run the whole pipeline for one request. Only provider failures are
    /// returned as errors; unparseable output degrades into the report.
    pub async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisOutcome, AnalyzeError> {
        let prompt = build_prompt(&request);
        let candidates = candidate_list(
            &self.config.preferred_model(request.mode),
            &self.config.fallback_models,
        );
        debug!(
            "Analyzing {} chars of {} with candidates {:?} (using {})",
            request.code.chars().count(),
            request.language,
            candidates,
            self.client.name()
        );

        let static_findings = async {
            match &self.static_checker {
                Some(checker) => checker.check(&request.code, request.language).await,
                None => Vec::new(),
            }
        };
        let (invocation, static_findings) = tokio::join!(
            invoke(self.client.as_ref(), &prompt, &candidates),
            static_findings
        );
        let invocation = invocation?;

        let ctx = NormalizeContext {
            language: request.language,
        };
        let report = self.build_report(&invocation, &ctx).await;
        let report = merge_static_findings(report, static_findings);

        info!(
            "Analysis complete with {} ({} problems)",
            invocation.model,
            report.problems.len()
        );

        self.history
            .record(HistoryEntry::new(
                request.code,
                request.language,
                report.clone(),
                invocation.model.clone(),
            ))
            .await;

        Ok(AnalysisOutcome {
            report,
            model: invocation.model,
        })
    }

    async fn build_report(&self, invocation: &Invocation, ctx: &NormalizeContext) -> CanonicalReport {
        if invocation.text.trim().is_empty() {
            debug!("Model {} returned no text", invocation.model);
            return normalize(&Value::Null, ctx);
        }
        match parse_with_repair(
            self.client.as_ref(),
            &invocation.model,
            &invocation.text,
            ctx.language,
        )
        .await
        {
            Ok(value) => normalize(&value, ctx),
            Err(_) => degraded_report(ctx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::history::FileHistory;
    use crate::language::{Language, Mode};
    use crate::provider::mock::ScriptedClient;
    use crate::report::{placeholder_code, Problem, ProblemType, Severity};
    use async_trait::async_trait;
    use serde_json::json;
    use tempfile::TempDir;

    struct FixedFindings(Vec<Problem>);

    #[async_trait]
    impl StaticAnalyzer for FixedFindings {
        async fn check(&self, _code: &str, _language: Language) -> Vec<Problem> {
            self.0.clone()
        }
    }

    struct Harness {
        _dir: TempDir,
        client: Arc<ScriptedClient>,
        analyzer: Analyzer,
    }

    async fn harness(
        replies: Vec<Result<String, ProviderError>>,
        static_checker: Option<Arc<dyn StaticAnalyzer>>,
    ) -> Harness {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.model = Some("gemini-pro".to_string());
        let file = FileHistory::open(dir.path().join("history.json"), 50).await;
        let history = Arc::new(HistoryGateway::new(file, None, true));
        let client = Arc::new(ScriptedClient::new(replies));
        let analyzer = Analyzer::new(
            Arc::new(config),
            client.clone() as Arc<dyn ModelClient>,
            static_checker,
            history,
        );
        Harness {
            _dir: dir,
            client,
            analyzer,
        }
    }

    fn request(code: &str, language: Language) -> AnalysisRequest {
        AnalysisRequest {
            code: code.to_string(),
            language,
            mode: Mode::Balanced,
        }
    }

    fn reply(value: Value) -> Result<String, ProviderError> {
        Ok(value.to_string())
    }

    #[tokio::test]
    async fn test_off_by_one_scenario() {
        let h = harness(
            vec![reply(json!({
                "analysis": "Loop runs one step too far.",
                "detectedProblems": [
                    { "type": "logic", "severity": "high", "message": "Off-by-one", "approxLine": 3 }
                ],
                "fixes": [{ "message": "Use <", "reason": "Bounds" }],
                "correctedCode": "for(int i=0;i<n;i++)"
            }))],
            None,
        )
        .await;

        let outcome = h
            .analyzer
            .analyze(request("for(int i=0;i<=n;i++)", Language::Cpp))
            .await
            .unwrap();

        assert_eq!(outcome.report.problems[0].problem_type, ProblemType::Logic);
        assert_eq!(outcome.report.problems[0].approx_line, Some(3));
        assert_eq!(outcome.model, "gemini-pro");
        assert_eq!(h.client.call_count(), 1);

        let history = h.analyzer.history().recent(10).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].language, Language::Cpp);
        assert_eq!(history[0].fixed_code, "for(int i=0;i<n;i++)");
        h.analyzer.history().shutdown().await;
    }

    #[tokio::test]
    async fn test_fallback_reports_model_used() {
        let h = harness(
            vec![
                Err(ProviderError::Upstream {
                    status: 404,
                    message: "models/gemini-pro is not found for API version v1beta".into(),
                }),
                reply(json!({ "analysis": "ok", "correctedCode": "x" })),
            ],
            None,
        )
        .await;

        let outcome = h
            .analyzer
            .analyze(request("console.log('bug')", Language::Javascript))
            .await
            .unwrap();
        assert_ne!(outcome.model, "gemini-pro");
        assert_eq!(outcome.model, "gemini-1.5-flash");
        h.analyzer.history().shutdown().await;
    }

    #[tokio::test]
    async fn test_repair_success_uses_repaired_content() {
        let h = harness(
            vec![
                Ok("Here is my analysis: the loop is wrong.".to_string()),
                reply(json!({ "analysis": "repaired", "correctedCode": "fixed" })),
            ],
            None,
        )
        .await;

        let outcome = h
            .analyzer
            .analyze(request("x", Language::Python))
            .await
            .unwrap();
        assert_eq!(outcome.report.analysis, "repaired");
        assert_eq!(outcome.report.corrected_code, "fixed");
        assert_eq!(h.client.call_count(), 2);
        assert_eq!(h.client.models_called(), vec!["gemini-pro", "gemini-pro"]);
        h.analyzer.history().shutdown().await;
    }

    #[tokio::test]
    async fn test_failed_repair_degrades() {
        let h = harness(
            vec![
                Ok("not json".to_string()),
                Ok("still not json".to_string()),
                reply(json!({ "analysis": "never requested" })),
            ],
            None,
        )
        .await;

        let outcome = h
            .analyzer
            .analyze(request("x", Language::Go))
            .await
            .unwrap();
        assert_eq!(h.client.call_count(), 2);
        assert_eq!(outcome.report.problems.len(), 1);
        assert_eq!(outcome.report.problems[0].problem_type, ProblemType::Other);
        assert_eq!(outcome.report.problems[0].severity, Severity::High);
        assert_eq!(outcome.report.corrected_code, placeholder_code(Language::Go));
        h.analyzer.history().shutdown().await;
    }

    #[tokio::test]
    async fn test_empty_output_skips_repair() {
        let h = harness(vec![Ok("   ".to_string())], None).await;
        let outcome = h
            .analyzer
            .analyze(request("x", Language::Java))
            .await
            .unwrap();
        assert_eq!(h.client.call_count(), 1);
        assert!(outcome.report.problems.is_empty());
        assert!(outcome.report.fixes.is_empty());
        assert_eq!(outcome.report.corrected_code, placeholder_code(Language::Java));
        h.analyzer.history().shutdown().await;
    }

    #[tokio::test]
    async fn test_provider_failure_propagates_without_history() {
        let h = harness(
            vec![Err(ProviderError::Upstream {
                status: 403,
                message: "API key not valid".into(),
            })],
            None,
        )
        .await;

        let err = h
            .analyzer
            .analyze(request("x", Language::Go))
            .await
            .unwrap_err();
        let AnalyzeError::Provider(provider) = err;
        assert_eq!(provider.status(), Some(403));
        assert!(h.analyzer.history().recent(10).await.unwrap().is_empty());
        h.analyzer.history().shutdown().await;
    }

    #[tokio::test]
    async fn test_static_finding_comes_first() {
        let finding = Problem {
            problem_type: ProblemType::Syntax,
            severity: Severity::High,
            message: "expected ';' before '}'".to_string(),
            approx_line: Some(2),
            snippet: None,
        };
        let h = harness(
            vec![reply(json!({
                "detectedProblems": [
                    { "type": "logic", "message": "first model finding" },
                    { "type": "performance", "message": "second model finding" }
                ]
            }))],
            Some(Arc::new(FixedFindings(vec![finding.clone()]))),
        )
        .await;

        let outcome = h
            .analyzer
            .analyze(request("int main(){ return 0 }", Language::Cpp))
            .await
            .unwrap();
        assert_eq!(outcome.report.problems.len(), 3);
        assert_eq!(outcome.report.problems[0], finding);
        assert_eq!(outcome.report.problems[1].message, "first model finding");
        h.analyzer.history().shutdown().await;
    }
}
