use super::prompt::build_postcall_prompt;
use super::types::CallAnalysis;
use crate::models::Event;
use crate::pipeline::llm::LlmClient;
use crate::pipeline::recovery::JsonRecovery;

/// Summary used when the model gave nothing usable.
pub const FALLBACK_SUMMARY: &str =
    "Call completed. An automated summary could not be generated; please review the transcript.";

/// Result of the analysis step. `error` set means the analysis is the
/// default structure and must not drive event updates.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutcome {
    pub analysis: CallAnalysis,
    pub error: Option<String>,
}

impl AnalysisOutcome {
    fn degraded(error: String) -> Self {
        Self {
            analysis: CallAnalysis {
                summary: FALLBACK_SUMMARY.to_string(),
                ..Default::default()
            },
            error: Some(error),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}

/// Analyze a call transcript. Never fails: model or parse failures yield the
/// default structure with `error` set.
pub fn analyze_transcript(llm: &dyn LlmClient, transcript: &str, tracked: &[Event]) -> AnalysisOutcome {
    let prompt = build_postcall_prompt(transcript, tracked);

    let response = match llm.complete(&prompt) {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(model = llm.model(), error = %e, "Post-call analysis model call failed");
            return AnalysisOutcome::degraded(format!("Analysis unavailable: {e}"));
        }
    };

    let value = match JsonRecovery::for_object().recover(&response) {
        Ok(value) if value.is_object() => value,
        Ok(_) => {
            tracing::warn!("Post-call analysis was JSON but not an object");
            return AnalysisOutcome::degraded("Analysis output was not a JSON object".into());
        }
        Err(e) => {
            tracing::warn!(error = %e, "Post-call analysis output unparseable");
            return AnalysisOutcome::degraded(e.to_string());
        }
    };

    let mut analysis = CallAnalysis::from_json(&value);
    if analysis.summary.is_empty() {
        analysis.summary = FALLBACK_SUMMARY.to_string();
    }
    AnalysisOutcome {
        analysis,
        error: None,
    }
}
