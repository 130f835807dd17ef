use std::sync::Arc;

use super::analysis::analyze_transcript;
use super::reconcile::reconcile_update;
use super::types::{PostCallReport, ReportStatus};
use crate::db::{CallLogStore, EventStore};
use crate::models::{Event, EventType, NewCallLog};
use crate::pipeline::llm::LlmClient;

/// Runs the post-call pipeline for one webhook delivery.
pub struct PostCallProcessor {
    llm: Arc<dyn LlmClient>,
    events: Arc<dyn EventStore>,
    call_logs: Arc<dyn CallLogStore>,
}

impl PostCallProcessor {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        events: Arc<dyn EventStore>,
        call_logs: Arc<dyn CallLogStore>,
    ) -> Self {
        Self {
            llm,
            events,
            call_logs,
        }
    }

    /// Analyze, reconcile and log one call. Always returns a report; the
    /// summary survives any store failure.
    pub fn process(&self, patient_id: &str, transcript: &str) -> PostCallReport {
        let tracked = self.tracked_items(patient_id);
        let outcome = analyze_transcript(self.llm.as_ref(), transcript, &tracked);

        let mut status = if outcome.is_degraded() {
            ReportStatus::Degraded
        } else {
            ReportStatus::Ok
        };
        let mut errors: Vec<String> = outcome.error.iter().cloned().collect();

        let mut events_updated = 0;
        if !outcome.is_degraded() {
            for update in outcome.analysis.status_updates() {
                match reconcile_update(self.events.as_ref(), &update) {
                    Ok(count) => events_updated += count,
                    Err(e) => {
                        tracing::error!(
                            patient_id,
                            name = %update.name,
                            error = %e,
                            "Event reconciliation failed"
                        );
                        status = ReportStatus::Partial;
                        errors.push(format!("Failed to update '{}': {e}", update.name));
                    }
                }
            }
        }

        let log = NewCallLog {
            patient_id: patient_id.to_string(),
            transcript: transcript.to_string(),
            summary: outcome.analysis.summary.clone(),
            pain_level: outcome.analysis.pain_level,
            symptoms: outcome.analysis.symptoms.clone(),
        };
        if let Err(e) = self.call_logs.insert_call_log(&log) {
            tracing::error!(patient_id, error = %e, "Failed to store call log");
            if status == ReportStatus::Ok {
                status = ReportStatus::Partial;
            }
            errors.push(format!("Failed to store call log: {e}"));
        }

        tracing::info!(
            patient_id,
            status = ?status,
            events_updated,
            pain_level = ?outcome.analysis.pain_level,
            "Processed post-call transcript"
        );

        let analysis = outcome.analysis;
        PostCallReport {
            status,
            summary: analysis.summary,
            medication_events: analysis.medication_events,
            exercise_events: analysis.exercise_events,
            pain_level: analysis.pain_level,
            symptoms: analysis.symptoms,
            events_updated,
            error: (!errors.is_empty()).then(|| errors.join("; ")),
        }
    }

    /// Medication and exercise events for the prompt. A failed read only
    /// costs the model some context.
    fn tracked_items(&self, patient_id: &str) -> Vec<Event> {
        match self.events.list_events() {
            Ok(events) => events
                .into_iter()
                .filter(|e| matches!(e.event_type, EventType::Medication | EventType::Exercise))
                .collect(),
            Err(e) => {
                tracing::warn!(patient_id, error = %e, "Could not load tracked events for prompt");
                Vec::new()
            }
        }
    }
}
