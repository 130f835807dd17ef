use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;

use super::parser::{normalize_candidates, parse_event_candidates};
use super::prompt::build_event_extraction_prompt;
use super::types::ExtractedEventCandidate;
use crate::db::EventStore;
use crate::pipeline::extraction::{join_pages, DocumentLoader};
use crate::pipeline::llm::LlmClient;
use crate::pipeline::PipelineError;

/// Care-plan event extraction: prompt → LLM → recover JSON → candidates.
pub struct CarePlanEventExtractor {
    llm: Arc<dyn LlmClient>,
    plan_start_date: NaiveDate,
}

impl CarePlanEventExtractor {
    pub fn new(llm: Arc<dyn LlmClient>, plan_start_date: NaiveDate) -> Self {
        Self {
            llm,
            plan_start_date,
        }
    }

    /// One candidate per element of the model's JSON array, in order.
    pub fn extract(&self, document_text: &str) -> Result<Vec<ExtractedEventCandidate>, PipelineError> {
        let prompt = build_event_extraction_prompt(document_text, self.plan_start_date);
        let response = self.llm.complete(&prompt)?;
        let candidates = parse_event_candidates(&response)?;
        tracing::info!(
            model = self.llm.model(),
            candidates = candidates.len(),
            "Extracted event candidates"
        );
        Ok(candidates)
    }
}

/// Load a stored care-plan PDF, extract its events and insert them as `pending`.
/// Returns the number of events inserted.
pub fn initialize_events_from_pdf(
    path: &Path,
    loader: &dyn DocumentLoader,
    extractor: &CarePlanEventExtractor,
    store: &dyn EventStore,
) -> Result<usize, PipelineError> {
    let pages = loader.load(path)?;
    if pages.is_empty() {
        return Err(PipelineError::NoContent);
    }

    let text = join_pages(&pages);
    let candidates = extractor.extract(&text)?;
    if candidates.is_empty() {
        return Err(PipelineError::NoEventsExtracted);
    }

    let events = normalize_candidates(&candidates);
    if events.is_empty() {
        tracing::warn!(
            candidates = candidates.len(),
            "Every extracted candidate was discarded"
        );
        return Err(PipelineError::NoEventsExtracted);
    }

    let inserted = store.insert_events(&events)?;
    tracing::info!(
        path = %path.display(),
        inserted,
        discarded = candidates.len() - events.len(),
        "Initialized events from care plan"
    );
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::db::{DatabaseError, MemoryStore};
    use crate::models::{Event, EventStatus, EventType, NewEvent};
    use crate::pipeline::extraction::{DocumentError, DocumentPage};
    use crate::pipeline::llm::MockLlmClient;
    use uuid::Uuid;

    struct StaticLoader(Vec<DocumentPage>);

    impl DocumentLoader for StaticLoader {
        fn load(&self, _path: &Path) -> Result<Vec<DocumentPage>, DocumentError> {
            Ok(self.0.clone())
        }
    }

    /// Records what `insert_events` receives.
    #[derive(Default)]
    struct RecordingStore {
        inserted: Mutex<Vec<NewEvent>>,
    }

    impl EventStore for RecordingStore {
        fn insert_events(&self, rows: &[NewEvent]) -> Result<usize, DatabaseError> {
            self.inserted.lock().unwrap().extend_from_slice(rows);
            Ok(rows.len())
        }
        fn list_events(&self) -> Result<Vec<Event>, DatabaseError> {
            Ok(vec![])
        }
        fn get_event(&self, _id: &Uuid) -> Result<Option<Event>, DatabaseError> {
            Ok(None)
        }
        fn update_status(&self, _id: &Uuid, _status: EventStatus) -> Result<(), DatabaseError> {
            Ok(())
        }
        fn find_by_type_and_description(
            &self,
            _event_type: EventType,
            _needle: &str,
        ) -> Result<Vec<Event>, DatabaseError> {
            Ok(vec![])
        }
        fn clear_all(&self) -> Result<(), DatabaseError> {
            Ok(())
        }
    }

    const TWO_EVENTS: &str = r#"[
        {"type": "medication", "event_header": "Morning Medication", "event_description": "Take Amoxicillin twice daily", "event_date_to_complete_by": "2025-04-26T08:00:00", "priority": 1},
        {"type": "exercise", "event_header": "Physical Therapy", "event_description": "Ankle pumps 10x", "event_date_to_complete_by": "2025-04-26T08:30:00"}
    ]"#;

    fn plan_pages() -> StaticLoader {
        StaticLoader(vec![
            DocumentPage {
                text: "Day 1: Take Amoxicillin twice daily.".into(),
                page_label: "Page 1".into(),
            },
            DocumentPage {
                text: "Day 1: Ankle pumps 10x.".into(),
                page_label: "Page 2".into(),
            },
        ])
    }

    fn extractor(llm: Arc<MockLlmClient>) -> CarePlanEventExtractor {
        CarePlanEventExtractor::new(llm, NaiveDate::from_ymd_opt(2025, 4, 26).unwrap())
    }

    #[test]
    fn two_event_document_inserts_two_pending_rows_with_priority_one() {
        let llm = Arc::new(MockLlmClient::new(TWO_EVENTS));
        let store = RecordingStore::default();

        let inserted =
            initialize_events_from_pdf(Path::new("plan.pdf"), &plan_pages(), &extractor(llm.clone()), &store)
                .unwrap();
        assert_eq!(inserted, 2);

        let rows = store.inserted.lock().unwrap().clone();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.priority == 1));
        assert_eq!(rows[0].event_type, EventType::Medication);
        assert_eq!(rows[1].event_description, "Ankle pumps 10x");

        // Pages reach the model joined by a blank line.
        assert!(llm.prompts()[0].contains("Take Amoxicillin twice daily.\n\nDay 1: Ankle pumps 10x."));
    }

    #[test]
    fn stored_events_start_pending() {
        let llm = Arc::new(MockLlmClient::new(TWO_EVENTS));
        let store = MemoryStore::new();

        initialize_events_from_pdf(Path::new("plan.pdf"), &plan_pages(), &extractor(llm), &store).unwrap();
        let events = store.list_events().unwrap();
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.status == EventStatus::Pending && e.priority == 1));
    }

    #[test]
    fn empty_extraction_is_no_events_extracted() {
        let llm = Arc::new(MockLlmClient::new("[]"));
        let result =
            initialize_events_from_pdf(Path::new("plan.pdf"), &plan_pages(), &extractor(llm), &MemoryStore::new());
        assert!(matches!(result, Err(PipelineError::NoEventsExtracted)));
    }

    #[test]
    fn all_candidates_invalid_is_no_events_extracted() {
        let llm = Arc::new(MockLlmClient::new(r#"[{"type": "surgery"}]"#));
        let result =
            initialize_events_from_pdf(Path::new("plan.pdf"), &plan_pages(), &extractor(llm), &MemoryStore::new());
        assert!(matches!(result, Err(PipelineError::NoEventsExtracted)));
    }

    #[test]
    fn unparseable_output_is_malformed_and_nothing_stored() {
        let llm = Arc::new(MockLlmClient::new("Sorry, I can't help with that."));
        let store = MemoryStore::new();
        let result = initialize_events_from_pdf(Path::new("plan.pdf"), &plan_pages(), &extractor(llm), &store);
        assert!(matches!(result, Err(PipelineError::MalformedModelOutput(_))));
        assert!(store.list_events().unwrap().is_empty());
    }

    #[test]
    fn llm_failure_is_extraction_error() {
        let llm = Arc::new(MockLlmClient::failing("connection refused"));
        let result =
            initialize_events_from_pdf(Path::new("plan.pdf"), &plan_pages(), &extractor(llm), &MemoryStore::new());
        assert!(matches!(result, Err(PipelineError::Extraction(_))));
    }

    #[test]
    fn textless_document_skips_the_model() {
        let llm = Arc::new(MockLlmClient::new(TWO_EVENTS));
        let result = initialize_events_from_pdf(
            Path::new("scan.pdf"),
            &StaticLoader(vec![]),
            &extractor(llm.clone()),
            &MemoryStore::new(),
        );
        assert!(matches!(result, Err(PipelineError::NoContent)));
        assert_eq!(llm.call_count(), 0);
    }
}
