//! In-process store. Backs `CAREFLOW_STORE_BACKEND=memory` and the pipeline tests.

use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use uuid::Uuid;

use super::store::{CallLogStore, DocumentStore, EventStore};
use super::DatabaseError;
use crate::models::{
    CallLog, DocumentChunk, Event, EventStatus, EventType, NewCallLog, NewDocumentChunk, NewEvent,
};

#[derive(Default)]
struct MemoryTables {
    events: Vec<Event>,
    call_logs: Vec<CallLog>,
    chunks: Vec<DocumentChunk>,
}

/// Vec-backed store keeping insertion order.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<MemoryTables>,
    status_writes: Mutex<Vec<(Uuid, EventStatus)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with events, inserted as given.
    pub fn with_events(events: Vec<Event>) -> Self {
        let store = Self::new();
        if let Ok(mut tables) = store.tables.lock() {
            tables.events = events;
        }
        store
    }

    /// Every `update_status` call that reached the store, in order.
    pub fn status_writes(&self) -> Vec<(Uuid, EventStatus)> {
        self.status_writes
            .lock()
            .map(|writes| writes.clone())
            .unwrap_or_default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, MemoryTables>, DatabaseError> {
        self.tables.lock().map_err(|_| DatabaseError::LockPoisoned)
    }
}

impl EventStore for MemoryStore {
    fn insert_events(&self, rows: &[NewEvent]) -> Result<usize, DatabaseError> {
        let now = Utc::now();
        let mut tables = self.tables()?;
        tables.events.extend(
            rows.iter()
                .cloned()
                .map(|row| row.into_event(Uuid::new_v4(), now)),
        );
        Ok(rows.len())
    }

    fn list_events(&self) -> Result<Vec<Event>, DatabaseError> {
        Ok(self.tables()?.events.clone())
    }

    fn get_event(&self, id: &Uuid) -> Result<Option<Event>, DatabaseError> {
        Ok(self.tables()?.events.iter().find(|e| &e.id == id).cloned())
    }

    fn update_status(&self, id: &Uuid, status: EventStatus) -> Result<(), DatabaseError> {
        let mut tables = self.tables()?;
        let event = tables
            .events
            .iter_mut()
            .find(|e| &e.id == id)
            .ok_or_else(|| DatabaseError::NotFound {
                entity_type: "Event".into(),
                id: id.to_string(),
            })?;
        event.status = status;
        event.updated_at = Utc::now();
        drop(tables);

        if let Ok(mut writes) = self.status_writes.lock() {
            writes.push((*id, status));
        }
        Ok(())
    }

    fn find_by_type_and_description(
        &self,
        event_type: EventType,
        needle: &str,
    ) -> Result<Vec<Event>, DatabaseError> {
        let needle = needle.to_lowercase();
        Ok(self
            .tables()?
            .events
            .iter()
            .filter(|e| {
                e.event_type == event_type
                    && e.event_description.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect())
    }

    fn clear_all(&self) -> Result<(), DatabaseError> {
        self.tables()?.events.clear();
        Ok(())
    }
}

impl CallLogStore for MemoryStore {
    fn insert_call_log(&self, log: &NewCallLog) -> Result<CallLog, DatabaseError> {
        let log = log.clone().into_call_log(Uuid::new_v4(), Utc::now());
        self.tables()?.call_logs.push(log.clone());
        Ok(log)
    }

    fn list_call_logs(&self, patient_id: Option<&str>) -> Result<Vec<CallLog>, DatabaseError> {
        Ok(self
            .tables()?
            .call_logs
            .iter()
            .rev()
            .filter(|log| patient_id.map_or(true, |p| log.patient_id == p))
            .cloned()
            .collect())
    }
}

impl DocumentStore for MemoryStore {
    fn insert_chunks(&self, chunks: &[NewDocumentChunk]) -> Result<usize, DatabaseError> {
        let mut tables = self.tables()?;
        tables.chunks.extend(
            chunks
                .iter()
                .cloned()
                .map(|chunk| chunk.into_chunk(Uuid::new_v4())),
        );
        Ok(chunks.len())
    }

    fn list_chunks(&self) -> Result<Vec<DocumentChunk>, DatabaseError> {
        Ok(self.tables()?.chunks.clone())
    }

    fn clear_chunks(&self) -> Result<(), DatabaseError> {
        self.tables()?.chunks.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_event(event_type: EventType, description: &str) -> NewEvent {
        NewEvent {
            event_type,
            event_header: "Header".into(),
            event_description: description.into(),
            event_date_to_complete_by: "2025-04-26T08:00:00".into(),
            priority: 1,
        }
    }

    #[test]
    fn find_matches_substring_in_any_case() {
        let store = MemoryStore::new();
        store
            .insert_events(&[
                new_event(EventType::Medication, "Take Amoxicillin twice daily"),
                new_event(EventType::Medication, "Ibuprofen as needed"),
            ])
            .unwrap();

        let found = store
            .find_by_type_and_description(EventType::Medication, "AMOXI")
            .unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].event_description.contains("Amoxicillin"));
    }

    #[test]
    fn update_status_records_write() {
        let store = MemoryStore::new();
        store
            .insert_events(&[new_event(EventType::Exercise, "Ankle pumps 10x")])
            .unwrap();
        let id = store.list_events().unwrap()[0].id;

        store.update_status(&id, EventStatus::Partial).unwrap();
        assert_eq!(store.status_writes(), vec![(id, EventStatus::Partial)]);
        assert_eq!(
            store.get_event(&id).unwrap().unwrap().status,
            EventStatus::Partial
        );
    }

    #[test]
    fn update_unknown_id_is_not_found_and_not_recorded() {
        let store = MemoryStore::new();
        let result = store.update_status(&Uuid::new_v4(), EventStatus::Missed);
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
        assert!(store.status_writes().is_empty());
    }

    #[test]
    fn clear_all_then_list_is_empty() {
        let store = MemoryStore::new();
        store
            .insert_events(&[new_event(EventType::Appointment, "Wound check")])
            .unwrap();
        store.clear_all().unwrap();
        assert!(store.list_events().unwrap().is_empty());
    }

    #[test]
    fn call_logs_newest_first() {
        let store = MemoryStore::new();
        for summary in ["first", "second"] {
            store
                .insert_call_log(&NewCallLog {
                    patient_id: "p1".into(),
                    transcript: "t".into(),
                    summary: summary.into(),
                    pain_level: None,
                    symptoms: vec![],
                })
                .unwrap();
        }
        let logs = store.list_call_logs(Some("p1")).unwrap();
        assert_eq!(logs[0].summary, "second");
        assert!(store.list_call_logs(Some("p2")).unwrap().is_empty());
    }
}
