//! Store capabilities consumed by the pipelines.
//!
//! The pipelines only see these traits; `SqliteStore`, `PostgrestStore`
//! and `MemoryStore` are interchangeable behind them.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::Connection;
use uuid::Uuid;

use super::repository;
use super::sqlite::{open_database, open_memory_database};
use super::DatabaseError;
use crate::models::{
    CallLog, DocumentChunk, Event, EventStatus, EventType, NewCallLog, NewDocumentChunk, NewEvent,
};

/// Persistence of care-plan events.
pub trait EventStore: Send + Sync {
    /// Insert rows as `pending` events. Returns the number inserted.
    fn insert_events(&self, rows: &[NewEvent]) -> Result<usize, DatabaseError>;

    fn list_events(&self) -> Result<Vec<Event>, DatabaseError>;

    fn get_event(&self, id: &Uuid) -> Result<Option<Event>, DatabaseError>;

    /// Fails with `DatabaseError::NotFound` when no event has this id.
    fn update_status(&self, id: &Uuid, status: EventStatus) -> Result<(), DatabaseError>;

    /// Events of `event_type` whose description contains `needle`,
    /// case-insensitively, in the store's default order.
    fn find_by_type_and_description(
        &self,
        event_type: EventType,
        needle: &str,
    ) -> Result<Vec<Event>, DatabaseError>;

    fn clear_all(&self) -> Result<(), DatabaseError>;
}

/// Persistence of processed call transcripts.
pub trait CallLogStore: Send + Sync {
    fn insert_call_log(&self, log: &NewCallLog) -> Result<CallLog, DatabaseError>;

    fn list_call_logs(&self, patient_id: Option<&str>) -> Result<Vec<CallLog>, DatabaseError>;
}

/// Persistence of document text chunks used for care-plan Q&A.
pub trait DocumentStore: Send + Sync {
    fn insert_chunks(&self, chunks: &[NewDocumentChunk]) -> Result<usize, DatabaseError>;

    fn list_chunks(&self) -> Result<Vec<DocumentChunk>, DatabaseError>;

    fn clear_chunks(&self) -> Result<(), DatabaseError>;
}

/// SQLite-backed store. One connection, serialized behind a mutex.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        Ok(Self {
            conn: Mutex::new(open_database(path)?),
        })
    }

    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        Ok(Self {
            conn: Mutex::new(open_memory_database()?),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, DatabaseError> {
        self.conn.lock().map_err(|_| DatabaseError::LockPoisoned)
    }
}

impl EventStore for SqliteStore {
    fn insert_events(&self, rows: &[NewEvent]) -> Result<usize, DatabaseError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let now = Utc::now();
        for row in rows {
            let event = row.clone().into_event(Uuid::new_v4(), now);
            repository::insert_event(&tx, &event)?;
        }
        tx.commit()?;
        Ok(rows.len())
    }

    fn list_events(&self) -> Result<Vec<Event>, DatabaseError> {
        repository::list_events(&*self.conn()?)
    }

    fn get_event(&self, id: &Uuid) -> Result<Option<Event>, DatabaseError> {
        repository::get_event(&*self.conn()?, id)
    }

    fn update_status(&self, id: &Uuid, status: EventStatus) -> Result<(), DatabaseError> {
        repository::update_event_status(&*self.conn()?, id, status, Utc::now())
    }

    fn find_by_type_and_description(
        &self,
        event_type: EventType,
        needle: &str,
    ) -> Result<Vec<Event>, DatabaseError> {
        repository::find_events_by_description(&*self.conn()?, event_type, needle)
    }

    fn clear_all(&self) -> Result<(), DatabaseError> {
        let removed = repository::delete_all_events(&*self.conn()?)?;
        tracing::info!(removed, "Cleared events");
        Ok(())
    }
}

impl CallLogStore for SqliteStore {
    fn insert_call_log(&self, log: &NewCallLog) -> Result<CallLog, DatabaseError> {
        let log = log.clone().into_call_log(Uuid::new_v4(), Utc::now());
        repository::insert_call_log(&*self.conn()?, &log)?;
        Ok(log)
    }

    fn list_call_logs(&self, patient_id: Option<&str>) -> Result<Vec<CallLog>, DatabaseError> {
        repository::list_call_logs(&*self.conn()?, patient_id)
    }
}

impl DocumentStore for SqliteStore {
    fn insert_chunks(&self, chunks: &[NewDocumentChunk]) -> Result<usize, DatabaseError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        for chunk in chunks {
            repository::insert_document_chunk(&tx, &chunk.clone().into_chunk(Uuid::new_v4()))?;
        }
        tx.commit()?;
        Ok(chunks.len())
    }

    fn list_chunks(&self) -> Result<Vec<DocumentChunk>, DatabaseError> {
        repository::list_document_chunks(&*self.conn()?)
    }

    fn clear_chunks(&self) -> Result<(), DatabaseError> {
        let removed = repository::delete_all_document_chunks(&*self.conn()?)?;
        tracing::info!(removed, "Cleared document chunks");
        Ok(())
    }
}
