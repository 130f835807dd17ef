//! Hosted Postgres backend reached through its PostgREST interface (Supabase).
//!
//! Table layout lives in `resources/supabase_schema.sql`. Rows are ordered by
//! the identity column `seq`, which preserves insertion order.

use std::time::Duration;

use chrono::Utc;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use super::store::{CallLogStore, DocumentStore, EventStore};
use super::DatabaseError;
use crate::models::{
    CallLog, DocumentChunk, Event, EventStatus, EventType, NewCallLog, NewDocumentChunk, NewEvent,
};

const EVENTS: &str = "events";
const CALL_LOGS: &str = "call_logs";
const DOCUMENT_CHUNKS: &str = "document_chunks";

/// Matches every row. PostgREST refuses unfiltered deletes.
const ALL_ROWS_FILTER: &str = "neq.00000000-0000-0000-0000-000000000000";

pub struct PostgrestStore {
    rest_url: String,
    api_key: String,
    client: Client,
}

impl PostgrestStore {
    /// `project_url` is the Supabase project URL; `/rest/v1` is appended.
    pub fn new(project_url: &str, api_key: &str, timeout_secs: u64) -> Result<Self, DatabaseError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| DatabaseError::Http(e.to_string()))?;

        Ok(Self {
            rest_url: rest_url(project_url),
            api_key: api_key.to_string(),
            client,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.rest_url, table)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, String)],
    ) -> Result<Vec<T>, DatabaseError> {
        let request = self
            .client
            .get(self.table_url(table))
            .query(&[("select", "*")])
            .query(filters);
        let response = send(self.authorized(request))?;
        response
            .json()
            .map_err(|e| DatabaseError::Http(format!("Invalid {table} payload: {e}")))
    }

    fn insert<T: Serialize>(&self, table: &str, rows: &[T]) -> Result<(), DatabaseError> {
        if rows.is_empty() {
            return Ok(());
        }
        let request = self
            .client
            .post(self.table_url(table))
            .header("Prefer", "return=minimal")
            .json(rows);
        send(self.authorized(request))?;
        Ok(())
    }

    fn delete_all(&self, table: &str) -> Result<(), DatabaseError> {
        let request = self
            .client
            .delete(self.table_url(table))
            .query(&[("id", ALL_ROWS_FILTER)]);
        send(self.authorized(request))?;
        tracing::info!(table, "Cleared remote table");
        Ok(())
    }
}

fn send(request: RequestBuilder) -> Result<Response, DatabaseError> {
    let response = request.send().map_err(|e| {
        if e.is_timeout() {
            DatabaseError::Http("Request to remote store timed out".into())
        } else {
            DatabaseError::Http(e.to_string())
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(DatabaseError::Remote {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}

fn rest_url(project_url: &str) -> String {
    let base = project_url.trim_end_matches('/');
    if base.ends_with("/rest/v1") {
        base.to_string()
    } else {
        format!("{base}/rest/v1")
    }
}

/// PostgREST `ilike` operand matching `needle` anywhere in the column.
/// LIKE metacharacters in the needle are escaped; `*` is PostgREST's wildcard.
pub(crate) fn ilike_contains(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 8);
    for c in needle.chars() {
        match c {
            '\\' | '%' | '_' => {
                escaped.push('\\');
                escaped.push(c);
            }
            '*' => {}
            _ => escaped.push(c),
        }
    }
    format!("ilike.*{escaped}*")
}

#[derive(Serialize)]
struct StatusPatch {
    status: EventStatus,
    updated_at: chrono::DateTime<Utc>,
}

impl EventStore for PostgrestStore {
    fn insert_events(&self, rows: &[NewEvent]) -> Result<usize, DatabaseError> {
        let now = Utc::now();
        let events: Vec<Event> = rows
            .iter()
            .cloned()
            .map(|row| row.into_event(Uuid::new_v4(), now))
            .collect();
        self.insert(EVENTS, &events)?;
        Ok(events.len())
    }

    fn list_events(&self) -> Result<Vec<Event>, DatabaseError> {
        self.select(EVENTS, &[("order", "seq.asc".into())])
    }

    fn get_event(&self, id: &Uuid) -> Result<Option<Event>, DatabaseError> {
        let mut rows: Vec<Event> = self.select(EVENTS, &[("id", format!("eq.{id}"))])?;
        Ok(rows.pop())
    }

    fn update_status(&self, id: &Uuid, status: EventStatus) -> Result<(), DatabaseError> {
        let request = self
            .client
            .patch(self.table_url(EVENTS))
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .json(&StatusPatch {
                status,
                updated_at: Utc::now(),
            });
        let updated: Vec<Event> = send(self.authorized(request))?
            .json()
            .map_err(|e| DatabaseError::Http(format!("Invalid events payload: {e}")))?;

        if updated.is_empty() {
            return Err(DatabaseError::NotFound {
                entity_type: "Event".into(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    fn find_by_type_and_description(
        &self,
        event_type: EventType,
        needle: &str,
    ) -> Result<Vec<Event>, DatabaseError> {
        self.select(
            EVENTS,
            &[
                ("type", format!("eq.{}", event_type.as_str())),
                ("event_description", ilike_contains(needle)),
                ("order", "seq.asc".into()),
            ],
        )
    }

    fn clear_all(&self) -> Result<(), DatabaseError> {
        self.delete_all(EVENTS)
    }
}

impl CallLogStore for PostgrestStore {
    fn insert_call_log(&self, log: &NewCallLog) -> Result<CallLog, DatabaseError> {
        let log = log.clone().into_call_log(Uuid::new_v4(), Utc::now());
        self.insert(CALL_LOGS, std::slice::from_ref(&log))?;
        Ok(log)
    }

    fn list_call_logs(&self, patient_id: Option<&str>) -> Result<Vec<CallLog>, DatabaseError> {
        let mut filters = vec![("order", "created_at.desc".to_string())];
        if let Some(patient_id) = patient_id {
            filters.push(("patient_id", format!("eq.{patient_id}")));
        }
        self.select(CALL_LOGS, &filters)
    }
}

impl DocumentStore for PostgrestStore {
    fn insert_chunks(&self, chunks: &[NewDocumentChunk]) -> Result<usize, DatabaseError> {
        let rows: Vec<DocumentChunk> = chunks
            .iter()
            .cloned()
            .map(|chunk| chunk.into_chunk(Uuid::new_v4()))
            .collect();
        self.insert(DOCUMENT_CHUNKS, &rows)?;
        Ok(rows.len())
    }

    fn list_chunks(&self) -> Result<Vec<DocumentChunk>, DatabaseError> {
        self.select(DOCUMENT_CHUNKS, &[("order", "seq.asc".into())])
    }

    fn clear_chunks(&self) -> Result<(), DatabaseError> {
        self.delete_all(DOCUMENT_CHUNKS)
    }
}
