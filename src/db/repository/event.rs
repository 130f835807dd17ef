use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::{EventStatus, EventType};
use crate::models::Event;

const EVENT_COLUMNS: &str = "id, type, event_header, event_description, event_date_to_complete_by,
     status, priority, updated_at";

pub fn insert_event(conn: &Connection, event: &Event) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO events (id, type, event_header, event_description, event_date_to_complete_by,
         status, priority, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            event.id.to_string(),
            event.event_type.as_str(),
            event.event_header,
            event.event_description,
            event.event_date_to_complete_by,
            event.status.as_str(),
            event.priority,
            event.updated_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

/// All events in insertion order.
pub fn list_events(conn: &Connection) -> Result<Vec<Event>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {EVENT_COLUMNS} FROM events ORDER BY rowid"
    ))?;
    let rows = stmt.query_map([], event_row_from_rusqlite)?;

    let mut events = Vec::new();
    for row in rows {
        events.push(event_from_row(row?)?);
    }
    Ok(events)
}

pub fn get_event(conn: &Connection, id: &Uuid) -> Result<Option<Event>, DatabaseError> {
    let mut stmt = conn.prepare(&format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = ?1"))?;
    let result = stmt.query_row(params![id.to_string()], event_row_from_rusqlite);

    match result {
        Ok(row) => Ok(Some(event_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Events of one type whose description contains `needle`, ignoring case
/// (Unicode-aware; SQLite's `lower()` folds ASCII only). Ordered by insertion.
pub fn find_events_by_description(
    conn: &Connection,
    event_type: EventType,
    needle: &str,
) -> Result<Vec<Event>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {EVENT_COLUMNS} FROM events WHERE type = ?1 ORDER BY rowid"
    ))?;
    let rows = stmt.query_map(params![event_type.as_str()], event_row_from_rusqlite)?;

    let needle = needle.to_lowercase();
    let mut events = Vec::new();
    for row in rows {
        let event = event_from_row(row?)?;
        if event.event_description.to_lowercase().contains(&needle) {
            events.push(event);
        }
    }
    Ok(events)
}

pub fn update_event_status(
    conn: &Connection,
    id: &Uuid,
    status: EventStatus,
    updated_at: DateTime<Utc>,
) -> Result<(), DatabaseError> {
    let rows = conn.execute(
        "UPDATE events SET status = ?2, updated_at = ?3 WHERE id = ?1",
        params![id.to_string(), status.as_str(), updated_at.to_rfc3339()],
    )?;
    if rows == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Event".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

pub fn delete_all_events(conn: &Connection) -> Result<usize, DatabaseError> {
    Ok(conn.execute("DELETE FROM events", [])?)
}

struct EventRow {
    id: String,
    event_type: String,
    event_header: String,
    event_description: String,
    event_date_to_complete_by: Option<String>,
    status: String,
    priority: i64,
    updated_at: String,
}

fn event_row_from_rusqlite(row: &rusqlite::Row) -> Result<EventRow, rusqlite::Error> {
    Ok(EventRow {
        id: row.get(0)?,
        event_type: row.get(1)?,
        event_header: row.get(2)?,
        event_description: row.get(3)?,
        event_date_to_complete_by: row.get(4)?,
        status: row.get(5)?,
        priority: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

fn event_from_row(row: EventRow) -> Result<Event, DatabaseError> {
    Ok(Event {
        id: parse_uuid("events.id", &row.id)?,
        event_type: EventType::from_str(&row.event_type)?,
        event_header: row.event_header,
        event_description: row.event_description,
        event_date_to_complete_by: row.event_date_to_complete_by,
        status: EventStatus::from_str(&row.status)?,
        priority: row.priority,
        updated_at: parse_timestamp("events.updated_at", &row.updated_at)?,
    })
}

pub(crate) fn parse_uuid(field: &str, value: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(value).map_err(|_| DatabaseError::InvalidValue {
        field: field.into(),
        value: value.into(),
    })
}

pub(crate) fn parse_timestamp(field: &str, value: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| DatabaseError::InvalidValue {
            field: field.into(),
            value: value.into(),
        })
}
