use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{EventStatus, EventType};

/// Default priority for every care-plan event.
pub const DEFAULT_PRIORITY: i64 = 1;

fn default_priority() -> i64 {
    DEFAULT_PRIORITY
}

/// A tracked care-plan task as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub event_header: String,
    pub event_description: String,
    pub event_date_to_complete_by: Option<String>,
    pub status: EventStatus,
    #[serde(default = "default_priority")]
    pub priority: i64,
    pub updated_at: DateTime<Utc>,
}

/// A normalized event awaiting insertion. Stores always insert it as `pending`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEvent {
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub event_header: String,
    pub event_description: String,
    pub event_date_to_complete_by: String,
    pub priority: i64,
}

impl NewEvent {
    pub fn into_event(self, id: Uuid, now: DateTime<Utc>) -> Event {
        Event {
            id,
            event_type: self.event_type,
            event_header: self.event_header,
            event_description: self.event_description,
            event_date_to_complete_by: Some(self.event_date_to_complete_by),
            status: EventStatus::Pending,
            priority: self.priority,
            updated_at: now,
        }
    }
}
