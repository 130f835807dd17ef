use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One processed post-call webhook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallLog {
    pub id: Uuid,
    pub patient_id: String,
    pub transcript: String,
    pub summary: String,
    pub pain_level: Option<u8>,
    #[serde(default)]
    pub symptoms: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCallLog {
    pub patient_id: String,
    pub transcript: String,
    pub summary: String,
    pub pain_level: Option<u8>,
    pub symptoms: Vec<String>,
}

impl NewCallLog {
    pub fn into_call_log(self, id: Uuid, now: DateTime<Utc>) -> CallLog {
        CallLog {
            id,
            patient_id: self.patient_id,
            transcript: self.transcript,
            summary: self.summary,
            pain_level: self.pain_level,
            symptoms: self.symptoms,
            created_at: now,
        }
    }
}
