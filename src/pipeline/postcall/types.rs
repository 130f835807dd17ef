use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::EventType;

/// Highest value on the 0-10 pain scale.
pub const MAX_PAIN_LEVEL: u8 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicationUpdate {
    pub medication_name: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseUpdate {
    pub exercise_name: String,
    pub status: String,
}

/// Structured reading of one call transcript.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallAnalysis {
    pub summary: String,
    pub medication_events: Vec<MedicationUpdate>,
    pub exercise_events: Vec<ExerciseUpdate>,
    pub pain_level: Option<u8>,
    pub symptoms: Vec<String>,
}

impl CallAnalysis {
    /// Lenient read of the model's object. Entries without a name are dropped,
    /// a missing status reads as `unknown`, pain is clamped to 0-10.
    pub fn from_json(value: &Value) -> Self {
        let summary = value
            .get("summary")
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or_default()
            .to_string();

        let medication_events = named_entries(value, "medication_events", "medication_name")
            .map(|(medication_name, status)| MedicationUpdate {
                medication_name,
                status,
            })
            .collect();
        let exercise_events = named_entries(value, "exercise_events", "exercise_name")
            .map(|(exercise_name, status)| ExerciseUpdate {
                exercise_name,
                status,
            })
            .collect();

        let symptoms = value
            .get("symptoms")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            summary,
            medication_events,
            exercise_events,
            pain_level: value.get("pain_level").and_then(pain_level_from_json),
            symptoms,
        }
    }

    /// Every medication and exercise mention, medications first.
    pub fn status_updates(&self) -> Vec<StatusUpdate> {
        let medications = self.medication_events.iter().map(|m| StatusUpdate {
            event_type: EventType::Medication,
            name: m.medication_name.clone(),
            status: m.status.clone(),
        });
        let exercises = self.exercise_events.iter().map(|e| StatusUpdate {
            event_type: EventType::Exercise,
            name: e.exercise_name.clone(),
            status: e.status.clone(),
        });
        medications.chain(exercises).collect()
    }
}

fn named_entries<'a>(
    value: &'a Value,
    list_key: &str,
    name_key: &'a str,
) -> impl Iterator<Item = (String, String)> + 'a {
    value
        .get(list_key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(move |entry| {
            let name = entry.get(name_key)?.as_str()?.trim();
            if name.is_empty() {
                return None;
            }
            let status = entry
                .get("status")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .trim();
            Some((name.to_string(), status.to_string()))
        })
}

fn pain_level_from_json(value: &Value) -> Option<u8> {
    let level = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    if !level.is_finite() {
        return None;
    }
    Some(level.round().clamp(0.0, MAX_PAIN_LEVEL as f64) as u8)
}

/// One mention of a tracked item and what the patient said about it.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusUpdate {
    pub event_type: EventType,
    pub name: String,
    pub status: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    /// Analysis and persistence succeeded.
    Ok,
    /// Summary produced, but a store write failed.
    Partial,
    /// The model call or its output failed; summary is a placeholder.
    Degraded,
}

/// Response to the post-call webhook. Check `error` before trusting it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostCallReport {
    pub status: ReportStatus,
    pub summary: String,
    pub medication_events: Vec<MedicationUpdate>,
    pub exercise_events: Vec<ExerciseUpdate>,
    pub pain_level: Option<u8>,
    pub symptoms: Vec<String>,
    pub events_updated: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
