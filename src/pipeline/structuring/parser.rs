use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

use super::types::{CandidateRejection, ExtractedEventCandidate};
use crate::models::{EventType, NewEvent, DEFAULT_PRIORITY};
use crate::pipeline::recovery::JsonRecovery;
use crate::pipeline::PipelineError;

/// Stored shape of `event_date_to_complete_by`.
pub const EVENT_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parse model output into one candidate per array element, in order.
///
/// Accepts a bare array or `{"events": [...]}`. Any other shape, or an
/// element that is not an object, is `MalformedModelOutput`.
pub fn parse_event_candidates(response: &str) -> Result<Vec<ExtractedEventCandidate>, PipelineError> {
    let value = JsonRecovery::for_array().recover(response)?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut object) => match object.remove("events") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(PipelineError::MalformedModelOutput(
                    "expected a JSON array of events".into(),
                ))
            }
        },
        _ => {
            return Err(PipelineError::MalformedModelOutput(
                "expected a JSON array of events".into(),
            ))
        }
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            item.as_object()
                .map(ExtractedEventCandidate::from_json)
                .ok_or_else(|| {
                    PipelineError::MalformedModelOutput(format!(
                        "event {index} is not a JSON object"
                    ))
                })
        })
        .collect()
}

/// Validate one candidate into an insertable event.
pub fn normalize_candidate(candidate: &ExtractedEventCandidate) -> Result<NewEvent, CandidateRejection> {
    let raw_type = candidate
        .event_type
        .as_deref()
        .ok_or(CandidateRejection::MissingField("type"))?;
    let event_type: EventType = raw_type
        .to_ascii_lowercase()
        .parse()
        .map_err(|_| CandidateRejection::UnknownType(raw_type.to_string()))?;

    let event_header = candidate
        .event_header
        .clone()
        .ok_or(CandidateRejection::MissingField("event_header"))?;
    let event_description = candidate
        .event_description
        .clone()
        .ok_or(CandidateRejection::MissingField("event_description"))?;

    let raw_date = candidate
        .event_date_to_complete_by
        .as_deref()
        .ok_or(CandidateRejection::MissingField("event_date_to_complete_by"))?;
    let event_date_to_complete_by = normalize_event_date(raw_date)
        .ok_or_else(|| CandidateRejection::InvalidDate(raw_date.to_string()))?;

    Ok(NewEvent {
        event_type,
        event_header,
        event_description,
        event_date_to_complete_by,
        priority: candidate.priority.unwrap_or(DEFAULT_PRIORITY),
    })
}

/// Normalize candidates, dropping (and logging) the ones that fail validation.
pub fn normalize_candidates(candidates: &[ExtractedEventCandidate]) -> Vec<NewEvent> {
    candidates
        .iter()
        .enumerate()
        .filter_map(|(index, candidate)| match normalize_candidate(candidate) {
            Ok(event) => Some(event),
            Err(reason) => {
                tracing::warn!(index, %reason, "Discarding extracted event");
                None
            }
        })
        .collect()
}

/// Accepts RFC 3339, naive date-times (with `T` or a space, seconds optional)
/// and bare dates, which default to 08:00.
pub fn normalize_event_date(raw: &str) -> Option<String> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local().format(EVENT_DATE_FORMAT).to_string());
    }

    for format in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.format(EVENT_DATE_FORMAT).to_string());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(8, 0, 0))
        .map(|dt| dt.format(EVENT_DATE_FORMAT).to_string())
}
