use serde_json::Value;

/// An event as the model proposed it, before validation.
/// Every field is optional here; `normalize_candidate` decides what survives.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedEventCandidate {
    pub event_type: Option<String>,
    pub event_header: Option<String>,
    pub event_description: Option<String>,
    pub event_date_to_complete_by: Option<String>,
    pub priority: Option<i64>,
}

impl ExtractedEventCandidate {
    /// Lenient read of one JSON object. Non-string fields count as absent,
    /// priority may arrive as a number or a numeric string.
    pub fn from_json(object: &serde_json::Map<String, Value>) -> Self {
        let text = |key: &str| {
            object
                .get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        };

        let priority = match object.get("priority") {
            Some(Value::Number(n)) => n.as_i64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        };

        Self {
            event_type: text("type"),
            event_header: text("event_header"),
            event_description: text("event_description"),
            event_date_to_complete_by: text("event_date_to_complete_by"),
            priority,
        }
    }
}

/// Why a candidate was dropped during normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateRejection {
    MissingField(&'static str),
    UnknownType(String),
    InvalidDate(String),
}

impl std::fmt::Display for CandidateRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "missing {field}"),
            Self::UnknownType(t) => write!(f, "unknown type '{t}'"),
            Self::InvalidDate(d) => write!(f, "unparseable date '{d}'"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_all_fields() {
        let value = json!({
            "type": "medication",
            "event_header": " Morning Medication ",
            "event_description": "Take Amoxicillin twice daily",
            "event_date_to_complete_by": "2025-04-26T08:00:00",
            "priority": 2
        });
        let candidate = ExtractedEventCandidate::from_json(value.as_object().unwrap());
        assert_eq!(candidate.event_type.as_deref(), Some("medication"));
        assert_eq!(candidate.event_header.as_deref(), Some("Morning Medication"));
        assert_eq!(candidate.priority, Some(2));
    }

    #[test]
    fn wrong_types_and_blanks_are_absent() {
        let value = json!({
            "type": 3,
            "event_header": "",
            "priority": "1"
        });
        let candidate = ExtractedEventCandidate::from_json(value.as_object().unwrap());
        assert_eq!(candidate.event_type, None);
        assert_eq!(candidate.event_header, None);
        assert_eq!(candidate.event_description, None);
        assert_eq!(candidate.priority, Some(1));
    }
}
