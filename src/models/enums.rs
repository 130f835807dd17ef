use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(EventType {
    Medication => "medication",
    Exercise => "exercise",
    Appointment => "appointment",
});

str_enum!(EventStatus {
    Pending => "pending",
    Completed => "completed",
    Missed => "missed",
    Partial => "partial",
});

impl EventStatus {
    /// Whether this status may be stored on an event of the given type.
    /// Only exercises can be partially done.
    pub fn is_valid_for(&self, event_type: EventType) -> bool {
        match self {
            Self::Partial => event_type == EventType::Exercise,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn event_type_round_trip() {
        for (variant, s) in [
            (EventType::Medication, "medication"),
            (EventType::Exercise, "exercise"),
            (EventType::Appointment, "appointment"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(EventType::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn event_status_serializes_lowercase() {
        let json = serde_json::to_string(&EventStatus::Completed).unwrap();
        assert_eq!(json, "\"completed\"");
        let parsed: EventStatus = serde_json::from_str("\"missed\"").unwrap();
        assert_eq!(parsed, EventStatus::Missed);
    }

    #[test]
    fn partial_only_valid_for_exercise() {
        assert!(EventStatus::Partial.is_valid_for(EventType::Exercise));
        assert!(!EventStatus::Partial.is_valid_for(EventType::Medication));
        assert!(!EventStatus::Partial.is_valid_for(EventType::Appointment));
        assert!(EventStatus::Missed.is_valid_for(EventType::Medication));
        assert!(EventStatus::Pending.is_valid_for(EventType::Appointment));
    }

    #[test]
    fn invalid_enum_returns_error() {
        assert!(EventType::from_str("surgery").is_err());
        assert!(EventStatus::from_str("Pending").is_err());
        assert!(EventStatus::from_str("").is_err());
    }
}
