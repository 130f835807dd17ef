use super::types::StatusUpdate;
use crate::db::{DatabaseError, EventStore};
use crate::models::{EventStatus, EventType};

/// Map a free-text status term from the call to a stored status.
/// Terms are trimmed and case-insensitive; anything unrecognized is `pending`.
pub fn map_status_term(event_type: EventType, term: &str) -> EventStatus {
    let term = term.trim().to_lowercase();
    match (event_type, term.as_str()) {
        (EventType::Medication, "missed") => EventStatus::Missed,
        (EventType::Medication, "taken") => EventStatus::Completed,

        (EventType::Exercise, "completed") => EventStatus::Completed,
        (EventType::Exercise, "skipped") => EventStatus::Missed,
        (EventType::Exercise, "partial") => EventStatus::Partial,

        (EventType::Appointment, "completed") => EventStatus::Completed,
        (EventType::Appointment, "missed") => EventStatus::Missed,

        _ => EventStatus::Pending,
    }
}

/// Apply one status update to the first stored event of the same type whose
/// description contains the name (case-insensitive substring).
///
/// Returns 1 when an event was updated, 0 when nothing matched. Matching is
/// unanchored, so names sharing a substring can hit the same event. The
/// read-then-write is not atomic: concurrent calls matching one event race
/// and the last write wins.
pub fn reconcile_update(store: &dyn EventStore, update: &StatusUpdate) -> Result<usize, DatabaseError> {
    let name = update.name.trim();
    if name.is_empty() {
        return Ok(0);
    }

    let matches = store.find_by_type_and_description(update.event_type, name)?;
    let Some(target) = matches.first() else {
        tracing::debug!(
            event_type = update.event_type.as_str(),
            name,
            "No stored event matches call mention"
        );
        return Ok(0);
    };

    let status = map_status_term(update.event_type, &update.status);
    store.update_status(&target.id, status)?;
    tracing::info!(
        event_id = %target.id,
        event_type = update.event_type.as_str(),
        status = status.as_str(),
        candidates = matches.len(),
        "Reconciled event status from call"
    );
    Ok(1)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::db::MemoryStore;
    use crate::models::Event;

    fn event(event_type: EventType, description: &str) -> Event {
        Event {
            id: Uuid::new_v4(),
            event_type,
            event_header: "Header".into(),
            event_description: description.into(),
            event_date_to_complete_by: Some("2025-04-26T08:00:00".into()),
            status: EventStatus::Pending,
            priority: 1,
            updated_at: Utc::now(),
        }
    }

    fn update(event_type: EventType, name: &str, status: &str) -> StatusUpdate {
        StatusUpdate {
            event_type,
            name: name.into(),
            status: status.into(),
        }
    }

    #[test]
    fn medication_terms() {
        assert_eq!(map_status_term(EventType::Medication, "missed"), EventStatus::Missed);
        assert_eq!(map_status_term(EventType::Medication, "taken"), EventStatus::Completed);
        assert_eq!(map_status_term(EventType::Medication, "unknown"), EventStatus::Pending);
        assert_eq!(map_status_term(EventType::Medication, "partial"), EventStatus::Pending);
        assert_eq!(map_status_term(EventType::Medication, " Taken "), EventStatus::Completed);
    }

    #[test]
    fn exercise_terms() {
        assert_eq!(map_status_term(EventType::Exercise, "completed"), EventStatus::Completed);
        assert_eq!(map_status_term(EventType::Exercise, "skipped"), EventStatus::Missed);
        assert_eq!(map_status_term(EventType::Exercise, "partial"), EventStatus::Partial);
        assert_eq!(map_status_term(EventType::Exercise, "unknown"), EventStatus::Pending);
        assert_eq!(map_status_term(EventType::Exercise, "did half"), EventStatus::Pending);
    }

    #[test]
    fn mapped_status_is_always_valid_for_type() {
        for event_type in [EventType::Medication, EventType::Exercise, EventType::Appointment] {
            for term in ["missed", "taken", "completed", "skipped", "partial", "unknown", "??"] {
                assert!(map_status_term(event_type, term).is_valid_for(event_type));
            }
        }
    }

    #[test]
    fn amoxicillin_missed_updates_matching_medication() {
        let target = event(EventType::Medication, "Take AMOXICILLIN 500mg twice daily");
        let id = target.id;
        let store = MemoryStore::with_events(vec![target]);

        let count =
            reconcile_update(&store, &update(EventType::Medication, "Amoxicillin", "missed")).unwrap();
        assert_eq!(count, 1);
        assert_eq!(store.get_event(&id).unwrap().unwrap().status, EventStatus::Missed);
    }

    #[test]
    fn no_match_returns_zero_without_writing() {
        let store = MemoryStore::with_events(vec![event(EventType::Medication, "Ibuprofen 200mg")]);
        let count =
            reconcile_update(&store, &update(EventType::Medication, "Amoxicillin", "missed")).unwrap();
        assert_eq!(count, 0);
        assert!(store.status_writes().is_empty());
    }

    #[test]
    fn match_requires_same_type() {
        let store = MemoryStore::with_events(vec![event(
            EventType::Exercise,
            "Walk after Amoxicillin dose",
        )]);
        let count =
            reconcile_update(&store, &update(EventType::Medication, "Amoxicillin", "taken")).unwrap();
        assert_eq!(count, 0);
        assert!(store.status_writes().is_empty());
    }

    #[test]
    fn exercise_terms_reach_the_store() {
        for (term, expected) in [
            ("skipped", EventStatus::Missed),
            ("partial", EventStatus::Partial),
            ("maybe later", EventStatus::Pending),
        ] {
            let target = event(EventType::Exercise, "Ankle pumps 10x every hour");
            let id = target.id;
            let store = MemoryStore::with_events(vec![target]);

            let count =
                reconcile_update(&store, &update(EventType::Exercise, "ankle pumps", term)).unwrap();
            assert_eq!(count, 1);
            assert_eq!(store.status_writes(), vec![(id, expected)]);
        }
    }

    #[test]
    fn only_first_match_is_updated() {
        let first = event(EventType::Medication, "Amoxicillin morning dose");
        let second = event(EventType::Medication, "Amoxicillin evening dose");
        let first_id = first.id;
        let store = MemoryStore::with_events(vec![first, second]);

        let count =
            reconcile_update(&store, &update(EventType::Medication, "amoxicillin", "taken")).unwrap();
        assert_eq!(count, 1);
        assert_eq!(store.status_writes(), vec![(first_id, EventStatus::Completed)]);
    }

    #[test]
    fn blank_name_matches_nothing() {
        let store = MemoryStore::with_events(vec![event(EventType::Medication, "Amoxicillin")]);
        let count = reconcile_update(&store, &update(EventType::Medication, "  ", "taken")).unwrap();
        assert_eq!(count, 0);
        assert!(store.status_writes().is_empty());
    }
}
