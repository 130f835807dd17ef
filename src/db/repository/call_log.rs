use rusqlite::{params, Connection};

use super::event::{parse_timestamp, parse_uuid};
use crate::db::DatabaseError;
use crate::models::CallLog;

pub fn insert_call_log(conn: &Connection, log: &CallLog) -> Result<(), DatabaseError> {
    let symptoms = serde_json::to_string(&log.symptoms).map_err(|e| {
        DatabaseError::InvalidValue {
            field: "call_logs.symptoms".into(),
            value: e.to_string(),
        }
    })?;
    conn.execute(
        "INSERT INTO call_logs (id, patient_id, transcript, summary, pain_level, symptoms, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            log.id.to_string(),
            log.patient_id,
            log.transcript,
            log.summary,
            log.pain_level,
            symptoms,
            log.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

/// Call logs, newest first, optionally scoped to one patient.
pub fn list_call_logs(
    conn: &Connection,
    patient_id: Option<&str>,
) -> Result<Vec<CallLog>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, transcript, summary, pain_level, symptoms, created_at
         FROM call_logs
         WHERE ?1 IS NULL OR patient_id = ?1
         ORDER BY created_at DESC, rowid DESC",
    )?;
    let rows = stmt.query_map(params![patient_id], |row| {
        Ok(CallLogRow {
            id: row.get(0)?,
            patient_id: row.get(1)?,
            transcript: row.get(2)?,
            summary: row.get(3)?,
            pain_level: row.get(4)?,
            symptoms: row.get(5)?,
            created_at: row.get(6)?,
        })
    })?;

    let mut logs = Vec::new();
    for row in rows {
        logs.push(call_log_from_row(row?)?);
    }
    Ok(logs)
}

struct CallLogRow {
    id: String,
    patient_id: String,
    transcript: String,
    summary: String,
    pain_level: Option<u8>,
    symptoms: String,
    created_at: String,
}

fn call_log_from_row(row: CallLogRow) -> Result<CallLog, DatabaseError> {
    let symptoms: Vec<String> =
        serde_json::from_str(&row.symptoms).map_err(|_| DatabaseError::InvalidValue {
            field: "call_logs.symptoms".into(),
            value: row.symptoms.clone(),
        })?;
    Ok(CallLog {
        id: parse_uuid("call_logs.id", &row.id)?,
        patient_id: row.patient_id,
        transcript: row.transcript,
        summary: row.summary,
        pain_level: row.pain_level,
        symptoms,
        created_at: parse_timestamp("call_logs.created_at", &row.created_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::models::NewCallLog;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn make_log(patient_id: &str, minutes_ago: i64) -> CallLog {
        NewCallLog {
            patient_id: patient_id.into(),
            transcript: "Agent: How are you? Patient: Sore.".into(),
            summary: "Patient reports soreness.".into(),
            pain_level: Some(4),
            symptoms: vec!["soreness".into()],
        }
        .into_call_log(Uuid::new_v4(), Utc::now() - Duration::minutes(minutes_ago))
    }

    #[test]
    fn insert_and_list_round_trip() {
        let conn = open_memory_database().unwrap();
        let log = make_log("patient-1", 0);
        insert_call_log(&conn, &log).unwrap();

        let logs = list_call_logs(&conn, None).unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].symptoms, vec!["soreness".to_string()]);
        assert_eq!(logs[0].pain_level, Some(4));
    }

    #[test]
    fn list_filters_by_patient_newest_first() {
        let conn = open_memory_database().unwrap();
        insert_call_log(&conn, &make_log("patient-1", 30)).unwrap();
        insert_call_log(&conn, &make_log("patient-2", 20)).unwrap();
        let newest = make_log("patient-1", 10);
        insert_call_log(&conn, &newest).unwrap();

        let logs = list_call_logs(&conn, Some("patient-1")).unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].id, newest.id);
    }
}
