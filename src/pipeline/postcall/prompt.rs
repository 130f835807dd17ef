use crate::models::{Event, EventType};

/// Build the post-call analysis prompt.
///
/// `tracked` lists the patient's current medication and exercise items so
/// the model can reuse their names; only items discussed in the call may
/// appear in the output.
pub fn build_postcall_prompt(transcript: &str, tracked: &[Event]) -> String {
    let list = |event_type: EventType| {
        let lines: Vec<String> = tracked
            .iter()
            .filter(|e| e.event_type == event_type)
            .map(|e| format!("- {}: {}", e.event_header, e.event_description))
            .collect();
        if lines.is_empty() {
            "- (none on file)".to_string()
        } else {
            lines.join("\n")
        }
    };

    format!(
        r#"You are a post-surgical care assistant reviewing a phone call between a care agent and a patient.

Summarise the call for the care team and extract:
1. Medication adherence: for each medication the patient talked about, its status.
   Allowed statuses: "taken", "missed", "unknown".
2. Exercise adherence: for each exercise the patient talked about, its status.
   Allowed statuses: "completed", "partial", "skipped", "unknown".
3. Pain level on a 0-10 scale, or null if not discussed.
4. Any symptoms the patient reported, especially red-flag symptoms.

Only include medications and exercises that were explicitly discussed in the call.
Leaving an item out means it was not discussed; it does not mean it was missed.
Use the names below when the patient refers to one of these items.

Medications on the care plan:
{medications}

Exercises on the care plan:
{exercises}

Respond with ONLY a JSON object of this shape:
{{
  "summary": "2-4 sentence clinical summary",
  "medication_events": [{{"medication_name": "name", "status": "taken | missed | unknown"}}],
  "exercise_events": [{{"exercise_name": "name", "status": "completed | partial | skipped | unknown"}}],
  "pain_level": 0,
  "symptoms": ["symptom"]
}}

<transcript>
{transcript}
</transcript>
"#,
        medications = list(EventType::Medication),
        exercises = list(EventType::Exercise),
    )
}
