use chrono::{Days, NaiveDate};

/// Number of plan days spelled out in the date guidance.
const PLAN_DAYS_IN_PROMPT: u64 = 6;

/// Build the care-plan event extraction prompt.
///
/// `plan_start_date` is Day 1 of the plan; the prompt maps "Day N" wording
/// in the document to concrete dates.
pub fn build_event_extraction_prompt(document_text: &str, plan_start_date: NaiveDate) -> String {
    let day_lines: String = (0..PLAN_DAYS_IN_PROMPT)
        .filter_map(|offset| {
            let date = plan_start_date.checked_add_days(Days::new(offset))?;
            Some(format!(
                "  * For Day {} ({}) events, use {}\n",
                offset + 1,
                date.format("%A, %B %-d, %Y"),
                date.format("%Y-%m-%d"),
            ))
        })
        .collect();

    format!(
        r#"You are an expert medical assistant.
The following text is from a post-surgical care plan.

Extract a list of events that the patient needs to complete.
Each event must have these fields:
- type: ("medication", "exercise", or "appointment")
- event_header: A short title (e.g., "Morning Medication", "Physical Therapy")
- event_description: Full details (e.g., "Take 2 tablets of Amoxicillin at 8 AM with food.")
- event_date_to_complete_by: ISO 8601 format like "{example}T08:00:00". Format as YYYY-MM-DDTHH:MM:SS.
{day_lines}
  For time-specific events:
  * Use the exact time specified (e.g., "8:00 AM" becomes "T08:00:00")
  * For events without a specific time but that occur on a particular day, use T08:00:00 as the default time
  * For recurring daily events without specific times, assign sequential times starting at T08:00:00 with 30-minute intervals
  * Order multiple events on the same day chronologically
- priority: Always set to 1

Return ONLY a valid JSON array. No other text.
Here is the care plan text:

<document>
{document_text}
</document>
"#,
        example = plan_start_date.format("%Y-%m-%d"),
    )
}
