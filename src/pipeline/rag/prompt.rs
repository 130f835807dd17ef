use crate::models::DocumentChunk;

/// Build the care-plan Q&A prompt from the retrieved excerpts.
pub fn build_care_plan_prompt(question: &str, excerpts: &[&DocumentChunk]) -> String {
    let context = if excerpts.is_empty() {
        "No care plan is on file for this patient.".to_string()
    } else {
        excerpts
            .iter()
            .map(|chunk| {
                let label = chunk.page_label.as_deref().unwrap_or("Page ?");
                format!("[{} - {}]\n{}", chunk.filename, label, chunk.content)
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    };

    format!(
        r#"You are a friendly post-surgical care assistant speaking with a patient on the phone.
Answer the patient's question using ONLY the care plan excerpts below.
If the excerpts do not answer the question, say so and suggest the patient contact their care team.
Never invent medications, doses or instructions. Keep the answer short and easy to say out loud.
If the patient describes severe pain, fever, bleeding or trouble breathing, tell them to contact their care team or emergency services right away.

<care_plan>
{context}
</care_plan>

Patient question: {question}
"#
    )
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn includes_excerpts_with_source_labels() {
        let chunk = DocumentChunk {
            id: Uuid::new_v4(),
            filename: "plan.pdf".into(),
            page_label: Some("Page 2".into()),
            chunk_index: 3,
            content: "Ankle pumps 10x every hour.".into(),
        };
        let prompt = build_care_plan_prompt("How often do I do ankle pumps?", &[&chunk]);
        assert!(prompt.contains("[plan.pdf - Page 2]\nAnkle pumps 10x every hour."));
        assert!(prompt.contains("Patient question: How often do I do ankle pumps?"));
    }

    #[test]
    fn states_when_no_plan_is_on_file() {
        let prompt = build_care_plan_prompt("Can I shower?", &[]);
        assert!(prompt.contains("No care plan is on file"));
    }
}
