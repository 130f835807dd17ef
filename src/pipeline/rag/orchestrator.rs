use super::prompt::build_care_plan_prompt;
use super::retrieval::KeywordRetriever;
use crate::db::DocumentStore;
use crate::pipeline::llm::LlmClient;
use crate::pipeline::recovery::strip_think_tags;
use crate::pipeline::PipelineError;

/// Answer a patient question from the stored care-plan chunks.
pub fn answer_question(
    question: &str,
    llm: &dyn LlmClient,
    store: &dyn DocumentStore,
) -> Result<String, PipelineError> {
    let chunks = store.list_chunks()?;
    let excerpts = KeywordRetriever::default().retrieve(question, &chunks);
    let prompt = build_care_plan_prompt(question, &excerpts);

    let response = llm.complete(&prompt)?;
    let answer = strip_think_tags(&response);
    tracing::info!(
        model = llm.model(),
        stored_chunks = chunks.len(),
        excerpts = excerpts.len(),
        "Answered care-plan question"
    );
    Ok(answer)
}
