//! Voice-agent endpoints: live Q&A during a call, the post-call webhook,
//! and the plain care-plan query.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::pipeline::postcall::PostCallReport;
use crate::pipeline::rag::answer_question;

#[derive(Deserialize)]
pub struct OnCallRequest {
    pub question: String,
}

#[derive(Deserialize)]
pub struct QueryParams {
    pub q: Option<String>,
}

#[derive(Serialize)]
pub struct AnswerResponse {
    pub answer: String,
}

/// Webhook payload sent after a call ends.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostCallPayload {
    pub patient_id: String,
    pub transcript: String,
}

/// `POST /oncall`: answer a patient question during the call.
pub async fn oncall(
    State(ctx): State<ApiContext>,
    Json(request): Json<OnCallRequest>,
) -> Result<Json<AnswerResponse>, ApiError> {
    answer(ctx, request.question).await
}

/// `GET /query?q=`
pub async fn query(
    State(ctx): State<ApiContext>,
    Query(params): Query<QueryParams>,
) -> Result<Json<AnswerResponse>, ApiError> {
    answer(ctx, params.q.unwrap_or_default()).await
}

async fn answer(ctx: ApiContext, question: String) -> Result<Json<AnswerResponse>, ApiError> {
    let question = question.trim().to_string();
    if question.is_empty() {
        return Err(ApiError::BadRequest("Question must not be empty".into()));
    }

    let core = ctx.core.clone();
    let answer = tokio::task::spawn_blocking(move || {
        answer_question(&question, core.summary_llm.as_ref(), core.documents.as_ref())
    })
    .await??;
    Ok(Json(AnswerResponse { answer }))
}

/// `POST /postcall`: signed webhook; the signature layer has already
/// verified the raw body.
///
/// Pipeline failures are reported in the body with a 200 so the platform
/// does not redeliver.
pub async fn postcall(
    State(ctx): State<ApiContext>,
    body: axum::body::Bytes,
) -> Result<Json<PostCallReport>, ApiError> {
    let payload: PostCallPayload = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid webhook payload: {e}")))?;
    let patient_id = payload.patient_id.trim().to_string();
    if patient_id.is_empty() {
        return Err(ApiError::BadRequest("patientId must not be empty".into()));
    }
    if payload.transcript.trim().is_empty() {
        return Err(ApiError::BadRequest("transcript must not be empty".into()));
    }

    let core = ctx.core.clone();
    let report = tokio::task::spawn_blocking(move || {
        core.postcall_processor()
            .process(&patient_id, &payload.transcript)
    })
    .await?;
    Ok(Json(report))
}
