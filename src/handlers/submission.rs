// src/handlers/submission.rs

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;

use crate::{
    error::AppError,
    exam::submission::{enforce_deadline, submit},
    handlers::exam::{load_session, retire_if_submitted},
    models::exam_record::SubmissionStatus,
    state::AppState,
    utils::jwt::Claims,
};

/// Submits the candidate's answers to the exam service.
///
/// * 200 with the result when the service saved the submission.
/// * 409 with the result when the service already had one for this candidate.
/// * 409 without a result when this session was already submitted.
/// * 502 when the service could not be reached; the candidate may retry.
pub async fn submit_exam(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let handle = load_session(&state, &claims).await?;
    let mut session = handle.lock().await;
    let service = state.exam_service.as_ref();

    // A due timer takes precedence: that submission counts as the automatic one.
    let result = match enforce_deadline(&mut session, service, Utc::now()).await? {
        Some(result) => result,
        None => submit(&mut session, service, false).await?,
    };
    retire_if_submitted(&state, &claims, &session).await;

    let status = match result.status {
        SubmissionStatus::Saved => StatusCode::OK,
        SubmissionStatus::AlreadySubmitted => StatusCode::CONFLICT,
    };

    Ok((status, Json(result)))
}
