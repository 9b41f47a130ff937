// src/handlers/auth.rs

use axum::{Json, extract::State, response::IntoResponse};
use validator::Validate;

use crate::{
    error::AppError,
    models::candidate::{LoginRequest, LoginResponse},
    state::AppState,
    utils::jwt::sign_jwt,
};

/// Authenticates a candidate and returns a JWT token.
///
/// The credential check itself is done by the remote exam service; on success
/// we sign a token carrying the application number and name it confirmed.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let candidate = state
        .exam_service
        .login(payload.app_no.trim(), &payload.password)
        .await?;

    let token = sign_jwt(
        &candidate,
        &state.config.jwt_secret,
        state.config.jwt_expiration,
    )?;

    tracing::info!(app_no = %candidate.app_no, "Candidate logged in");

    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        name: candidate.name,
        app_no: candidate.app_no,
    }))
}
