// src/models/candidate.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

/// The candidate sitting the exam, as confirmed by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub name: String,

    /// Application number: the candidate's unique login identifier.
    pub app_no: String,
}

/// DTO for candidate login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(
        min = 1,
        max = 50,
        message = "Application number must be between 1 and 50 characters."
    ))]
    pub app_no: String,

    /// The registered mobile number doubles as the password.
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(rename = "type")]
    pub token_type: String,
    pub name: String,
    pub app_no: String,
}
