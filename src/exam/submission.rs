// src/exam/submission.rs

use std::fmt;

use chrono::{DateTime, Utc};

use crate::{
    clients::{ExamService, ServiceError},
    exam::session::{ExamSession, SessionError},
    models::exam_record::{SubmissionResult, SubmissionStatus},
};

#[derive(Debug)]
pub enum SubmitError {
    Session(SessionError),
    Service(ServiceError),
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitError::Session(e) => write!(f, "{}", e),
            SubmitError::Service(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SubmitError {}

impl From<SessionError> for SubmitError {
    fn from(err: SessionError) -> Self {
        SubmitError::Session(err)
    }
}

impl From<ServiceError> for SubmitError {
    fn from(err: ServiceError) -> Self {
        SubmitError::Service(err)
    }
}

/// Sends the session's answers to the remote service once.
///
/// * Fails with `AlreadySubmitted` if the session is already terminal.
/// * "saved" and "already_submitted" replies are both terminal: the session is
///   locked and the reply status is passed through so the caller can tell them apart.
/// * Transport failures leave the session as it was so the candidate can retry.
pub async fn submit(
    session: &mut ExamSession,
    service: &dyn ExamService,
    automatic: bool,
) -> Result<SubmissionResult, SubmitError> {
    let (payload, scores) = session.prepare_submission()?;
    let app_no = payload.app_no.as_str();

    let status = service.submit(&payload).await.map_err(|e| {
        tracing::error!(app_no, automatic, error = %e, "Exam submission failed");
        e
    })?;

    session.mark_submitted();

    let message = match status {
        SubmissionStatus::Saved => {
            tracing::info!(app_no, automatic, total = scores.total, "Exam submitted");
            "Exam submitted successfully".to_string()
        }
        SubmissionStatus::AlreadySubmitted => {
            tracing::warn!(app_no, automatic, "Exam service reports a previous submission");
            "This exam has already been submitted".to_string()
        }
    };

    Ok(SubmissionResult {
        status,
        scores,
        automatic,
        message,
    })
}

/// Evaluates the timer and, the first time it is found expired, performs the
/// one automatic submission attempt.
pub async fn enforce_deadline(
    session: &mut ExamSession,
    service: &dyn ExamService,
    now: DateTime<Utc>,
) -> Result<Option<SubmissionResult>, SubmitError> {
    if !session.poll_expiry(now) {
        return Ok(None);
    }

    tracing::info!(
        app_no = %session.candidate().app_no,
        "Exam time is over, submitting automatically"
    );
    submit(session, service, true).await.map(Some)
}
