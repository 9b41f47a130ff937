// src/clients/exam_service.rs

use std::{fmt, time::Duration};

use async_trait::async_trait;
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;
use url::Url;

use crate::{
    config::Config,
    models::{
        candidate::Candidate,
        exam_record::{SubmissionPayload, SubmissionStatus},
        question::Question,
    },
};

/// Failures talking to the remote exam service.
#[derive(Debug)]
pub enum ServiceError {
    /// The service rejected the credentials.
    Auth,

    /// Network error, timeout, non-2xx response or a body we could not parse.
    /// Always retryable from the candidate's point of view.
    Transport(String),

    /// The service answered but with a status we don't know how to handle.
    Rejected(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Auth => write!(f, "invalid credentials"),
            ServiceError::Transport(msg) => write!(f, "exam service unreachable: {}", msg),
            ServiceError::Rejected(status) => {
                write!(f, "exam service rejected the request: {}", status)
            }
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ServiceError::Transport("request timed out".to_string())
        } else {
            ServiceError::Transport(err.to_string())
        }
    }
}

/// The remote system of record: credential check, question bank, scoring.
#[async_trait]
pub trait ExamService: Send + Sync {
    async fn login(&self, app_no: &str, password: &str) -> Result<Candidate, ServiceError>;

    async fn fetch_questions(&self) -> Result<Vec<Question>, ServiceError>;

    /// Records one submission. A duplicate comes back as
    /// `SubmissionStatus::AlreadySubmitted`, not as an error.
    async fn submit(&self, payload: &SubmissionPayload) -> Result<SubmissionStatus, ServiceError>;
}

#[derive(Debug, Deserialize)]
struct LoginReply {
    status: String,
    name: Option<String>,
    app_no: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct StatusReply {
    status: String,
}

/// `ExamService` over HTTP: `GET ?action=...` for reads, JSON `POST` for submissions.
#[derive(Clone)]
pub struct HttpExamService {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpExamService {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &Config) -> Result<Self, ServiceError> {
        Self::new(
            config.exam_service_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// Reads the body as text first so a non-JSON reply (an HTML error page is
    /// common for script-hosted endpoints) ends up in the log.
    async fn read_json<T: DeserializeOwned>(
        response: reqwest::Response,
        action: &str,
    ) -> Result<T, ServiceError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(action, %status, "Exam service returned an error status");
            return Err(ServiceError::Transport(format!("HTTP {}", status)));
        }

        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            tracing::error!(action, error = %e, body = %preview, "Malformed exam service response");
            ServiceError::Transport(format!("malformed response: {}", e))
        })
    }
}

#[async_trait]
impl ExamService for HttpExamService {
    async fn login(&self, app_no: &str, password: &str) -> Result<Candidate, ServiceError> {
        let response = self
            .client
            .get(self.base_url.clone())
            .query(&[("action", "login"), ("app_no", app_no), ("password", password)])
            .send()
            .await?;

        let reply: LoginReply = Self::read_json(response, "login").await?;

        if reply.status != "success" {
            tracing::info!(app_no, status = %reply.status, "Login rejected by exam service");
            return Err(ServiceError::Auth);
        }

        let name = reply
            .name
            .ok_or_else(|| ServiceError::Transport("login reply has no name".to_string()))?;

        let app_no = match reply.app_no {
            Some(Value::String(s)) => s,
            Some(Value::Number(n)) => n.to_string(),
            _ => app_no.to_string(),
        };

        Ok(Candidate { name, app_no })
    }

    async fn fetch_questions(&self) -> Result<Vec<Question>, ServiceError> {
        let response = self
            .client
            .get(self.base_url.clone())
            .query(&[("action", "questions")])
            .send()
            .await?;

        Self::read_json(response, "questions").await
    }

    async fn submit(&self, payload: &SubmissionPayload) -> Result<SubmissionStatus, ServiceError> {
        let response = self
            .client
            .post(self.base_url.clone())
            .json(payload)
            .send()
            .await?;

        let reply: StatusReply = Self::read_json(response, "submit").await?;

        match reply.status.as_str() {
            "saved" | "success" => Ok(SubmissionStatus::Saved),
            "already_submitted" => Ok(SubmissionStatus::AlreadySubmitted),
            other => Err(ServiceError::Rejected(other.to_string())),
        }
    }
}
