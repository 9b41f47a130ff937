// tests/exam_service_client.rs

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
};
use exam_portal::{
    clients::{ExamService, HttpExamService, ServiceError},
    models::{
        exam_record::{SubmissionPayload, SubmissionStatus},
        question::Section,
    },
};
use serde_json::{Value, json};

type Seen = Arc<Mutex<HashSet<String>>>;

async fn exec_get(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
    match params.get("action").map(String::as_str) {
        Some("login") => {
            let ok = params.get("app_no").map(String::as_str) == Some("APP001")
                && params.get("password").map(String::as_str) == Some("9876543210");
            if ok {
                // The sheet hands back the application number as a number.
                Json(json!({"status": "success", "name": "Asha Rao", "app_no": 1}))
            } else {
                Json(json!({"status": "invalid"}))
            }
        }
        Some("questions") => Json(json!([
            {
                "id": 1,
                "section": "Physics",
                "question": "Unit of force?",
                "option_a": "Newton", "option_b": "Joule", "option_c": "Watt", "option_d": "Pascal",
                "correct": "option_a"
            },
            {
                "id": "2",
                "section": "Maths",
                "question": "2 + 2",
                "option_a": "3", "option_b": "4", "option_c": "5", "option_d": "6",
                "correct": "option_b"
            }
        ])),
        _ => Json(json!({"status": "unknown_action"})),
    }
}

async fn exec_post(State(seen): State<Seen>, Json(body): Json<Value>) -> impl IntoResponse {
    if body["answers"].is_null() {
        return Json(json!({"status": "error"}));
    }
    let app_no = body["app_no"].as_str().unwrap_or_default().to_string();
    if seen.lock().unwrap().insert(app_no) {
        Json(json!({"status": "saved"}))
    } else {
        Json(json!({"status": "already_submitted"}))
    }
}

async fn html_page() -> impl IntoResponse {
    Html("<html><body>Sign in to continue</body></html>")
}

async fn server_error() -> impl IntoResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, "boom")
}

async fn slow() -> impl IntoResponse {
    tokio::time::sleep(Duration::from_secs(3)).await;
    Json(json!({"status": "success", "name": "Late"}))
}

/// Spawns a stub of the remote exam service and returns its base URL.
async fn spawn_stub() -> String {
    let seen: Seen = Arc::new(Mutex::new(HashSet::new()));
    let app = Router::new()
        .route("/exec", get(exec_get).post(exec_post))
        .route("/html", get(html_page).post(html_page))
        .route("/error", get(server_error))
        .route("/slow", get(slow))
        .with_state(seen);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://127.0.0.1:{}", port)
}

fn client(base: &str, path: &str, timeout_secs: u64) -> HttpExamService {
    let url = format!("{}{}", base, path).parse().unwrap();
    HttpExamService::new(url, Duration::from_secs(timeout_secs)).unwrap()
}

fn payload(app_no: &str) -> SubmissionPayload {
    SubmissionPayload {
        app_no: app_no.to_string(),
        name: "Asha Rao".to_string(),
        answers: [("1".to_string(), "option_a".to_string())].into_iter().collect(),
    }
}

#[tokio::test]
async fn login_success_and_failure() {
    let base = spawn_stub().await;
    let service = client(&base, "/exec", 5);

    let candidate = service.login("APP001", "9876543210").await.unwrap();
    assert_eq!(candidate.name, "Asha Rao");
    assert_eq!(candidate.app_no, "1");

    let denied = service.login("APP001", "0000").await;
    assert!(matches!(denied, Err(ServiceError::Auth)));
}

#[tokio::test]
async fn fetches_question_bank() {
    let base = spawn_stub().await;
    let service = client(&base, "/exec", 5);

    let bank = service.fetch_questions().await.unwrap();
    assert_eq!(bank.len(), 2);
    assert_eq!(bank[0].id, "1");
    assert_eq!(bank[0].section, Section::Physics);
    assert_eq!(bank[1].correct_index(), Some(1));
}

#[tokio::test]
async fn submit_reports_duplicates_distinctly() {
    let base = spawn_stub().await;
    let service = client(&base, "/exec", 5);

    let first = service.submit(&payload("APP001")).await.unwrap();
    assert_eq!(first, SubmissionStatus::Saved);

    let second = service.submit(&payload("APP001")).await.unwrap();
    assert_eq!(second, SubmissionStatus::AlreadySubmitted);
}

#[tokio::test]
async fn malformed_response_is_a_transport_error() {
    let base = spawn_stub().await;
    let service = client(&base, "/html", 5);

    // Not an auth failure: the candidate should retry, not re-enter credentials.
    assert!(matches!(
        service.login("APP001", "9876543210").await,
        Err(ServiceError::Transport(_))
    ));
    assert!(matches!(
        service.submit(&payload("APP001")).await,
        Err(ServiceError::Transport(_))
    ));
}

#[tokio::test]
async fn error_status_is_a_transport_error() {
    let base = spawn_stub().await;
    let service = client(&base, "/error", 5);

    assert!(matches!(
        service.fetch_questions().await,
        Err(ServiceError::Transport(_))
    ));
}

#[tokio::test]
async fn slow_service_times_out() {
    let base = spawn_stub().await;
    let service = client(&base, "/slow", 1);

    assert!(matches!(
        service.login("APP001", "9876543210").await,
        Err(ServiceError::Transport(_))
    ));
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    // Port 9 (discard) is not listening on the test host.
    let service = client("http://127.0.0.1:9", "/exec", 2);

    assert!(matches!(
        service.fetch_questions().await,
        Err(ServiceError::Transport(_))
    ));
}
