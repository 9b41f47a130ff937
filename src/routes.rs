// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{auth, exam, submission},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * Login is public; every exam route requires a candidate token.
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (config, exam service client, sessions).
pub fn create_router(state: AppState) -> Router {
    let origins: [HeaderValue; 2] = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let auth_routes = Router::new().route("/api/auth/login", post(auth::login));

    let exam_routes = Router::new()
        .route("/api/exam", get(exam::current))
        .route("/api/exam/instructions", get(exam::instructions))
        .route("/api/exam/start", post(exam::start_exam))
        .route("/api/exam/palette", get(exam::get_palette))
        .route(
            "/api/exam/answers/{question_id}",
            put(exam::select_answer).delete(exam::clear_answer),
        )
        .route("/api/exam/review/{question_id}", post(exam::toggle_review))
        .route("/api/exam/goto", post(exam::go_to))
        .route("/api/exam/next", post(exam::next))
        .route("/api/exam/previous", post(exam::previous))
        .route("/api/exam/submit", post(submission::submit_exam))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(auth_routes)
        .merge(exam_routes)
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
