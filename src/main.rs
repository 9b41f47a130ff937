// src/main.rs

use std::sync::Arc;

use dotenvy::dotenv;
use exam_portal::clients::HttpExamService;
use exam_portal::config::Config;
use exam_portal::routes;
use exam_portal::state::AppState;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let (config, config_warnings) = Config::from_env();

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    for warning in &config_warnings {
        tracing::warn!("{}", warning);
    }

    let exam_service =
        HttpExamService::from_config(&config).expect("Failed to build exam service client");

    tracing::info!(
        endpoint = %config.exam_service_url,
        timeout_secs = config.request_timeout_secs,
        duration_secs = config.exam_duration_secs,
        "Exam service configured"
    );

    if config.shuffle_seed.is_some() {
        tracing::warn!("SHUFFLE_SEED is set: every attempt gets the same question order");
    }

    let state = AppState::new(config.clone(), Arc::new(exam_service));

    // Create the Axum application router
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind listening address");
    tracing::info!("Listening on {}", config.bind_addr);

    // Start the server
    axum::serve(listener, app).await.unwrap();
}
