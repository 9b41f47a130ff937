// src/state.rs

use std::sync::Arc;

use axum::extract::FromRef;

use crate::{clients::ExamService, config::Config, exam::SessionStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub exam_service: Arc<dyn ExamService>,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(config: Config, exam_service: Arc<dyn ExamService>) -> Self {
        Self {
            config,
            exam_service,
            sessions: SessionStore::new(),
        }
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
