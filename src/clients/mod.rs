// src/clients/mod.rs

pub mod exam_service;

pub use exam_service::{ExamService, HttpExamService, ServiceError};
