// src/models/exam_record.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    exam::{palette::PaletteEntry, session::SessionStatus},
    models::question::{PublicQuestion, Section},
};

/// Correct answers per section plus the total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionScores {
    pub physics: u32,
    pub chemistry: u32,
    pub maths: u32,
    pub total: u32,
}

impl SectionScores {
    pub fn add(&mut self, section: Section) {
        match section {
            Section::Physics => self.physics += 1,
            Section::Chemistry => self.chemistry += 1,
            Section::Maths => self.maths += 1,
        }
        self.total += 1;
    }
}

/// Body POSTed to the remote service.
///
/// `answers` maps question id to the original option key ("option_a" ..)
/// the candidate picked, so the service grades against its own key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    pub app_no: String,
    pub name: String,
    pub answers: BTreeMap<String, String>,
}

/// Outcome of a submission attempt that reached the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Saved,
    AlreadySubmitted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionResult {
    pub status: SubmissionStatus,

    /// Locally computed for display; the remote service is the system of record.
    pub scores: SectionScores,

    /// True when the submission was forced by the timer.
    pub automatic: bool,
    pub message: String,
}

/// DTO for saving an answer.
#[derive(Debug, Deserialize, Validate)]
pub struct SelectAnswerRequest {
    /// Slot in the shuffled option list shown to the candidate.
    #[validate(range(max = 3, message = "Option must be between 0 and 3."))]
    pub option: usize,
}

#[derive(Debug, Deserialize)]
pub struct GoToRequest {
    pub index: usize,
}

#[derive(Debug, Deserialize)]
pub struct PaletteQuery {
    pub section: Option<String>,
}

/// Everything the exam screen needs to render the current question.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExamView {
    pub status: SessionStatus,
    pub name: String,
    pub app_no: String,
    pub position: usize,
    pub question_count: usize,
    pub question: PublicQuestion,
    pub selected: Option<usize>,
    pub marked: bool,
    pub remaining_secs: i64,

    /// Remaining time as MM:SS.
    pub remaining: String,
    pub unanswered: usize,
    pub marked_count: usize,

    /// Present when the timer ran out and the exam was submitted on this request.
    pub auto_submission: Option<SubmissionResult>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaletteResponse {
    pub section: Option<Section>,
    pub entries: Vec<PaletteEntry>,
    pub unanswered: usize,
    pub marked: usize,

    /// Set when this request found the timer expired and submitted the exam.
    pub auto_submission: Option<SubmissionResult>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InstructionsResponse {
    pub name: String,
    pub app_no: String,
    pub sections: Vec<Section>,
    pub duration_secs: i64,
    pub rules: Vec<String>,
}

/// Returned after a navigation or answer action.
#[derive(Debug, Serialize, Deserialize)]
pub struct ActionResponse {
    pub status: SessionStatus,
    pub position: usize,

    /// Present when the timer ran out and the exam was submitted on this request.
    pub auto_submission: Option<SubmissionResult>,
}
