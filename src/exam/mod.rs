// src/exam/mod.rs

pub mod palette;
pub mod randomizer;
pub mod scoring;
pub mod session;
pub mod store;
pub mod submission;

#[cfg(test)]
pub(crate) mod fixtures;

pub use session::{ExamSession, SessionError, SessionStatus};
pub use store::SessionStore;

/// Formats seconds as MM:SS for the countdown.
pub fn format_remaining(secs: i64) -> String {
    let secs = secs.max(0);
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
