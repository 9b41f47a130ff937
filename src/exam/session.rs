// src/exam/session.rs

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    fmt,
};

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    exam::scoring::score,
    models::{
        candidate::Candidate,
        exam_record::{SectionScores, SubmissionPayload},
        question::{Section, ShuffledQuestion},
    },
};

/// Errors raised by the exam state machine itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The remote service returned no questions.
    EmptyBank,

    /// The bank cannot be used (duplicate ids, unknown correct key).
    InvalidBank(String),

    /// Position outside [0, question count).
    OutOfRange { index: usize, count: usize },

    /// The session is terminal; nothing may change any more.
    AlreadySubmitted,

    /// Time ran out; only the pending submission may proceed.
    Expired,

    UnknownQuestion(String),

    InvalidOption(usize),

    /// The exam length is negative or does not fit a timestamp.
    InvalidDuration(i64),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::EmptyBank => write!(f, "question bank is empty"),
            SessionError::InvalidBank(reason) => write!(f, "invalid question bank: {}", reason),
            SessionError::OutOfRange { index, count } => {
                write!(f, "question index {} out of range (0..{})", index, count)
            }
            SessionError::AlreadySubmitted => write!(f, "exam already submitted"),
            SessionError::Expired => write!(f, "exam time is over"),
            SessionError::UnknownQuestion(id) => write!(f, "unknown question '{}'", id),
            SessionError::InvalidOption(option) => {
                write!(f, "option {} is not between 0 and 3", option)
            }
            SessionError::InvalidDuration(secs) => write!(f, "invalid exam duration: {}s", secs),
        }
    }
}

impl std::error::Error for SessionError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    InProgress,
    Expired,
    Submitted,
}

/// One candidate's exam attempt.
///
/// Holds the shuffled questions (fixed for the whole attempt), the answer
/// record, the review set, the current position and the timer. The only way
/// into `Submitted` is [`ExamSession::mark_submitted`], and nothing leaves it.
#[derive(Debug, Clone)]
pub struct ExamSession {
    candidate: Candidate,
    questions: Vec<ShuffledQuestion>,
    index_by_id: HashMap<String, usize>,
    position: usize,

    /// Question id -> selected slot in the shuffled option list.
    answers: HashMap<String, usize>,
    review: HashSet<String>,
    section_filter: Option<Section>,
    deadline: DateTime<Utc>,
    status: SessionStatus,
    auto_submit_attempted: bool,
}

impl ExamSession {
    pub fn start(
        candidate: Candidate,
        questions: Vec<ShuffledQuestion>,
        started_at: DateTime<Utc>,
        duration_secs: i64,
    ) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::EmptyBank);
        }

        let deadline = TimeDelta::try_seconds(duration_secs)
            .filter(|duration| *duration >= TimeDelta::zero())
            .and_then(|duration| started_at.checked_add_signed(duration))
            .ok_or(SessionError::InvalidDuration(duration_secs))?;

        let index_by_id = questions
            .iter()
            .enumerate()
            .map(|(i, q)| (q.id().to_string(), i))
            .collect();

        Ok(Self {
            candidate,
            questions,
            index_by_id,
            position: 0,
            answers: HashMap::new(),
            review: HashSet::new(),
            section_filter: None,
            deadline,
            status: SessionStatus::InProgress,
            auto_submit_attempted: false,
        })
    }

    pub fn candidate(&self) -> &Candidate {
        &self.candidate
    }

    pub fn questions(&self) -> &[ShuffledQuestion] {
        &self.questions
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn current(&self) -> &ShuffledQuestion {
        &self.questions[self.position]
    }

    pub fn answer(&self, question_id: &str) -> Option<usize> {
        self.answers.get(question_id).copied()
    }

    pub fn answers(&self) -> &HashMap<String, usize> {
        &self.answers
    }

    pub fn is_marked(&self, question_id: &str) -> bool {
        self.review.contains(question_id)
    }

    pub fn section_filter(&self) -> Option<Section> {
        self.section_filter
    }

    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    pub fn unanswered_count(&self) -> usize {
        self.questions.len() - self.answers.len()
    }

    pub fn marked_count(&self) -> usize {
        self.review.len()
    }

    pub fn deadline(&self) -> DateTime<Utc> {
        self.deadline
    }

    fn ensure_in_progress(&self) -> Result<(), SessionError> {
        match self.status {
            SessionStatus::InProgress => Ok(()),
            SessionStatus::Expired => Err(SessionError::Expired),
            SessionStatus::Submitted => Err(SessionError::AlreadySubmitted),
        }
    }

    fn ensure_known(&self, question_id: &str) -> Result<(), SessionError> {
        if self.index_by_id.contains_key(question_id) {
            Ok(())
        } else {
            Err(SessionError::UnknownQuestion(question_id.to_string()))
        }
    }

    /// Records or overwrites the chosen option slot (0..=3) for a question.
    pub fn select_answer(&mut self, question_id: &str, option: usize) -> Result<(), SessionError> {
        self.ensure_in_progress()?;
        self.ensure_known(question_id)?;
        if option > 3 {
            return Err(SessionError::InvalidOption(option));
        }
        self.answers.insert(question_id.to_string(), option);
        Ok(())
    }

    /// Removes a saved answer. Clearing an unanswered question is a no-op.
    pub fn clear_answer(&mut self, question_id: &str) -> Result<(), SessionError> {
        self.ensure_in_progress()?;
        self.ensure_known(question_id)?;
        self.answers.remove(question_id);
        Ok(())
    }

    /// Flips the review flag and returns whether the question is now marked.
    pub fn toggle_review(&mut self, question_id: &str) -> Result<bool, SessionError> {
        self.ensure_in_progress()?;
        self.ensure_known(question_id)?;
        if self.review.remove(question_id) {
            Ok(false)
        } else {
            self.review.insert(question_id.to_string());
            Ok(true)
        }
    }

    pub fn go_to(&mut self, index: usize) -> Result<(), SessionError> {
        self.ensure_in_progress()?;
        if index >= self.questions.len() {
            return Err(SessionError::OutOfRange {
                index,
                count: self.questions.len(),
            });
        }
        self.position = index;
        Ok(())
    }

    /// Moves forward one question; stays put on the last one.
    pub fn next(&mut self) -> Result<usize, SessionError> {
        self.ensure_in_progress()?;
        if self.position + 1 < self.questions.len() {
            self.position += 1;
        }
        Ok(self.position)
    }

    /// Moves back one question; stays put on the first one.
    pub fn previous(&mut self) -> Result<usize, SessionError> {
        self.ensure_in_progress()?;
        self.position = self.position.saturating_sub(1);
        Ok(self.position)
    }

    /// Only affects which palette entries are listed.
    pub fn filter_by_section(&mut self, section: Option<Section>) {
        self.section_filter = section;
    }

    /// `deadline - now`; zero or negative once time is up.
    pub fn time_remaining(&self, now: DateTime<Utc>) -> TimeDelta {
        self.deadline - now
    }

    /// Whole seconds left for display, never negative.
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> i64 {
        let remaining = self.time_remaining(now);
        if remaining <= TimeDelta::zero() {
            return 0;
        }
        // Round up so "00:00" is only shown once time is really over.
        (remaining.num_milliseconds() + 999) / 1000
    }

    /// Evaluates the timer. Returns true exactly once: on the first check after
    /// time ran out, which is when the automatic submission must be attempted.
    pub fn poll_expiry(&mut self, now: DateTime<Utc>) -> bool {
        if self.status == SessionStatus::InProgress && self.time_remaining(now) <= TimeDelta::zero()
        {
            self.status = SessionStatus::Expired;
        }

        if self.status == SessionStatus::Expired && !self.auto_submit_attempted {
            self.auto_submit_attempted = true;
            return true;
        }
        false
    }

    /// Builds what gets sent to the remote service, plus the local score.
    pub fn prepare_submission(&self) -> Result<(SubmissionPayload, SectionScores), SessionError> {
        if self.status == SessionStatus::Submitted {
            return Err(SessionError::AlreadySubmitted);
        }

        let answers: BTreeMap<String, String> = self
            .questions
            .iter()
            .filter_map(|q| {
                let slot = self.answers.get(q.id())?;
                let key = q.original_key(*slot)?;
                Some((q.id().to_string(), key.to_string()))
            })
            .collect();

        let payload = SubmissionPayload {
            app_no: self.candidate.app_no.clone(),
            name: self.candidate.name.clone(),
            answers,
        };

        Ok((payload, score(&self.questions, &self.answers)))
    }

    /// Terminal transition, taken after the remote service accepted (or had
    /// already recorded) the submission.
    pub fn mark_submitted(&mut self) {
        self.status = SessionStatus::Submitted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exam::fixtures::{bank, candidate, session, t0};
    use crate::exam::randomizer::randomize;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn select_then_clear_restores_unanswered() {
        let mut s = session(6);
        let id = s.questions()[2].id().to_string();

        s.select_answer(&id, 1).unwrap();
        assert_eq!(s.answer(&id), Some(1));
        assert_eq!(s.unanswered_count(), 5);

        s.clear_answer(&id).unwrap();
        assert_eq!(s.answer(&id), None);
        assert_eq!(s.unanswered_count(), 6);

        // idempotent
        s.clear_answer(&id).unwrap();
        assert_eq!(s.unanswered_count(), 6);
    }

    #[test]
    fn select_overwrites_and_validates() {
        let mut s = session(3);
        let id = s.questions()[0].id().to_string();
        s.select_answer(&id, 0).unwrap();
        s.select_answer(&id, 3).unwrap();
        assert_eq!(s.answer(&id), Some(3));

        assert_eq!(s.select_answer(&id, 4), Err(SessionError::InvalidOption(4)));
        assert_eq!(
            s.select_answer("nope", 1),
            Err(SessionError::UnknownQuestion("nope".into()))
        );
    }

    #[test]
    fn review_is_independent_of_answers() {
        let mut s = session(3);
        let id = s.questions()[1].id().to_string();
        assert!(s.toggle_review(&id).unwrap());
        s.select_answer(&id, 2).unwrap();
        assert!(s.is_marked(&id));
        s.clear_answer(&id).unwrap();
        assert!(s.is_marked(&id));
        assert!(!s.toggle_review(&id).unwrap());
        assert_eq!(s.marked_count(), 0);
    }

    #[test]
    fn navigation_is_clamped() {
        let mut s = session(3);
        assert_eq!(s.previous().unwrap(), 0);
        assert_eq!(s.next().unwrap(), 1);
        assert_eq!(s.next().unwrap(), 2);
        assert_eq!(s.next().unwrap(), 2);
        assert_eq!(s.previous().unwrap(), 1);
    }

    #[test]
    fn go_to_rejects_out_of_range() {
        let mut s = session(3);
        s.go_to(2).unwrap();
        assert_eq!(s.position(), 2);
        assert_eq!(
            s.go_to(3),
            Err(SessionError::OutOfRange { index: 3, count: 3 })
        );
        assert_eq!(s.position(), 2);
    }

    #[test]
    fn filter_leaves_position_and_answers_alone() {
        let mut s = session(6);
        let id = s.questions()[4].id().to_string();
        s.go_to(4).unwrap();
        s.select_answer(&id, 2).unwrap();

        s.filter_by_section(Some(Section::Maths));
        assert_eq!(s.section_filter(), Some(Section::Maths));
        assert_eq!(s.position(), 4);
        assert_eq!(s.answer(&id), Some(2));
    }

    #[test]
    fn current_question_keeps_its_option_order() {
        let s = session(5);
        let first = s.current().options();
        let again = s.current().options();
        assert_eq!(first, again);
    }

    #[test]
    fn timer_counts_down_and_expires_once() {
        let mut s = session(3);
        assert_eq!(s.remaining_secs(t0()), 600);
        assert_eq!(s.remaining_secs(t0() + TimeDelta::milliseconds(500)), 600);
        assert_eq!(s.remaining_secs(t0() + TimeDelta::seconds(599)), 1);
        assert!(!s.poll_expiry(t0() + TimeDelta::seconds(599)));
        assert_eq!(s.status(), SessionStatus::InProgress);

        let late = t0() + TimeDelta::seconds(601);
        assert!(s.time_remaining(late) <= TimeDelta::zero());
        assert_eq!(s.remaining_secs(late), 0);
        assert!(s.poll_expiry(late));
        assert_eq!(s.status(), SessionStatus::Expired);
        assert!(!s.poll_expiry(late + TimeDelta::seconds(5)));
    }

    #[test]
    fn expired_session_rejects_changes_but_can_submit() {
        let mut s = session(3);
        let id = s.questions()[0].id().to_string();
        s.poll_expiry(t0() + TimeDelta::seconds(700));

        assert_eq!(s.select_answer(&id, 1), Err(SessionError::Expired));
        assert_eq!(s.next(), Err(SessionError::Expired));
        assert!(s.prepare_submission().is_ok());
    }

    #[test]
    fn submitted_session_is_locked() {
        let mut s = session(3);
        let id = s.questions()[0].id().to_string();
        s.select_answer(&id, 1).unwrap();
        s.mark_submitted();

        assert_eq!(s.select_answer(&id, 2), Err(SessionError::AlreadySubmitted));
        assert_eq!(s.clear_answer(&id), Err(SessionError::AlreadySubmitted));
        assert_eq!(s.toggle_review(&id), Err(SessionError::AlreadySubmitted));
        assert_eq!(s.go_to(0), Err(SessionError::AlreadySubmitted));
        assert_eq!(s.previous(), Err(SessionError::AlreadySubmitted));
        assert_eq!(s.prepare_submission().unwrap_err(), SessionError::AlreadySubmitted);
        assert_eq!(s.answer(&id), Some(1));
        assert!(!s.poll_expiry(t0() + TimeDelta::seconds(9999)));
        assert_eq!(s.status(), SessionStatus::Submitted);
    }

    #[test]
    fn start_rejects_durations_that_do_not_fit() {
        let questions = || randomize(&bank(3), &mut StdRng::seed_from_u64(7)).unwrap();

        for secs in [-1, 10_000_000_000_000_000, i64::MAX] {
            let started = ExamSession::start(candidate(), questions(), t0(), secs);
            assert_eq!(started.unwrap_err(), SessionError::InvalidDuration(secs));
        }

        let s = ExamSession::start(candidate(), questions(), t0(), 0).unwrap();
        assert_eq!(s.deadline(), t0());
        assert_eq!(s.remaining_secs(t0()), 0);
    }

    #[test]
    fn payload_uses_original_option_keys() {
        let mut s = session(4);
        let q = s.questions()[0].clone();
        s.select_answer(q.id(), q.correct_index).unwrap();

        let (payload, scores) = s.prepare_submission().unwrap();
        assert_eq!(payload.app_no, "APP001");
        assert_eq!(payload.answers.len(), 1);
        assert_eq!(payload.answers[q.id()], q.question.correct);
        assert_eq!(scores.total, 1);
    }
}
