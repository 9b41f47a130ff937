// src/exam/fixtures.rs

use chrono::{DateTime, TimeZone, Utc};
use rand::{SeedableRng, rngs::StdRng};

use crate::{
    exam::{randomizer::randomize, session::ExamSession},
    models::{
        candidate::Candidate,
        question::{OPTION_KEYS, Question, Section},
    },
};

/// `n` questions cycling through the sections, correct keys cycling a..d.
pub(crate) fn bank(n: usize) -> Vec<Question> {
    (0..n)
        .map(|i| Question {
            id: format!("q{}", i),
            section: Section::ALL[i % 3],
            question: format!("Question {}", i),
            option_a: format!("{}-a", i),
            option_b: format!("{}-b", i),
            option_c: format!("{}-c", i),
            option_d: format!("{}-d", i),
            correct: OPTION_KEYS[i % 4].to_string(),
        })
        .collect()
}

pub(crate) fn candidate() -> Candidate {
    Candidate {
        name: "Asha".to_string(),
        app_no: "APP001".to_string(),
    }
}

pub(crate) fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
}

/// A 600-second session over `bank(n)` started at `t0()`.
pub(crate) fn session(n: usize) -> ExamSession {
    let questions = randomize(&bank(n), &mut StdRng::seed_from_u64(7)).unwrap();
    ExamSession::start(candidate(), questions, t0(), 600).unwrap()
}
