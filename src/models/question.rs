// src/models/question.rs

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::utils::html::clean_html;

/// Option keys as the remote service names them, in original order.
pub const OPTION_KEYS: [&str; 4] = ["option_a", "option_b", "option_c", "option_d"];

/// Exam section a question belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Section {
    Physics,
    Chemistry,
    Maths,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Physics, Section::Chemistry, Section::Maths];

    /// Parses a section filter. "All" (or an empty value) means no filter.
    pub fn parse_filter(raw: Option<&str>) -> Result<Option<Section>, String> {
        match raw.map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) if s.eq_ignore_ascii_case("all") => Ok(None),
            Some(s) => Section::ALL
                .into_iter()
                .find(|section| section.as_str().eq_ignore_ascii_case(s))
                .map(Some)
                .ok_or_else(|| format!("Unknown section '{}'", s)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Physics => "Physics",
            Section::Chemistry => "Chemistry",
            Section::Maths => "Maths",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A question exactly as the remote service returns it for `action=questions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    #[serde(deserialize_with = "id_from_any")]
    pub id: String,
    pub section: Section,
    pub question: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    /// Key of the correct option: "option_a" .. "option_d".
    pub correct: String,
}

impl Question {
    /// Option texts in original order (a, b, c, d).
    pub fn options(&self) -> [&str; 4] {
        [
            self.option_a.as_str(),
            self.option_b.as_str(),
            self.option_c.as_str(),
            self.option_d.as_str(),
        ]
    }

    /// Original index (0..4) of the correct option, or `None` when the key is malformed.
    pub fn correct_index(&self) -> Option<usize> {
        OPTION_KEYS.iter().position(|key| *key == self.correct.trim())
    }
}

/// Sheet-backed services hand out numeric ids as JSON numbers; keep them as strings.
fn id_from_any<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "question id must be a string or number, got {}",
            other
        ))),
    }
}

/// A question with its options permuted for one exam attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct ShuffledQuestion {
    pub question: Question,

    /// `order[i]` is the original index of the option shown at slot `i`.
    pub order: [usize; 4],

    /// Slot (0..4) holding the correct option after shuffling.
    pub correct_index: usize,
}

impl ShuffledQuestion {
    pub fn id(&self) -> &str {
        &self.question.id
    }

    pub fn section(&self) -> Section {
        self.question.section
    }

    /// Option texts in shuffled display order.
    pub fn options(&self) -> [&str; 4] {
        let original = self.question.options();
        self.order.map(|i| original[i])
    }

    /// Original option key ("option_a" ..) for a shuffled slot.
    pub fn original_key(&self, slot: usize) -> Option<&'static str> {
        self.order.get(slot).map(|&i| OPTION_KEYS[i])
    }
}

/// DTO for sending a question to the candidate (excludes the answer key).
#[derive(Debug, Serialize, Deserialize)]
pub struct PublicQuestion {
    pub id: String,
    pub section: Section,
    pub question: String,
    pub options: Vec<String>,
}

impl From<&ShuffledQuestion> for PublicQuestion {
    fn from(q: &ShuffledQuestion) -> Self {
        Self {
            id: q.id().to_string(),
            section: q.section(),
            question: clean_html(&q.question.question),
            options: q.options().iter().map(|o| clean_html(o)).collect(),
        }
    }
}
