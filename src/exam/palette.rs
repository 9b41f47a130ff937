// src/exam/palette.rs

use serde::{Deserialize, Serialize};

use crate::{exam::session::ExamSession, models::question::Section};

/// One button in the question palette.
///
/// `answered` and `marked` are reported independently; a question can be
/// both, and the client decides how to draw that combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteEntry {
    /// Position in the shuffled question list; pass to `go_to`.
    pub index: usize,

    /// 1-based label shown on the button.
    pub number: usize,
    pub question_id: String,
    pub section: Section,
    pub answered: bool,
    pub marked: bool,
    pub current: bool,
}

/// Lists the palette, honouring the session's section filter.
pub fn palette(session: &ExamSession) -> Vec<PaletteEntry> {
    let filter = session.section_filter();

    session
        .questions()
        .iter()
        .enumerate()
        .filter(|(_, q)| filter.is_none_or(|section| q.section() == section))
        .map(|(index, q)| PaletteEntry {
            index,
            number: index + 1,
            question_id: q.id().to_string(),
            section: q.section(),
            answered: session.answer(q.id()).is_some(),
            marked: session.is_marked(q.id()),
            current: index == session.position(),
        })
        .collect()
}
