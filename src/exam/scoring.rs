// src/exam/scoring.rs

use std::collections::HashMap;

use crate::models::{exam_record::SectionScores, question::ShuffledQuestion};

/// Counts correct answers per section.
///
/// An answer is correct when the saved slot equals the slot the correct
/// option landed in after shuffling. Unanswered questions simply don't count;
/// there is no negative marking.
pub fn score(questions: &[ShuffledQuestion], answers: &HashMap<String, usize>) -> SectionScores {
    let mut scores = SectionScores::default();

    for q in questions {
        if answers.get(q.id()) == Some(&q.correct_index) {
            scores.add(q.section());
        }
    }

    scores
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        exam::fixtures::bank,
        exam::randomizer::randomize,
        models::question::Section,
    };
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn scores_per_section() {
        // 15 questions: 5 per section.
        let questions = randomize(&bank(15), &mut StdRng::seed_from_u64(11)).unwrap();
        let mut answers = HashMap::new();
        let mut wanted = [(Section::Physics, 2), (Section::Chemistry, 1)];

        for q in &questions {
            for (section, left) in wanted.iter_mut() {
                if q.section() == *section && *left > 0 {
                    answers.insert(q.id().to_string(), q.correct_index);
                    *left -= 1;
                }
            }
        }

        // Wrong answers on every Maths question.
        for q in questions.iter().filter(|q| q.section() == Section::Maths) {
            answers.insert(q.id().to_string(), (q.correct_index + 1) % 4);
        }

        assert_eq!(
            score(&questions, &answers),
            SectionScores {
                physics: 2,
                chemistry: 1,
                maths: 0,
                total: 3,
            }
        );
    }

    #[test]
    fn unanswered_counts_as_zero() {
        let questions = randomize(&bank(6), &mut StdRng::seed_from_u64(2)).unwrap();
        assert_eq!(score(&questions, &HashMap::new()), SectionScores::default());
    }
}
