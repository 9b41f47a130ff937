// src/exam/randomizer.rs

use std::collections::HashSet;

use rand::{Rng, seq::SliceRandom};

use crate::{
    exam::session::SessionError,
    models::question::{Question, ShuffledQuestion},
};

/// Shuffles the bank for one exam attempt.
///
/// Question order is a uniform permutation of the whole bank (not per
/// section); each question's four options are permuted independently and the
/// slot of the originally-correct option is recorded. The bank itself is left
/// untouched. Callers seed `rng` explicitly so attempts are reproducible.
pub fn randomize<R: Rng + ?Sized>(
    bank: &[Question],
    rng: &mut R,
) -> Result<Vec<ShuffledQuestion>, SessionError> {
    if bank.is_empty() {
        return Err(SessionError::EmptyBank);
    }

    let mut seen = HashSet::with_capacity(bank.len());
    for q in bank {
        if !seen.insert(q.id.as_str()) {
            return Err(SessionError::InvalidBank(format!(
                "duplicate question id '{}'",
                q.id
            )));
        }
    }

    let mut picked: Vec<&Question> = bank.iter().collect();
    picked.shuffle(rng);

    picked
        .into_iter()
        .map(|q| {
            let correct = q.correct_index().ok_or_else(|| {
                SessionError::InvalidBank(format!(
                    "question '{}' has unknown correct key '{}'",
                    q.id, q.correct
                ))
            })?;

            let mut order = [0, 1, 2, 3];
            order.shuffle(rng);

            // `order` is a permutation of 0..4, so the correct option is always found.
            let correct_index = order.iter().position(|&i| i == correct).unwrap_or(0);

            Ok(ShuffledQuestion {
                question: q.clone(),
                order,
                correct_index,
            })
        })
        .collect()
}
