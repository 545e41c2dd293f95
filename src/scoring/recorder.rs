// src/scoring/recorder.rs

use crate::{
    models::answer::{ChoiceRole, NewAnswer},
    scoring::validator::{Selection, ValidatedAnswer},
};

/// Expands validated answers into the rows to persist.
///
/// DISC yields a `most` and a `least` row, multiple select one untagged row
/// per pick, everything else a single row.
pub fn answer_rows(answers: &[ValidatedAnswer]) -> Vec<NewAnswer> {
    let mut rows = Vec::with_capacity(answers.len() * 2);

    for answer in answers {
        let question_id = answer.question_id;
        match answer.selection {
            Selection::Disc { most, least } => {
                rows.push(NewAnswer {
                    question_id,
                    option_id: most,
                    role: Some(ChoiceRole::Most),
                });
                rows.push(NewAnswer {
                    question_id,
                    option_id: least,
                    role: Some(ChoiceRole::Least),
                });
            }
            Selection::Pair(first, second) => {
                for option_id in [first, second] {
                    rows.push(NewAnswer {
                        question_id,
                        option_id,
                        role: None,
                    });
                }
            }
            Selection::Single(option_id) => rows.push(NewAnswer {
                question_id,
                option_id,
                role: None,
            }),
        }
    }

    rows
}
