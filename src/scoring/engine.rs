// src/scoring/engine.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{answer::ChoiceRole, test::QuestionType};

/// Key under which correctness-scored items are pooled.
pub const TOTAL_KEY: &str = "total";

/// Open mapping from dimension code (or "total") to an integer score.
///
/// Keys appear only once something contributes to them; unseen dimensions
/// are absent rather than zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreMap(BTreeMap<String, i64>);

impl ScoreMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `delta` to `key`, inserting it at zero first if absent.
    pub fn increment(&mut self, key: &str, delta: i64) {
        *self.0.entry(key.to_string()).or_insert(0) += delta;
    }

    pub fn get(&self, key: &str) -> Option<i64> {
        self.0.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<K: Into<String>> FromIterator<(K, i64)> for ScoreMap {
    fn from_iter<I: IntoIterator<Item = (K, i64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// A recorded answer joined with what the scorer needs from its option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredAnswer {
    pub question_type: QuestionType,
    pub role: Option<ChoiceRole>,
    pub dimension: Option<String>,
    pub is_correct: bool,
}

/// Aggregates recorded answers into a score map.
///
/// * DISC: `most` adds 1 to the option's dimension, `least` subtracts 1.
/// * Forced (PAPI): every pick adds 1 to the option's dimension.
/// * Everything else: each correct option adds 1 to "total".
///
/// Options without a dimension are skipped on the dimension paths.
pub fn score<'a, I>(answers: I) -> ScoreMap
where
    I: IntoIterator<Item = &'a ScoredAnswer>,
{
    let mut scores = ScoreMap::new();

    for answer in answers {
        match answer.question_type {
            QuestionType::Disc => {
                let Some(dimension) = answer.dimension.as_deref() else {
                    continue;
                };
                match answer.role {
                    Some(ChoiceRole::Most) => scores.increment(dimension, 1),
                    Some(ChoiceRole::Least) => scores.increment(dimension, -1),
                    None => {
                        tracing::warn!("DISC answer without a most/least role, skipped");
                    }
                }
            }
            QuestionType::Forced => {
                if let Some(dimension) = answer.dimension.as_deref() {
                    scores.increment(dimension, 1);
                }
            }
            QuestionType::MultipleSelect | QuestionType::Standard | QuestionType::Comparison => {
                if answer.is_correct {
                    scores.increment(TOTAL_KEY, 1);
                }
            }
        }
    }

    scores
}
