// src/models/answer.rs

use std::{collections::HashMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Which side of a DISC pair an answer row records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChoiceRole {
    Most,
    Least,
}

impl ChoiceRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChoiceRole::Most => "most",
            ChoiceRole::Least => "least",
        }
    }
}

impl fmt::Display for ChoiceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChoiceRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "most" => Ok(ChoiceRole::Most),
            "least" => Ok(ChoiceRole::Least),
            other => Err(format!("unknown choice role '{}'", other)),
        }
    }
}

/// A 'test_answers' row about to be inserted. Rows are never updated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAnswer {
    pub question_id: i64,
    pub option_id: i64,
    pub role: Option<ChoiceRole>,
}

/// Answer row joined with its question type and option scoring data.
#[derive(Debug, Clone, FromRow)]
pub struct ScoredAnswerRow {
    pub question_id: i64,
    pub test_id: i64,
    pub question_type: String,
    pub role: Option<String>,
    pub dimension: Option<String>,
    pub is_correct: bool,
}

/// DTO for submitting a test.
///
/// Keys are question ids. Values depend on the question type:
/// `{"most": 1, "least": 2}` for DISC, `[3, 4]` for multiple select and a
/// single option id for everything else.
#[derive(Debug, Deserialize)]
pub struct SubmitAnswersRequest {
    pub answers: HashMap<String, serde_json::Value>,
}
