// src/models/test.rs

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// How a question is answered and scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    /// Pick one "most like me" and one "least like me" option.
    Disc,
    /// PAPI paired statements, one pick.
    Forced,
    /// Pick exactly two options.
    MultipleSelect,
    Standard,
    Comparison,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::Disc => "disc",
            QuestionType::Forced => "forced",
            QuestionType::MultipleSelect => "multiple_select",
            QuestionType::Standard => "standard",
            QuestionType::Comparison => "comparison",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "disc" => Ok(QuestionType::Disc),
            "forced" => Ok(QuestionType::Forced),
            "multiple_select" => Ok(QuestionType::MultipleSelect),
            "standard" => Ok(QuestionType::Standard),
            "comparison" => Ok(QuestionType::Comparison),
            other => Err(format!("unknown question type '{}'", other)),
        }
    }
}

/// Represents the 'tests' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Test {
    pub id: i64,
    /// Stable identifier, e.g. 'disc', 'papi', 'cfit'.
    pub slug: String,
    pub name: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Raw row of the 'questions' table. The type column is kept as text and
/// parsed into `QuestionType` when the catalog is assembled.
#[derive(Debug, Clone, FromRow)]
pub struct QuestionRow {
    pub id: i64,
    pub test_id: i64,
    #[sqlx(rename = "type")]
    pub question_type: String,
    pub position: i32,
    pub content: String,
}

/// Represents the 'question_options' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct QuestionOption {
    pub id: i64,
    pub question_id: i64,
    pub content: String,
    /// Dimension code this option feeds, e.g. "D" for DISC or "N" for PAPI.
    /// Null for correctness-scored items.
    pub dimension: Option<String>,
    pub is_correct: bool,
    pub score: Option<i32>,
}

/// A catalog question with its options.
#[derive(Debug, Clone, Serialize)]
pub struct Question {
    pub id: i64,
    pub test_id: i64,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub position: i32,
    pub content: String,
    pub options: Vec<QuestionOption>,
}

impl Question {
    pub fn owns_option(&self, option_id: i64) -> bool {
        self.options.iter().any(|o| o.id == option_id)
    }
}

/// DTO for sending an option to a candidate (no dimension, no correctness).
#[derive(Debug, Serialize)]
pub struct PublicOption {
    pub id: i64,
    pub content: String,
}

/// DTO for sending a question to a candidate.
#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    pub id: i64,
    pub test_id: i64,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub position: i32,
    pub content: String,
    pub options: Vec<PublicOption>,
}

impl From<Question> for PublicQuestion {
    fn from(q: Question) -> Self {
        Self {
            id: q.id,
            test_id: q.test_id,
            question_type: q.question_type,
            position: q.position,
            content: q.content,
            options: q
                .options
                .into_iter()
                .map(|o| PublicOption {
                    id: o.id,
                    content: o.content,
                })
                .collect(),
        }
    }
}

/// DTO for importing a test with its questions.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTestRequest {
    #[validate(length(min = 1, max = 50), custom(function = validate_slug))]
    pub slug: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1), nested)]
    pub questions: Vec<CreateQuestionRequest>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub position: Option<i32>,
    #[validate(length(min = 1, max = 2000))]
    pub content: String,
    #[validate(length(min = 2, max = 20), nested)]
    pub options: Vec<CreateOptionRequest>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateOptionRequest {
    #[validate(length(min = 1, max = 1000))]
    pub content: String,
    #[validate(length(min = 1, max = 8))]
    pub dimension: Option<String>,
    #[serde(default)]
    pub is_correct: bool,
    pub score: Option<i32>,
}

fn validate_slug(slug: &str) -> Result<(), validator::ValidationError> {
    let ok = slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
    if !ok {
        return Err(validator::ValidationError::new("invalid_slug"));
    }
    Ok(())
}

impl CreateQuestionRequest {
    /// Type-specific catalog rules the derive cannot express.
    pub fn check_shape(&self) -> Result<(), String> {
        match self.question_type {
            QuestionType::Disc | QuestionType::Forced => {
                if self.options.iter().any(|o| o.dimension.is_none()) {
                    return Err(format!(
                        "every option of a {} question needs a dimension",
                        self.question_type
                    ));
                }
            }
            QuestionType::MultipleSelect => {
                if self.options.len() < 3 {
                    return Err("multiple_select questions need at least 3 options".to_string());
                }
            }
            QuestionType::Standard | QuestionType::Comparison => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_type_parses_all_variants() {
        for t in [
            QuestionType::Disc,
            QuestionType::Forced,
            QuestionType::MultipleSelect,
            QuestionType::Standard,
            QuestionType::Comparison,
        ] {
            assert_eq!(t.as_str().parse::<QuestionType>().unwrap(), t);
        }
        assert!("likert".parse::<QuestionType>().is_err());
    }

    #[test]
    fn slug_rejects_uppercase_and_spaces() {
        assert!(validate_slug("papi-kostick").is_ok());
        assert!(validate_slug("PAPI").is_err());
        assert!(validate_slug("papi test").is_err());
    }

    #[test]
    fn forced_question_requires_dimensions() {
        let req = CreateQuestionRequest {
            question_type: QuestionType::Forced,
            position: None,
            content: "Pick one".to_string(),
            options: vec![
                CreateOptionRequest {
                    content: "I work hard".to_string(),
                    dimension: Some("G".to_string()),
                    is_correct: false,
                    score: None,
                },
                CreateOptionRequest {
                    content: "I like people".to_string(),
                    dimension: None,
                    is_correct: false,
                    score: None,
                },
            ],
        };
        assert!(req.check_shape().is_err());
    }
}
