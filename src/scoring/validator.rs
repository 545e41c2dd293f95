// src/scoring/validator.rs

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use serde_json::Value;

use crate::models::test::{Question, QuestionType};

pub const MSG_INVALID_QUESTION_ID: &str = "invalid question id";
pub const MSG_QUESTION_NOT_FOUND: &str = "question not found";
pub const MSG_DISC_SHAPE: &str = "DISC requires both Most and Least selections";
pub const MSG_DISC_DISTINCT: &str = "DISC requires distinct Most and Least selections";
pub const MSG_NOT_OWNED: &str = "option does not belong to this question";
pub const MSG_SINGLE_OPTION: &str = "a single option must be selected";
pub const MSG_SELECT_TWO: &str = "must select exactly 2 options";
pub const MSG_SELECT_DISTINCT: &str = "must select 2 different options";
pub const MSG_NO_ANSWERS: &str = "no answers submitted";
pub const MSG_DUPLICATE_ANSWER: &str = "duplicate answer for this question";

/// Number of options a multiple-select question takes.
pub const MULTIPLE_SELECT_COUNT: usize = 2;

/// Field-keyed error set. Keys are the question ids as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let messages = self.0.entry(field.into()).or_default();
        let message = message.into();
        if !messages.contains(&message) {
            messages.push(message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", field, messages.join(", "))?;
            first = false;
        }
        Ok(())
    }
}

/// A normalized choice, shaped by its question type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Disc { most: i64, least: i64 },
    Pair(i64, i64),
    Single(i64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedAnswer {
    pub question_id: i64,
    pub question_type: QuestionType,
    pub selection: Selection,
}

/// Option ids may arrive as JSON numbers or numeric strings (form posts).
fn option_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn check_single(question: &Question, value: &Value) -> Result<Selection, &'static str> {
    let id = option_id(value).ok_or(MSG_SINGLE_OPTION)?;
    if !question.owns_option(id) {
        return Err(MSG_NOT_OWNED);
    }
    Ok(Selection::Single(id))
}

fn check_disc(question: &Question, value: &Value) -> Result<Selection, Vec<&'static str>> {
    let (most, least) = match value {
        Value::Object(map) => (
            map.get("most").and_then(option_id),
            map.get("least").and_then(option_id),
        ),
        _ => (None, None),
    };
    let (Some(most), Some(least)) = (most, least) else {
        return Err(vec![MSG_DISC_SHAPE]);
    };

    let mut problems = Vec::new();
    if most == least {
        problems.push(MSG_DISC_DISTINCT);
    }
    if !question.owns_option(most) || !question.owns_option(least) {
        problems.push(MSG_NOT_OWNED);
    }

    if problems.is_empty() {
        Ok(Selection::Disc { most, least })
    } else {
        Err(problems)
    }
}

fn check_pair(question: &Question, value: &Value) -> Result<Selection, Vec<&'static str>> {
    let Value::Array(items) = value else {
        return Err(vec![MSG_SELECT_TWO]);
    };
    if items.len() != MULTIPLE_SELECT_COUNT {
        return Err(vec![MSG_SELECT_TWO]);
    }
    let (Some(first), Some(second)) = (option_id(&items[0]), option_id(&items[1])) else {
        return Err(vec![MSG_SELECT_TWO]);
    };

    let mut problems = Vec::new();
    if first == second {
        problems.push(MSG_SELECT_DISTINCT);
    }
    if !question.owns_option(first) || !question.owns_option(second) {
        problems.push(MSG_NOT_OWNED);
    }

    if problems.is_empty() {
        Ok(Selection::Pair(first, second))
    } else {
        Err(problems)
    }
}

/// Validates a raw submission against the catalog.
///
/// Every entry is checked before returning; either all answers are accepted
/// or the complete error set is reported.
pub fn validate_submission(
    raw: &HashMap<String, Value>,
    catalog: &HashMap<i64, Question>,
) -> Result<Vec<ValidatedAnswer>, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let mut accepted = Vec::with_capacity(raw.len());

    if raw.is_empty() {
        errors.add("answers", MSG_NO_ANSWERS);
        return Err(errors);
    }

    let mut keys: Vec<&String> = raw.keys().collect();
    keys.sort();

    // "5", "05" and " 5" all name question 5; only one answer per question is allowed.
    let mut parsed = Vec::with_capacity(keys.len());
    let mut key_count: HashMap<i64, usize> = HashMap::new();
    for key in keys {
        match key.trim().parse::<i64>() {
            Ok(question_id) => {
                *key_count.entry(question_id).or_default() += 1;
                parsed.push((key, question_id));
            }
            Err(_) => errors.add(key.as_str(), MSG_INVALID_QUESTION_ID),
        }
    }

    for (key, question_id) in parsed {
        let value = &raw[key];

        if key_count[&question_id] > 1 {
            errors.add(key.as_str(), MSG_DUPLICATE_ANSWER);
            continue;
        }
        let Some(question) = catalog.get(&question_id) else {
            errors.add(key.as_str(), MSG_QUESTION_NOT_FOUND);
            continue;
        };

        let checked = match question.question_type {
            QuestionType::Disc => check_disc(question, value),
            QuestionType::MultipleSelect => check_pair(question, value),
            QuestionType::Forced | QuestionType::Standard | QuestionType::Comparison => {
                if value.is_array() {
                    Err(vec![MSG_SINGLE_OPTION])
                } else {
                    check_single(question, value).map_err(|m| vec![m])
                }
            }
        };

        match checked {
            Ok(selection) => accepted.push(ValidatedAnswer {
                question_id,
                question_type: question.question_type,
                selection,
            }),
            Err(problems) => {
                for message in problems {
                    errors.add(key.as_str(), message);
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(accepted)
    } else {
        Err(errors)
    }
}
