// src/services/catalog.rs

use std::collections::HashMap;

use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use crate::{
    error::{AppError, SubmissionError},
    models::test::{CreateTestRequest, Question, QuestionOption, QuestionRow, QuestionType, Test},
    utils::html::clean_html,
};

/// Loads questions (with their options) belonging to `test_ids`.
///
/// With `question_ids` set, only those questions are returned; ids that are
/// not part of the given tests are simply absent from the result.
pub async fn load_questions(
    conn: &mut PgConnection,
    test_ids: &[i64],
    question_ids: Option<&[i64]>,
) -> Result<Vec<Question>, SubmissionError> {
    if test_ids.is_empty() || question_ids.is_some_and(|ids| ids.is_empty()) {
        return Ok(Vec::new());
    }

    let mut query_builder = QueryBuilder::<Postgres>::new(
        "SELECT id, test_id, type, position, content FROM questions WHERE test_id = ANY(",
    );
    query_builder.push_bind(test_ids.to_vec());
    query_builder.push(")");

    if let Some(ids) = question_ids {
        query_builder.push(" AND id = ANY(");
        query_builder.push_bind(ids.to_vec());
        query_builder.push(")");
    }
    query_builder.push(" ORDER BY test_id, position, id");

    let rows: Vec<QuestionRow> = query_builder
        .build_query_as()
        .fetch_all(&mut *conn)
        .await?;

    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
    let options: Vec<QuestionOption> = sqlx::query_as(
        r#"
        SELECT id, question_id, content, dimension, is_correct, score
        FROM question_options
        WHERE question_id = ANY($1)
        ORDER BY question_id, id
        "#,
    )
    .bind(&ids)
    .fetch_all(&mut *conn)
    .await?;

    let mut options_by_question: HashMap<i64, Vec<QuestionOption>> = HashMap::new();
    for option in options {
        options_by_question
            .entry(option.question_id)
            .or_default()
            .push(option);
    }

    rows.into_iter()
        .map(|row| {
            let question_type = row
                .question_type
                .parse::<QuestionType>()
                .map_err(|e| SubmissionError::Catalog(format!("question {}: {}", row.id, e)))?;
            Ok(Question {
                id: row.id,
                test_id: row.test_id,
                question_type,
                position: row.position,
                content: row.content,
                options: options_by_question.remove(&row.id).unwrap_or_default(),
            })
        })
        .collect()
}

pub async fn find_tests(conn: &mut PgConnection, test_ids: &[i64]) -> Result<Vec<Test>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, slug, name, created_at FROM tests WHERE id = ANY($1) ORDER BY id",
    )
    .bind(test_ids)
    .fetch_all(&mut *conn)
    .await
}

/// Id of the PAPI test among `test_ids`, if the session includes it.
pub async fn papi_test_id(
    conn: &mut PgConnection,
    test_ids: &[i64],
    papi_slug: &str,
) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar("SELECT id FROM tests WHERE id = ANY($1) AND slug = $2")
        .bind(test_ids)
        .bind(papi_slug)
        .fetch_optional(&mut *conn)
        .await
}

pub async fn list_tests(pool: &PgPool) -> Result<Vec<Test>, sqlx::Error> {
    sqlx::query_as("SELECT id, slug, name, created_at FROM tests ORDER BY id")
        .fetch_all(pool)
        .await
}

/// Imports a test with all its questions and options in one transaction.
/// Question and option texts are sanitized before storage.
pub async fn create_test(pool: &PgPool, req: &CreateTestRequest) -> Result<i64, AppError> {
    let mut tx = pool.begin().await?;

    let test_id: i64 =
        sqlx::query_scalar("INSERT INTO tests (slug, name) VALUES ($1, $2) RETURNING id")
            .bind(&req.slug)
            .bind(clean_html(&req.name))
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    AppError::Conflict(format!("Test '{}' already exists", req.slug))
                }
                _ => {
                    tracing::error!("Failed to create test: {:?}", e);
                    AppError::InternalServerError(e.to_string())
                }
            })?;

    for (index, question) in req.questions.iter().enumerate() {
        let position = question.position.unwrap_or(index as i32 + 1);
        let question_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO questions (test_id, type, position, content)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(test_id)
        .bind(question.question_type.as_str())
        .bind(position)
        .bind(clean_html(&question.content))
        .fetch_one(&mut *tx)
        .await?;

        let mut query_builder = QueryBuilder::<Postgres>::new(
            "INSERT INTO question_options (question_id, content, dimension, is_correct, score) ",
        );
        query_builder.push_values(&question.options, |mut b, option| {
            b.push_bind(question_id)
                .push_bind(clean_html(&option.content))
                .push_bind(option.dimension.as_deref().map(str::to_uppercase))
                .push_bind(option.is_correct)
                .push_bind(option.score);
        });
        query_builder.build().execute(&mut *tx).await?;
    }

    tx.commit().await?;

    tracing::info!(test_id, slug = %req.slug, questions = req.questions.len(), "Imported test");
    Ok(test_id)
}
