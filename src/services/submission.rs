// src/services/submission.rs

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder, types::Json};

use crate::{
    error::SubmissionError,
    models::{
        answer::{ChoiceRole, NewAnswer, ScoredAnswerRow},
        session::TestSession,
        test::QuestionType,
    },
    scoring::{
        engine::{self, ScoreMap, ScoredAnswer},
        papi::PapiProfile,
        recorder, validator,
    },
    services::{catalog, sessions},
    utils::token,
};

/// What a successful submission produced.
#[derive(Debug)]
pub struct SubmissionOutcome {
    pub session_id: i64,
    pub scores: ScoreMap,
    /// Present when the session included the PAPI test.
    pub papi: Option<PapiProfile>,
    pub finished_at: DateTime<Utc>,
}

/// Refuses sessions that can no longer take answers.
pub fn ensure_open(session: &TestSession, now: DateTime<Utc>) -> Result<(), SubmissionError> {
    if session.is_finished() {
        return Err(SubmissionError::SessionAlreadyCompleted);
    }
    if session.is_expired(now) {
        return Err(SubmissionError::SessionExpired);
    }
    Ok(())
}

/// Validates, records, scores and finalizes a submission in one transaction.
///
/// The session row is locked for the duration, and the final update is
/// guarded by `finished_at IS NULL`, so a concurrent second submission for
/// the same token ends with `SessionAlreadyCompleted`. Any error drops the
/// transaction: no answers, no result and no `finished_at` survive.
pub async fn submit(
    pool: &PgPool,
    papi_slug: &str,
    session_token: &str,
    raw: &HashMap<String, Value>,
    now: DateTime<Utc>,
) -> Result<SubmissionOutcome, SubmissionError> {
    if !token::is_well_formed(session_token) {
        return Err(SubmissionError::SessionNotFound);
    }

    let mut tx = pool.begin().await?;

    let session = sessions::lock_by_token(&mut tx, session_token)
        .await?
        .ok_or(SubmissionError::SessionNotFound)?;
    ensure_open(&session, now)?;

    // Unparseable keys are reported by the validator; only real ids hit the catalog.
    let question_ids: Vec<i64> = raw
        .keys()
        .filter_map(|k| k.trim().parse::<i64>().ok())
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let catalog: HashMap<_, _> =
        catalog::load_questions(&mut tx, &session.test_ids, Some(&question_ids))
            .await?
            .into_iter()
            .map(|q| (q.id, q))
            .collect();

    let validated = validator::validate_submission(raw, &catalog).map_err(|errors| {
        tracing::info!(
            session_id = session.id,
            invalid = errors.len(),
            "Submission rejected by validation"
        );
        SubmissionError::Validation(errors)
    })?;

    let rows = recorder::answer_rows(&validated);
    insert_answers(&mut tx, session.id, &rows, now).await?;

    let recorded = load_scored_answers(&mut tx, session.id).await?;
    let scores = engine::score(recorded.iter().map(|(_, answer)| answer));

    sqlx::query("INSERT INTO test_results (session_id, scores, created_at) VALUES ($1, $2, $3)")
        .bind(session.id)
        .bind(Json(&scores))
        .bind(now)
        .execute(&mut *tx)
        .await?;

    let papi = match catalog::papi_test_id(&mut tx, &session.test_ids, papi_slug).await? {
        Some(papi_test) => {
            let profile = papi_profile(&recorded, papi_test);
            sqlx::query(
                "INSERT INTO papi_results (session_id, profile, created_at) VALUES ($1, $2, $3)",
            )
            .bind(session.id)
            .bind(Json(&profile))
            .bind(now)
            .execute(&mut *tx)
            .await?;
            Some(profile)
        }
        None => None,
    };

    let finished = sqlx::query(
        r#"
        UPDATE test_sessions
        SET finished_at = $2, started_at = COALESCE(started_at, $2)
        WHERE id = $1 AND finished_at IS NULL
        "#,
    )
    .bind(session.id)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    if finished.rows_affected() == 0 {
        tracing::warn!(session_id = session.id, "Lost race to complete session");
        return Err(SubmissionError::SessionAlreadyCompleted);
    }

    tx.commit().await?;

    tracing::info!(
        session_id = session.id,
        answers = rows.len(),
        "Test session completed"
    );

    Ok(SubmissionOutcome {
        session_id: session.id,
        scores,
        papi,
        finished_at: now,
    })
}

async fn insert_answers(
    conn: &mut PgConnection,
    session_id: i64,
    rows: &[NewAnswer],
    now: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    if rows.is_empty() {
        return Ok(());
    }

    let mut query_builder = QueryBuilder::<Postgres>::new(
        "INSERT INTO test_answers (session_id, question_id, option_id, role, created_at) ",
    );
    query_builder.push_values(rows, |mut b, row| {
        b.push_bind(session_id)
            .push_bind(row.question_id)
            .push_bind(row.option_id)
            .push_bind(row.role.map(|r| r.as_str()))
            .push_bind(now);
    });
    query_builder.build().execute(&mut *conn).await?;
    Ok(())
}

/// Reads back every answer of the session joined with its option, tagged
/// with the test the question belongs to.
async fn load_scored_answers(
    conn: &mut PgConnection,
    session_id: i64,
) -> Result<Vec<(i64, ScoredAnswer)>, SubmissionError> {
    let rows: Vec<ScoredAnswerRow> = sqlx::query_as(
        r#"
        SELECT
            a.question_id,
            q.test_id,
            q.type AS question_type,
            a.role,
            o.dimension,
            o.is_correct
        FROM test_answers a
        JOIN questions q ON q.id = a.question_id
        JOIN question_options o ON o.id = a.option_id
        WHERE a.session_id = $1
        ORDER BY a.id
        "#,
    )
    .bind(session_id)
    .fetch_all(&mut *conn)
    .await?;

    rows.into_iter().map(scored_answer).collect()
}

fn scored_answer(row: ScoredAnswerRow) -> Result<(i64, ScoredAnswer), SubmissionError> {
    let question_type = row
        .question_type
        .parse::<QuestionType>()
        .map_err(|e| SubmissionError::Catalog(format!("question {}: {}", row.question_id, e)))?;
    let role = row
        .role
        .as_deref()
        .map(str::parse::<ChoiceRole>)
        .transpose()
        .map_err(|e| SubmissionError::Catalog(format!("question {}: {}", row.question_id, e)))?;

    Ok((
        row.test_id,
        ScoredAnswer {
            question_type,
            role,
            dimension: row.dimension,
            is_correct: row.is_correct,
        },
    ))
}

/// Dedicated PAPI pass over the forced-choice answers of the PAPI test.
fn papi_profile(recorded: &[(i64, ScoredAnswer)], papi_test: i64) -> PapiProfile {
    PapiProfile::from_picks(
        recorded
            .iter()
            .filter(|(test_id, a)| *test_id == papi_test && a.question_type == QuestionType::Forced)
            .filter_map(|(_, a)| a.dimension.as_deref()),
    )
}
