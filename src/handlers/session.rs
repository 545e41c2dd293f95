// src/handlers/session.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;

use crate::{
    config::Config,
    error::{AppError, SubmissionError},
    models::{
        answer::SubmitAnswersRequest,
        result::SubmissionResponse,
        session::CandidateSessionView,
        test::PublicQuestion,
    },
    services::{catalog, sessions, submission},
};

/// Opens a test link.
///
/// Returns the questions of every included test, without dimensions or
/// correctness flags. Completed and expired links are refused.
pub async fn show_session(
    State(pool): State<PgPool>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let now = Utc::now();
    let session = sessions::find_by_token(&pool, &token)
        .await?
        .ok_or(SubmissionError::SessionNotFound)?;
    submission::ensure_open(&session, now)?;

    let mut conn = pool.acquire().await?;
    let tests = catalog::find_tests(&mut conn, &session.test_ids).await?;
    let questions = catalog::load_questions(&mut conn, &session.test_ids, None).await?;

    Ok(Json(CandidateSessionView {
        status: session.status(now),
        applicant_name: session.applicant_name,
        expires_at: session.expires_at,
        started_at: session.started_at,
        tests,
        questions: questions.into_iter().map(PublicQuestion::from).collect(),
    }))
}

/// Marks the session as started. Calling it again is harmless.
pub async fn start_session(
    State(pool): State<PgPool>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let now = Utc::now();
    let session = sessions::start(&pool, &token, now).await?;

    Ok(Json(json!({
        "status": session.status(now),
        "started_at": session.started_at,
        "expires_at": session.expires_at,
    })))
}

/// Submits every answer of the session and scores it.
pub async fn submit_answers(
    State(pool): State<PgPool>,
    State(config): State<Arc<Config>>,
    Path(token): Path<String>,
    Json(req): Json<SubmitAnswersRequest>,
) -> Result<impl IntoResponse, AppError> {
    let outcome =
        submission::submit(&pool, &config.papi_test_slug, &token, &req.answers, Utc::now())
            .await
            .map_err(|e| {
                if let SubmissionError::Storage(err) = &e {
                    tracing::error!("Failed to store submission: {:?}", err);
                }
                e
            })?;

    Ok(Json(SubmissionResponse {
        status: "finished",
        result: outcome.scores,
    }))
}
