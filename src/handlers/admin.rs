// src/handlers/admin.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use sqlx::PgPool;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::{
        session::{IssueLinkRequest, SessionSummary},
        test::CreateTestRequest,
    },
    services::{catalog, report, sessions},
    utils::jwt::Claims,
};

/// Imports a test with its questions and options.
/// Admin only.
pub async fn create_test(
    State(pool): State<PgPool>,
    Json(payload): Json<CreateTestRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }
    for (index, question) in payload.questions.iter().enumerate() {
        question
            .check_shape()
            .map_err(|msg| AppError::BadRequest(format!("questions[{}]: {}", index, msg)))?;
    }

    let id = catalog::create_test(&pool, &payload).await?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({"id": id}))))
}

/// Lists all tests in the catalog.
/// Admin only.
pub async fn list_tests(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let tests = catalog::list_tests(&pool).await.map_err(|e| {
        tracing::error!("Failed to list tests: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(tests))
}

/// Issues a tokenized test link for an applicant.
/// Admin only.
pub async fn issue_link(
    State(pool): State<PgPool>,
    State(config): State<Arc<Config>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<IssueLinkRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let link = sessions::issue(&pool, &config, payload, Utc::now()).await?;
    tracing::info!(issued_by = %claims.sub, session_id = link.id, "Test link issued");

    Ok((StatusCode::CREATED, Json(link)))
}

/// Lists sessions with their derived status and durations.
/// Admin only.
pub async fn list_sessions(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let now = Utc::now();
    let summaries: Vec<SessionSummary> = sessions::list(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list sessions: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?
        .into_iter()
        .map(|s| SessionSummary::from_session(s, now))
        .collect();

    Ok(Json(summaries))
}

/// Returns the scores of a session, including its PAPI profile.
/// Admin only.
pub async fn session_report(
    State(pool): State<PgPool>,
    State(config): State<Arc<Config>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let report = report::session_report(&pool, &config, id, Utc::now()).await?;
    Ok(Json(report))
}

/// Deletes a session together with its answers and results.
/// Admin only.
pub async fn delete_session(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = sessions::delete(&pool, id).await.map_err(|e| {
        tracing::error!("Failed to delete session: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    if !deleted {
        return Err(AppError::NotFound("Session not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
