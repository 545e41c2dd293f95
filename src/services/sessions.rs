// src/services/sessions.rs

use chrono::{DateTime, Duration, Utc};
use sqlx::{PgConnection, PgPool};

use crate::{
    config::Config,
    error::{AppError, SubmissionError},
    models::session::{IssueLinkRequest, IssuedLink, TestSession},
    services::{catalog, submission::ensure_open},
    utils::token,
};

const SESSION_COLUMNS: &str = "id, token, applicant_name, applicant_email, applicant_phone, \
     test_ids, issued_at, expires_at, started_at, finished_at";

pub async fn find_by_token(
    pool: &PgPool,
    session_token: &str,
) -> Result<Option<TestSession>, sqlx::Error> {
    if !token::is_well_formed(session_token) {
        return Ok(None);
    }
    sqlx::query_as(&format!(
        "SELECT {} FROM test_sessions WHERE token = $1",
        SESSION_COLUMNS
    ))
    .bind(session_token)
    .fetch_optional(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<TestSession>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {} FROM test_sessions WHERE id = $1",
        SESSION_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Fetches the session and holds a row lock until the transaction ends.
pub async fn lock_by_token(
    conn: &mut PgConnection,
    session_token: &str,
) -> Result<Option<TestSession>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {} FROM test_sessions WHERE token = $1 FOR UPDATE",
        SESSION_COLUMNS
    ))
    .bind(session_token)
    .fetch_optional(&mut *conn)
    .await
}

/// Moves an issued session to started. Starting twice keeps the first time.
pub async fn start(
    pool: &PgPool,
    session_token: &str,
    now: DateTime<Utc>,
) -> Result<TestSession, SubmissionError> {
    if !token::is_well_formed(session_token) {
        return Err(SubmissionError::SessionNotFound);
    }

    let mut tx = pool.begin().await?;
    let mut session = lock_by_token(&mut tx, session_token)
        .await?
        .ok_or(SubmissionError::SessionNotFound)?;
    ensure_open(&session, now)?;

    if session.started_at.is_none() {
        sqlx::query("UPDATE test_sessions SET started_at = $2 WHERE id = $1 AND started_at IS NULL")
            .bind(session.id)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        session.started_at = Some(now);
        tracing::info!(session_id = session.id, "Test session started");
    }

    tx.commit().await?;
    Ok(session)
}

fn link_expiry(now: DateTime<Utc>, ttl_minutes: i64) -> Result<DateTime<Utc>, AppError> {
    Duration::try_minutes(ttl_minutes)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .ok_or_else(|| AppError::BadRequest(format!("Link validity out of range: {}", ttl_minutes)))
}

/// Issues a new test link for an applicant.
pub async fn issue(
    pool: &PgPool,
    config: &Config,
    req: IssueLinkRequest,
    now: DateTime<Utc>,
) -> Result<IssuedLink, AppError> {
    let mut test_ids = req.test_ids;
    test_ids.sort_unstable();
    test_ids.dedup();

    let mut conn = pool.acquire().await?;
    let known = catalog::find_tests(&mut conn, &test_ids).await?;
    if known.len() != test_ids.len() {
        let missing: Vec<String> = test_ids
            .iter()
            .filter(|id| !known.iter().any(|t| t.id == **id))
            .map(|id| id.to_string())
            .collect();
        return Err(AppError::BadRequest(format!(
            "Unknown test ids: {}",
            missing.join(", ")
        )));
    }

    let ttl = req.expires_in_minutes.unwrap_or(config.link_ttl_minutes);
    let expires_at = link_expiry(now, ttl)?;
    let session_token = token::generate_token();

    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO test_sessions
        (token, applicant_name, applicant_email, applicant_phone, test_ids, issued_at, expires_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id
        "#,
    )
    .bind(&session_token)
    .bind(&req.applicant_name)
    .bind(&req.applicant_email)
    .bind(&req.applicant_phone)
    .bind(&test_ids)
    .bind(now)
    .bind(expires_at)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| {
        tracing::error!("Failed to issue test link: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let url = config
        .test_link(&session_token)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    tracing::info!(session_id = id, tests = ?test_ids, "Issued test link");

    Ok(IssuedLink {
        id,
        token: session_token,
        url: url.to_string(),
        expires_at,
    })
}

pub async fn list(pool: &PgPool) -> Result<Vec<TestSession>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {} FROM test_sessions ORDER BY id DESC",
        SESSION_COLUMNS
    ))
    .fetch_all(pool)
    .await
}

/// Deletes a session; answers and results go with it.
pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM test_sessions WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn link_expiry_adds_minutes() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(link_expiry(now, 90).unwrap(), now + Duration::minutes(90));
    }

    #[test]
    fn oversized_link_validity_is_a_bad_request() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        assert!(matches!(
            link_expiry(now, i64::MAX),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            link_expiry(now, i64::MAX / 120),
            Err(AppError::BadRequest(_))
        ));
    }
}
