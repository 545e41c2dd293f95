// src/services/report.rs

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::{
    config::Config,
    error::AppError,
    models::{
        result::{PapiReport, PapiResult, PapiSource, SessionReport, TestResult},
        session::SessionSummary,
    },
    scoring::{engine::ScoreMap, papi::PapiProfile},
    services::{catalog, sessions},
};

/// Picks the PAPI numbers to report: the dedicated result when stored,
/// otherwise a profile rebuilt from the generic map of a PAPI session.
pub fn papi_report(
    dedicated: Option<PapiProfile>,
    scores: Option<&ScoreMap>,
    includes_papi: bool,
) -> Option<PapiReport> {
    if let Some(profile) = dedicated {
        return Some(PapiReport {
            source: PapiSource::Dedicated,
            profile,
        });
    }
    match scores {
        Some(scores) if includes_papi => Some(PapiReport {
            source: PapiSource::Generic,
            profile: PapiProfile::from_score_map(scores),
        }),
        _ => None,
    }
}

pub async fn session_report(
    pool: &PgPool,
    config: &Config,
    session_id: i64,
    now: DateTime<Utc>,
) -> Result<SessionReport, AppError> {
    let session = sessions::find_by_id(pool, session_id)
        .await?
        .ok_or(AppError::NotFound("Session not found".to_string()))?;

    let result: Option<TestResult> = sqlx::query_as(
        "SELECT session_id, scores, created_at FROM test_results WHERE session_id = $1",
    )
    .bind(session_id)
    .fetch_optional(pool)
    .await?;
    let scored_at = result.as_ref().and_then(|r| r.created_at);
    let scores = result.map(|r| r.scores.0);

    let dedicated: Option<PapiResult> = sqlx::query_as(
        "SELECT session_id, profile, created_at FROM papi_results WHERE session_id = $1",
    )
    .bind(session_id)
    .fetch_optional(pool)
    .await?;
    let dedicated = dedicated.map(|r| r.profile.0);

    let mut conn = pool.acquire().await?;
    let includes_papi =
        catalog::papi_test_id(&mut conn, &session.test_ids, &config.papi_test_slug)
            .await?
            .is_some();

    let papi = papi_report(dedicated, scores.as_ref(), includes_papi);

    Ok(SessionReport {
        session: SessionSummary::from_session(session, now),
        scored_at,
        scores,
        papi,
    })
}
