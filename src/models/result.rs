// src/models/result.rs

use serde::Serialize;
use sqlx::{FromRow, types::Json};

use crate::{
    models::session::SessionSummary,
    scoring::{engine::ScoreMap, papi::PapiProfile},
};

/// Represents the 'test_results' table in the database.
/// Written exactly once per session, when the submission is scored.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TestResult {
    pub session_id: i64,
    pub scores: Json<ScoreMap>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Represents the 'papi_results' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PapiResult {
    pub session_id: i64,
    pub profile: Json<PapiProfile>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Where the PAPI numbers of a report came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PapiSource {
    /// The dedicated PAPI pass stored at submission time.
    Dedicated,
    /// Rebuilt from the forced-choice entries of the generic score map.
    Generic,
}

#[derive(Debug, Serialize)]
pub struct PapiReport {
    pub source: PapiSource,
    pub profile: PapiProfile,
}

/// Everything an admin sees about a finished (or pending) session.
#[derive(Debug, Serialize)]
pub struct SessionReport {
    pub session: SessionSummary,
    pub scored_at: Option<chrono::DateTime<chrono::Utc>>,
    pub scores: Option<ScoreMap>,
    pub papi: Option<PapiReport>,
}

/// Response to a successful submission.
#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    pub status: &'static str,
    pub result: ScoreMap,
}
