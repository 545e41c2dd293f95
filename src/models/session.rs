// src/models/session.rs

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::test::{PublicQuestion, Test};

/// Represents the 'test_sessions' table in the database.
/// One tokenized, time-boxed test-taking instance for a single applicant.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TestSession {
    pub id: i64,

    /// Opaque token embedded in the shareable link.
    pub token: String,

    pub applicant_name: String,
    pub applicant_email: String,
    pub applicant_phone: Option<String>,

    /// Tests the applicant has to take in this session.
    pub test_ids: Vec<i64>,

    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// Derived lifecycle state. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Issued,
    Started,
    Completed,
    Expired,
}

impl TestSession {
    pub fn is_finished(&self) -> bool {
        self.finished_at.is_some()
    }

    /// A finished session is never expired, whatever its `expires_at`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.finished_at.is_none() && self.expires_at < now
    }

    pub fn status(&self, now: DateTime<Utc>) -> SessionStatus {
        if self.is_finished() {
            SessionStatus::Completed
        } else if self.is_expired(now) {
            SessionStatus::Expired
        } else if self.started_at.is_some() {
            SessionStatus::Started
        } else {
            SessionStatus::Issued
        }
    }

    fn elapsed(&self) -> Option<Duration> {
        match (self.started_at, self.finished_at) {
            (Some(started), Some(finished)) if finished >= started => Some(finished - started),
            (Some(started), Some(finished)) => Some(started - finished),
            _ => None,
        }
    }

    /// Human readable time spent, e.g. "12 minutes 5 seconds".
    /// `None` until both timestamps are known.
    pub fn duration(&self) -> Option<String> {
        self.elapsed().map(humanize)
    }

    /// Time spent in whole seconds, 0 until both timestamps are known.
    pub fn duration_seconds(&self) -> i64 {
        self.elapsed().map(|d| d.num_seconds()).unwrap_or(0)
    }
}

fn humanize(d: Duration) -> String {
    let total = d.num_seconds();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    let unit = |n: i64, name: &str| {
        if n == 1 {
            format!("1 {}", name)
        } else {
            format!("{} {}s", n, name)
        }
    };

    let mut parts = Vec::new();
    if hours > 0 {
        parts.push(unit(hours, "hour"));
    }
    if minutes > 0 {
        parts.push(unit(minutes, "minute"));
    }
    if seconds > 0 || parts.is_empty() {
        parts.push(unit(seconds, "second"));
    }
    parts.join(" ")
}

/// Session as listed for admins, with derived fields.
#[derive(Debug, Serialize)]
pub struct SessionSummary {
    pub id: i64,
    pub token: String,
    pub applicant_name: String,
    pub applicant_email: String,
    pub test_ids: Vec<i64>,
    pub status: SessionStatus,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub duration: Option<String>,
    pub duration_seconds: i64,
}

impl SessionSummary {
    pub fn from_session(s: TestSession, now: DateTime<Utc>) -> Self {
        Self {
            status: s.status(now),
            duration: s.duration(),
            duration_seconds: s.duration_seconds(),
            id: s.id,
            token: s.token,
            applicant_name: s.applicant_name,
            applicant_email: s.applicant_email,
            test_ids: s.test_ids,
            issued_at: s.issued_at,
            expires_at: s.expires_at,
            started_at: s.started_at,
            finished_at: s.finished_at,
        }
    }
}

/// What a candidate sees when opening a link.
#[derive(Debug, Serialize)]
pub struct CandidateSessionView {
    pub applicant_name: String,
    pub status: SessionStatus,
    pub expires_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub tests: Vec<Test>,
    pub questions: Vec<PublicQuestion>,
}

/// DTO for issuing a new test link.
#[derive(Debug, Deserialize, Validate)]
pub struct IssueLinkRequest {
    #[validate(length(min = 1, max = 200))]
    pub applicant_name: String,
    #[validate(email)]
    pub applicant_email: String,
    #[validate(length(min = 3, max = 30))]
    pub applicant_phone: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub test_ids: Vec<i64>,
    /// Overrides the configured link validity.
    #[validate(range(min = 1, max = 43200))]
    pub expires_in_minutes: Option<i64>,
}

/// Response after issuing a link.
#[derive(Debug, Serialize)]
pub struct IssuedLink {
    pub id: i64,
    pub token: String,
    pub url: String,
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn session() -> TestSession {
        let issued = Utc.with_ymd_and_hms(2026, 1, 10, 9, 0, 0).unwrap();
        TestSession {
            id: 1,
            token: "t".to_string(),
            applicant_name: "Applicant".to_string(),
            applicant_email: "a@example.com".to_string(),
            applicant_phone: None,
            test_ids: vec![1],
            issued_at: issued,
            expires_at: issued + Duration::hours(2),
            started_at: None,
            finished_at: None,
        }
    }

    #[test]
    fn finished_session_is_never_expired() {
        let mut s = session();
        s.finished_at = Some(s.issued_at + Duration::minutes(5));
        let long_after = s.expires_at + Duration::days(30);
        assert!(!s.is_expired(long_after));
        assert_eq!(s.status(long_after), SessionStatus::Completed);
    }

    #[test]
    fn unfinished_session_past_expiry_is_expired() {
        let s = session();
        let after = s.expires_at + Duration::seconds(1);
        assert!(s.is_expired(after));
        assert_eq!(s.status(after), SessionStatus::Expired);
    }

    #[test]
    fn status_moves_from_issued_to_started() {
        let mut s = session();
        let now = s.issued_at + Duration::minutes(1);
        assert_eq!(s.status(now), SessionStatus::Issued);
        s.started_at = Some(now);
        assert_eq!(s.status(now), SessionStatus::Started);
    }

    #[test]
    fn duration_seconds_defaults_to_zero() {
        let mut s = session();
        assert_eq!(s.duration_seconds(), 0);
        s.started_at = Some(s.issued_at);
        assert_eq!(s.duration_seconds(), 0);
    }

    #[test]
    fn duration_is_none_until_finished() {
        let mut s = session();
        assert_eq!(s.duration(), None);
        s.started_at = Some(s.issued_at);
        assert_eq!(s.duration(), None);
        s.started_at = None;
        s.finished_at = Some(s.issued_at);
        assert_eq!(s.duration(), None);
    }

    #[test]
    fn duration_when_both_timestamps_set() {
        let mut s = session();
        s.started_at = Some(s.issued_at);
        s.finished_at = Some(s.issued_at + Duration::seconds(3725));
        assert_eq!(s.duration_seconds(), 3725);
        assert_eq!(s.duration().as_deref(), Some("1 hour 2 minutes 5 seconds"));
    }

    #[test]
    fn humanize_zero_and_singular_units() {
        assert_eq!(humanize(Duration::zero()), "0 seconds");
        assert_eq!(humanize(Duration::seconds(61)), "1 minute 1 second");
    }
}
