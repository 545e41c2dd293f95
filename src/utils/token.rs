// src/utils/token.rs

use std::sync::LazyLock;

use regex::Regex;
use uuid::Uuid;

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-f]{32}$").expect("token pattern is valid"));

/// Generates an opaque link token (32 lowercase hex characters).
pub fn generate_token() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Cheap shape check so obviously bogus tokens never reach the database.
pub fn is_well_formed(token: &str) -> bool {
    TOKEN_RE.is_match(token)
}
