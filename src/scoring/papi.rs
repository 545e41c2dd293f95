// src/scoring/papi.rs

//! PAPI Kostick profile.
//!
//! Kept alongside the generic score map. Unlike the generic tally it always
//! carries all twenty dimensions, drops codes that are not PAPI dimensions
//! and caps every dimension at the instrument's maximum.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::scoring::engine::ScoreMap;

/// The twenty PAPI dimensions in instrument order.
pub const PAPI_DIMENSIONS: [&str; 20] = [
    "N", "G", "A", "L", "P", "I", "T", "V", "X", "S", "B", "O", "R", "D", "C", "Z", "E", "K", "F",
    "W",
];

/// Highest score a single dimension can reach.
pub const PAPI_MAX_SCORE: i64 = 9;

/// Role areas and the dimensions they sum.
pub const PAPI_AREAS: [(&str, &[&str]); 7] = [
    ("followership", &["F", "W"]),
    ("work_direction", &["N", "G", "A"]),
    ("leadership", &["L", "P", "I"]),
    ("activity", &["T", "V"]),
    ("social_nature", &["X", "S", "B", "O"]),
    ("work_style", &["R", "D", "C"]),
    ("temperament", &["Z", "E", "K"]),
];

pub fn is_papi_dimension(code: &str) -> bool {
    PAPI_DIMENSIONS.contains(&code)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PapiProfile {
    /// Score per dimension, all twenty present.
    pub scores: BTreeMap<String, i64>,
    /// Sum of dimension scores per role area.
    pub areas: BTreeMap<String, i64>,
    /// Number of picks that landed on a PAPI dimension.
    pub answered: i64,
}

impl PapiProfile {
    fn from_counts(counts: BTreeMap<String, i64>, answered: i64) -> Self {
        let scores: BTreeMap<String, i64> = PAPI_DIMENSIONS
            .iter()
            .map(|dim| {
                let raw = counts.get(*dim).copied().unwrap_or(0);
                (dim.to_string(), raw.clamp(0, PAPI_MAX_SCORE))
            })
            .collect();

        let areas = PAPI_AREAS
            .iter()
            .map(|(area, dims)| {
                let sum = dims.iter().map(|d| scores[*d]).sum();
                (area.to_string(), sum)
            })
            .collect();

        Self {
            scores,
            areas,
            answered,
        }
    }

    /// Builds the profile from the dimension codes of the forced-choice picks.
    pub fn from_picks<'a, I>(dimensions: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut counts: BTreeMap<String, i64> = BTreeMap::new();
        let mut answered = 0;

        for code in dimensions {
            if !is_papi_dimension(code) {
                tracing::warn!(dimension = code, "Ignoring non-PAPI dimension in PAPI pass");
                continue;
            }
            *counts.entry(code.to_string()).or_insert(0) += 1;
            answered += 1;
        }

        Self::from_counts(counts, answered)
    }

    /// Rebuilds a profile from a generic score map, for sessions scored
    /// without the dedicated pass.
    pub fn from_score_map(map: &ScoreMap) -> Self {
        let counts: BTreeMap<String, i64> = map
            .iter()
            .filter(|(key, _)| is_papi_dimension(key))
            .map(|(key, value)| (key.to_string(), value))
            .collect();
        let answered = counts.values().filter(|v| **v > 0).sum();
        Self::from_counts(counts, answered)
    }

    pub fn score(&self, dimension: &str) -> Option<i64> {
        self.scores.get(dimension).copied()
    }
}
