// src/scoring/mod.rs

//! Psychometric scoring: payload validation, answer expansion and the
//! score aggregation passes. Nothing in here touches the database.

pub mod engine;
pub mod papi;
pub mod recorder;
pub mod validator;
