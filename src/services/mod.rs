// src/services/mod.rs

pub mod catalog;
pub mod report;
pub mod sessions;
pub mod submission;
