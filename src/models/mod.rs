// src/models/mod.rs

pub mod answer;
pub mod result;
pub mod session;
pub mod test;
