//! studydash-core — Exam record parsing, classification, and aggregation.
//!
//! This crate turns a student's record file into the derived summary the
//! dashboard renders: credits earned, grade average, workload, and the
//! ordered schedule and transcript views.

pub mod config;
pub mod dates;
pub mod engine;
pub mod error;
pub mod model;
pub mod parser;
pub mod statistics;
