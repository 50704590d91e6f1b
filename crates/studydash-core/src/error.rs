//! Record error types.
//!
//! These errors describe why a record file could not be turned into a
//! dashboard. They never escape [`crate::engine::load_dashboard`], which folds
//! them into a degraded [`crate::model::Outcome`], but [`crate::engine::compute`]
//! and the parser return them directly so callers can branch on them.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading or aggregating a record file.
#[derive(Debug, Error)]
pub enum RecordError {
    /// The record file exists but could not be read.
    #[error("failed to read record file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The front-matter header is not valid YAML, or a field has the wrong type.
    #[error("malformed front matter: {0}")]
    Syntax(#[from] serde_yaml::Error),

    /// A `---` header was opened but never closed.
    #[error("front matter header is not terminated by a closing `---` line")]
    UnterminatedHeader,

    /// A single exam field could not be interpreted.
    #[error("exam #{index} ({module}): field `{field}` {reason}")]
    MalformedField {
        /// Zero-based position of the exam in the `exams` list.
        index: usize,
        /// Module name, or `<unnamed>` when it is the module itself that is missing.
        module: String,
        field: &'static str,
        reason: String,
    },
}

impl RecordError {
    /// Returns `true` if the error is tied to one exam rather than the whole document.
    pub fn is_record_level(&self) -> bool {
        matches!(self, RecordError::MalformedField { .. })
    }
}
