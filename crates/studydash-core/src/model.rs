//! Core data model types for studydash.
//!
//! Raw exam records as they appear in the record file's header, the status
//! categories they are classified into, and the derived views the
//! presentation layer renders.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::RecordError;

/// Semester assumed for exams that do not declare one ("unclassified/future").
pub const DEFAULT_SEMESTER: i64 = 99;

/// Semester assumed when the header does not declare `current_semester`.
pub const DEFAULT_CURRENT_SEMESTER: i64 = 1;

/// Status assumed for exams that do not declare one.
pub const DEFAULT_STATUS: &str = "open";

/// Parsed front-matter header of a record file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    /// The semester the student is currently in.
    #[serde(default)]
    pub current_semester: Option<i64>,
    /// Declared exams, in file order.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub exams: Vec<ExamRecord>,
}

impl Metadata {
    /// The current semester, falling back to [`DEFAULT_CURRENT_SEMESTER`].
    pub fn current_semester(&self) -> i64 {
        self.current_semester.unwrap_or(DEFAULT_CURRENT_SEMESTER)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<ExamRecord>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<ExamRecord>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A single exam entry as written in the record file.
///
/// Fields are kept loosely typed where people write them loosely (`date`,
/// `grade`); the engine interprets them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExamRecord {
    /// Display name, also the exam's identity.
    #[serde(default)]
    pub module: Option<String>,
    #[serde(default)]
    pub semester: Option<i64>,
    /// Credit weight.
    #[serde(default)]
    pub ects: Option<f64>,
    /// Free-text status, compared case-insensitively.
    #[serde(default)]
    pub status: Option<String>,
    /// Exam date (`DD.MM.YYYY` or a sentinel such as `TBD`).
    #[serde(default)]
    pub date: Option<serde_yaml::Value>,
    /// Numeric grade, only meaningful for passed exams.
    #[serde(default)]
    pub grade: Option<serde_yaml::Value>,
}

impl ExamRecord {
    /// Lowercased status, defaulting to [`DEFAULT_STATUS`].
    pub fn status(&self) -> String {
        self.status
            .as_deref()
            .unwrap_or(DEFAULT_STATUS)
            .to_lowercase()
    }

    pub fn semester(&self) -> i64 {
        self.semester.unwrap_or(DEFAULT_SEMESTER)
    }

    pub fn ects(&self) -> f64 {
        self.ects.unwrap_or(0.0)
    }

    /// The module name, or a [`RecordError::MalformedField`] for exam `index`.
    pub fn require_module(&self, index: usize) -> Result<&str, RecordError> {
        self.module
            .as_deref()
            .ok_or_else(|| RecordError::MalformedField {
                index,
                module: "<unnamed>".into(),
                field: "module",
                reason: "is required".into(),
            })
    }
}

/// Where an exam lands after classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusCategory {
    Passed,
    /// Status `planned` or `angemeldet`.
    Registered,
    /// Still open from a semester before the current one.
    Retake,
    /// Open in the current semester.
    Current,
    /// Open in a later semester.
    Future,
    /// Any other status string; counted, never displayed.
    Unclassified(String),
}

impl StatusCategory {
    /// Classify a raw status for an exam in `semester`, given the student's
    /// `current_semester`.
    pub fn classify(status: &str, semester: i64, current_semester: i64) -> Self {
        match status.to_lowercase().as_str() {
            "passed" => StatusCategory::Passed,
            "planned" | "angemeldet" => StatusCategory::Registered,
            "open" if semester < current_semester => StatusCategory::Retake,
            "open" if semester == current_semester => StatusCategory::Current,
            "open" => StatusCategory::Future,
            other => StatusCategory::Unclassified(other.to_string()),
        }
    }

    /// Schedule bucket (1 = registered … 4 = future); `None` outside the schedule.
    pub fn sort_priority(&self) -> Option<u8> {
        match self {
            StatusCategory::Registered => Some(1),
            StatusCategory::Retake => Some(2),
            StatusCategory::Current => Some(3),
            StatusCategory::Future => Some(4),
            StatusCategory::Passed | StatusCategory::Unclassified(_) => None,
        }
    }

    /// Whether an exam in this category adds to the current workload.
    pub fn counts_toward_load(&self) -> bool {
        matches!(self, StatusCategory::Registered | StatusCategory::Current)
    }

    /// Label shown in the schedule's status column.
    pub fn label(&self) -> &str {
        match self {
            StatusCategory::Passed => "Passed",
            StatusCategory::Registered => "Registered",
            StatusCategory::Retake => "Retake",
            StatusCategory::Current => "Current",
            StatusCategory::Future => "Future",
            StatusCategory::Unclassified(raw) => raw,
        }
    }
}

impl fmt::Display for StatusCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One not-yet-passed exam in the schedule view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleEntry {
    pub status_label: String,
    pub sem: i64,
    pub module: String,
    pub ects: f64,
    /// Raw date text as entered.
    pub date: String,
    pub sort_prio: u8,
    /// Normalized key from [`crate::dates::sortable_date`].
    pub sort_date: String,
}

/// One passed exam in the transcript view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptEntry {
    pub sem: i64,
    pub module: String,
    pub ects: f64,
    /// `"Pass"` for ungraded exams, otherwise the formatted grade.
    pub grade: String,
    /// Numeric grade, `0.0` when ungraded. Only used for ordering.
    pub grade_val: f64,
}

/// The derived summary of a record file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    /// Credits earned over passed exams.
    pub total_ects: f64,
    pub passed_count: usize,
    /// Recorded grades of graded passed exams, in file order.
    pub grades: Vec<f64>,
    /// Mean of `grades`, `0.0` when there are none.
    pub avg: f64,
    pub current_sem: i64,
    /// Credits of registered and current-semester open exams.
    pub current_load: f64,
    /// Schedule, ordered by priority then date.
    pub upcoming: Vec<ScheduleEntry>,
    /// Transcript, ordered by semester then grade value.
    pub transcript: Vec<TranscriptEntry>,
    /// Exams whose status matched no known category.
    pub dropped_count: usize,
}

impl Default for DashboardStats {
    fn default() -> Self {
        Self {
            total_ects: 0.0,
            passed_count: 0,
            grades: Vec::new(),
            avg: 0.0,
            current_sem: DEFAULT_CURRENT_SEMESTER,
            current_load: 0.0,
            upcoming: Vec::new(),
            transcript: Vec::new(),
            dropped_count: 0,
        }
    }
}

/// Result of loading and aggregating a record file.
#[derive(Debug)]
pub enum Outcome {
    /// The file was read and every exam was aggregated.
    Computed(DashboardStats),
    /// The file does not exist; the stats hold a single synthetic schedule row.
    MissingSource(DashboardStats),
    /// The file exists but could not be parsed or aggregated.
    Failed {
        stats: DashboardStats,
        error: RecordError,
    },
}

impl Outcome {
    pub fn stats(&self) -> &DashboardStats {
        match self {
            Outcome::Computed(stats) | Outcome::MissingSource(stats) => stats,
            Outcome::Failed { stats, .. } => stats,
        }
    }

    pub fn into_stats(self) -> DashboardStats {
        match self {
            Outcome::Computed(stats) | Outcome::MissingSource(stats) => stats,
            Outcome::Failed { stats, .. } => stats,
        }
    }

    /// Returns `true` unless every exam was aggregated.
    pub fn is_degraded(&self) -> bool {
        !matches!(self, Outcome::Computed(_))
    }

    pub fn error(&self) -> Option<&RecordError> {
        match self {
            Outcome::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}
