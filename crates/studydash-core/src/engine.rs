//! Aggregation engine.
//!
//! Folds the exam records of a parsed header into [`DashboardStats`]: each
//! exam is classified, credited, and placed in exactly one of the schedule,
//! the transcript, or the dropped count.

use std::path::Path;

use serde_yaml::Value;

use crate::dates::{display_date, sortable_date};
use crate::error::RecordError;
use crate::model::{
    DashboardStats, ExamRecord, Metadata, Outcome, ScheduleEntry, StatusCategory,
    TranscriptEntry,
};
use crate::parser::parse_record_file;

/// Display text for passed exams without a numeric grade.
pub const UNGRADED_LABEL: &str = "Pass";

/// Aggregate a parsed header.
///
/// A malformed exam aborts the whole computation; the caller gets the error,
/// never a half-built result.
pub fn compute(metadata: &Metadata) -> Result<DashboardStats, RecordError> {
    let current_sem = metadata.current_semester();
    let initial = DashboardStats {
        current_sem,
        ..DashboardStats::default()
    };

    let stats = metadata
        .exams
        .iter()
        .enumerate()
        .try_fold(initial, |stats, (index, exam)| fold_exam(stats, index, exam))?;

    Ok(finish(stats))
}

fn fold_exam(
    mut stats: DashboardStats,
    index: usize,
    exam: &ExamRecord,
) -> Result<DashboardStats, RecordError> {
    let sem = exam.semester();
    let ects = exam.ects();
    let category = StatusCategory::classify(&exam.status(), sem, stats.current_sem);

    match category {
        StatusCategory::Passed => {
            let module = exam.require_module(index)?;
            let grade = parse_grade(exam.grade.as_ref(), index, module)?;

            stats.total_ects += ects;
            stats.passed_count += 1;
            if let Some(value) = grade {
                stats.grades.push(value);
            }

            stats.transcript.push(TranscriptEntry {
                sem,
                module: module.to_string(),
                ects,
                grade: grade.map_or_else(|| UNGRADED_LABEL.to_string(), format_grade),
                grade_val: grade.unwrap_or(0.0),
            });
        }
        StatusCategory::Unclassified(ref status) => {
            tracing::debug!(
                index,
                module = exam.module.as_deref().unwrap_or("<unnamed>"),
                status = %status,
                "dropping exam with unrecognized status"
            );
            stats.dropped_count += 1;
        }
        StatusCategory::Registered
        | StatusCategory::Retake
        | StatusCategory::Current
        | StatusCategory::Future => {
            let module = exam.require_module(index)?;
            if category.counts_toward_load() {
                stats.current_load += ects;
            }

            let date = display_date(exam.date.as_ref());
            stats.upcoming.push(ScheduleEntry {
                status_label: category.label().to_string(),
                sem,
                module: module.to_string(),
                ects,
                sort_date: sortable_date(&date),
                date,
                sort_prio: category.sort_priority().unwrap_or(u8::MAX),
            });
        }
    }

    Ok(stats)
}

/// Compute the average and put both views in their display order.
fn finish(mut stats: DashboardStats) -> DashboardStats {
    stats.avg = if stats.grades.is_empty() {
        0.0
    } else {
        stats.grades.iter().sum::<f64>() / stats.grades.len() as f64
    };

    // Both sorts are stable, so exact ties keep file order.
    stats
        .upcoming
        .sort_by(|a, b| (a.sort_prio, &a.sort_date).cmp(&(b.sort_prio, &b.sort_date)));
    // Ungraded entries carry 0.0 and therefore lead their semester.
    stats
        .transcript
        .sort_by(|a, b| a.sem.cmp(&b.sem).then(a.grade_val.total_cmp(&b.grade_val)));

    tracing::debug!(
        passed = stats.passed_count,
        scheduled = stats.upcoming.len(),
        dropped = stats.dropped_count,
        "aggregated record file"
    );

    stats
}

/// Interpret a grade value. `Ok(None)` means a pass without a numeric grade.
///
/// Absent, null, zero, `false`, and empty-string grades count as ungraded.
/// `true` reads as `1.0`. Numeric strings are accepted; anything else is
/// malformed.
fn parse_grade(
    value: Option<&Value>,
    index: usize,
    module: &str,
) -> Result<Option<f64>, RecordError> {
    let malformed = |reason: String| RecordError::MalformedField {
        index,
        module: module.to_string(),
        field: "grade",
        reason,
    };

    let grade = match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => return Ok(None),
        Some(Value::Bool(true)) => 1.0,
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| malformed(format!("is not representable: {n}")))?,
        Some(Value::String(s)) if s.is_empty() => return Ok(None),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| malformed(format!("is not a number: {s:?}")))?,
        Some(other) => return Err(malformed(format!("is not a number: {other:?}"))),
    };

    if !grade.is_finite() {
        return Err(malformed(format!("is not finite: {grade}")));
    }
    if grade == 0.0 && matches!(value, Some(Value::Number(_))) {
        return Ok(None);
    }

    Ok(Some(grade))
}

/// Format a grade the way it is shown in the transcript (`2.0`, `2.3`).
pub fn format_grade(grade: f64) -> String {
    if grade.fract() == 0.0 {
        format!("{grade:.1}")
    } else {
        grade.to_string()
    }
}

/// Load a record file and aggregate it, never failing.
///
/// A missing file yields [`Outcome::MissingSource`] with one synthetic
/// schedule row; any read, parse, or record error is logged and yields
/// [`Outcome::Failed`] with default stats.
pub fn load_dashboard(path: &Path) -> Outcome {
    if !path.exists() {
        tracing::warn!("record file not found: {}", path.display());
        return Outcome::MissingSource(missing_source_stats(path));
    }

    match parse_record_file(path).and_then(|doc| compute(&doc.metadata)) {
        Ok(stats) => Outcome::Computed(stats),
        Err(error) => {
            tracing::error!("error reading file {}: {error}", path.display());
            Outcome::Failed {
                stats: DashboardStats::default(),
                error,
            }
        }
    }
}

/// Stats for an absent record file: zero totals plus a row explaining the remedy.
pub fn missing_source_stats(path: &Path) -> DashboardStats {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    DashboardStats {
        upcoming: vec![ScheduleEntry {
            status_label: "Error".into(),
            sem: 0,
            module: format!("{name} not found. Please rename example_db.md to {name}!"),
            ects: 0.0,
            date: "-".into(),
            sort_prio: 1,
            sort_date: sortable_date("-"),
        }],
        ..DashboardStats::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_record_str;

    fn exam(module: &str, semester: i64, ects: f64, status: &str) -> ExamRecord {
        ExamRecord {
            module: Some(module.into()),
            semester: Some(semester),
            ects: Some(ects),
            status: Some(status.into()),
            date: None,
            grade: None,
        }
    }

    fn dated(mut record: ExamRecord, date: &str) -> ExamRecord {
        record.date = Some(Value::String(date.into()));
        record
    }

    fn graded(mut record: ExamRecord, grade: f64) -> ExamRecord {
        record.grade = Some(Value::Number(grade.into()));
        record
    }

    fn metadata(current: i64, exams: Vec<ExamRecord>) -> Metadata {
        Metadata {
            current_semester: Some(current),
            exams,
        }
    }

    fn modules(entries: &[ScheduleEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.module.as_str()).collect()
    }

    #[test]
    fn concrete_scenario() {
        let meta = metadata(
            2,
            vec![
                graded(exam("Algebra", 1, 5.0, "passed"), 2.3),
                dated(exam("Databases", 2, 6.0, "angemeldet"), "15.03.2026"),
                dated(exam("Networks", 1, 6.0, "open"), "-"),
            ],
        );

        let stats = compute(&meta).unwrap();
        assert_eq!(stats.total_ects, 5.0);
        assert_eq!(stats.passed_count, 1);
        assert!((stats.avg - 2.3).abs() < 1e-9);
        assert_eq!(stats.current_sem, 2);
        assert_eq!(stats.current_load, 6.0);
        assert_eq!(modules(&stats.upcoming), vec!["Databases", "Networks"]);
        assert_eq!(stats.upcoming[0].sort_prio, 1);
        assert_eq!(stats.upcoming[0].status_label, "Registered");
        assert_eq!(stats.upcoming[0].sort_date, "2026-03-15");
        assert_eq!(stats.upcoming[1].sort_prio, 2);
        assert_eq!(stats.upcoming[1].status_label, "Retake");
        assert_eq!(stats.transcript.len(), 1);
        assert_eq!(stats.transcript[0].module, "Algebra");
        assert_eq!(stats.transcript[0].grade, "2.3");
    }

    #[test]
    fn totals_count_passed_exams_only() {
        let meta = metadata(
            3,
            vec![
                exam("A", 1, 5.0, "passed"),
                exam("B", 2, 7.5, "Passed"),
                exam("C", 3, 10.0, "open"),
                exam("D", 3, 4.0, "planned"),
            ],
        );
        let stats = compute(&meta).unwrap();
        assert_eq!(stats.total_ects, 12.5);
        assert_eq!(stats.passed_count, 2);
    }

    #[test]
    fn load_counts_registered_and_current_only() {
        let meta = metadata(
            3,
            vec![
                exam("registered", 1, 1.0, "planned"),
                exam("retake", 2, 10.0, "open"),
                exam("current", 3, 100.0, "open"),
                exam("future", 4, 1000.0, "open"),
            ],
        );
        let stats = compute(&meta).unwrap();
        assert_eq!(stats.current_load, 101.0);
    }

    #[test]
    fn average_ignores_ungraded_passes() {
        let meta = metadata(
            2,
            vec![
                graded(exam("A", 1, 5.0, "passed"), 1.7),
                exam("B", 1, 5.0, "passed"),
                graded(exam("C", 1, 5.0, "passed"), 2.3),
            ],
        );
        let stats = compute(&meta).unwrap();
        assert_eq!(stats.grades, vec![1.7, 2.3]);
        assert!((stats.avg - 2.0).abs() < 1e-9);
        assert_eq!(stats.passed_count, 3);
    }

    #[test]
    fn average_is_zero_without_grades() {
        let meta = metadata(1, vec![exam("A", 1, 5.0, "passed")]);
        let stats = compute(&meta).unwrap();
        assert_eq!(stats.avg, 0.0);
        assert_eq!(stats.transcript[0].grade, UNGRADED_LABEL);
        assert_eq!(stats.transcript[0].grade_val, 0.0);
    }

    #[test]
    fn every_exam_lands_in_exactly_one_place() {
        let meta = metadata(
            2,
            vec![
                exam("A", 1, 5.0, "passed"),
                exam("B", 2, 5.0, "open"),
                exam("C", 2, 5.0, "failed"),
                exam("D", 2, 5.0, "withdrawn"),
                exam("E", 3, 5.0, "angemeldet"),
            ],
        );
        let stats = compute(&meta).unwrap();
        assert_eq!(stats.transcript.len(), 1);
        assert_eq!(stats.upcoming.len(), 2);
        assert_eq!(stats.dropped_count, 2);
        assert_eq!(
            stats.transcript.len() + stats.upcoming.len() + stats.dropped_count,
            meta.exams.len()
        );
    }

    #[test]
    fn unrecognized_status_without_module_is_dropped() {
        let meta = metadata(
            1,
            vec![ExamRecord {
                status: Some("cancelled".into()),
                ..Default::default()
            }],
        );
        let stats = compute(&meta).unwrap();
        assert_eq!(stats.dropped_count, 1);
    }

    #[test]
    fn schedule_orders_by_priority_then_date() {
        let meta = metadata(
            2,
            vec![
                dated(exam("current-late", 2, 5.0, "open"), "20.07.2026"),
                dated(exam("registered", 4, 5.0, "planned"), "01.09.2026"),
                dated(exam("retake", 1, 5.0, "open"), "TBD"),
                dated(exam("future", 3, 5.0, "open"), "01.01.2026"),
                dated(exam("current-early", 2, 5.0, "open"), "02.02.2026"),
                exam("current-undated", 2, 5.0, "open"),
            ],
        );
        let stats = compute(&meta).unwrap();
        assert_eq!(
            modules(&stats.upcoming),
            vec![
                "registered",
                "retake",
                "current-early",
                "current-late",
                "current-undated",
                "future"
            ]
        );
        let prios: Vec<u8> = stats.upcoming.iter().map(|e| e.sort_prio).collect();
        assert_eq!(prios, vec![1, 2, 3, 3, 3, 4]);
    }

    #[test]
    fn schedule_ties_keep_file_order() {
        let meta = metadata(
            1,
            vec![
                dated(exam("first", 1, 5.0, "open"), "01.02.2026"),
                dated(exam("second", 1, 5.0, "open"), "01.02.2026"),
                exam("third", 1, 5.0, "open"),
                exam("fourth", 1, 5.0, "open"),
            ],
        );
        let stats = compute(&meta).unwrap();
        assert_eq!(
            modules(&stats.upcoming),
            vec!["first", "second", "third", "fourth"]
        );
    }

    #[test]
    fn absent_date_displays_dash_and_sorts_last() {
        let meta = metadata(1, vec![exam("Physics", 1, 5.0, "open")]);
        let stats = compute(&meta).unwrap();
        assert_eq!(stats.upcoming[0].date, "-");
        assert_eq!(stats.upcoming[0].sort_date, "9999-99-99");
    }

    #[test]
    fn transcript_orders_by_semester_then_grade() {
        let meta = metadata(
            3,
            vec![
                graded(exam("s2-good", 2, 5.0, "passed"), 1.3),
                graded(exam("s1-bad", 1, 5.0, "passed"), 3.7),
                graded(exam("s1-good", 1, 5.0, "passed"), 1.0),
                exam("s1-pass", 1, 5.0, "passed"),
            ],
        );
        let stats = compute(&meta).unwrap();
        let order: Vec<&str> = stats.transcript.iter().map(|e| e.module.as_str()).collect();
        // Ungraded passes (0.0) lead their semester, ahead of the best grade.
        assert_eq!(order, vec!["s1-pass", "s1-good", "s1-bad", "s2-good"]);
    }

    #[test]
    fn grade_formats_like_a_float() {
        assert_eq!(format_grade(2.0), "2.0");
        assert_eq!(format_grade(2.3), "2.3");
        assert_eq!(format_grade(1.75), "1.75");
    }

    #[test]
    fn grade_from_numeric_string() {
        let mut record = exam("Algebra", 1, 5.0, "passed");
        record.grade = Some(Value::String(" 1.7 ".into()));
        let stats = compute(&metadata(1, vec![record])).unwrap();
        assert_eq!(stats.grades, vec![1.7]);
    }

    #[test]
    fn zero_and_empty_grades_are_ungraded() {
        let mut zero = exam("Zero", 1, 5.0, "passed");
        zero.grade = Some(Value::Number(0i64.into()));
        let mut empty = exam("Empty", 1, 5.0, "passed");
        empty.grade = Some(Value::String(String::new()));

        let stats = compute(&metadata(1, vec![zero, empty])).unwrap();
        assert!(stats.grades.is_empty());
        assert!(stats.transcript.iter().all(|e| e.grade == UNGRADED_LABEL));
    }

    #[test]
    fn boolean_grades_follow_truthiness() {
        let mut unset = exam("Unset", 1, 5.0, "passed");
        unset.grade = Some(Value::Bool(false));
        let mut set = exam("Set", 1, 5.0, "passed");
        set.grade = Some(Value::Bool(true));

        let stats = compute(&metadata(1, vec![unset, set])).unwrap();
        assert_eq!(stats.passed_count, 2);
        assert_eq!(stats.grades, vec![1.0]);
        assert_eq!(stats.transcript[0].module, "Unset");
        assert_eq!(stats.transcript[0].grade, UNGRADED_LABEL);
        assert_eq!(stats.transcript[1].grade, "1.0");
    }

    #[test]
    fn boolean_grade_in_record_file_is_not_fatal() {
        let doc = parse_record_str(
            "---\nexams:\n  - module: Seminar\n    status: passed\n    grade: false\n---\n",
        )
        .unwrap();
        let stats = compute(&doc.metadata).unwrap();
        assert_eq!(stats.transcript[0].grade, UNGRADED_LABEL);
        assert!(stats.grades.is_empty());
    }

    #[test]
    fn non_numeric_grade_aborts_computation() {
        let mut record = exam("Algebra", 1, 5.0, "passed");
        record.grade = Some(Value::String("A+".into()));
        let meta = metadata(1, vec![exam("Physics", 1, 5.0, "passed"), record]);

        let err = compute(&meta).unwrap_err();
        assert!(matches!(
            err,
            RecordError::MalformedField {
                index: 1,
                field: "grade",
                ..
            }
        ));
    }

    #[test]
    fn missing_module_on_open_exam_aborts_computation() {
        let meta = metadata(
            1,
            vec![ExamRecord {
                status: Some("open".into()),
                ..Default::default()
            }],
        );
        let err = compute(&meta).unwrap_err();
        assert!(matches!(err, RecordError::MalformedField { field: "module", .. }));
    }

    #[test]
    fn defaults_apply_to_sparse_records() {
        let doc = parse_record_str("---\nexams:\n  - module: Thesis\n---\n").unwrap();
        let stats = compute(&doc.metadata).unwrap();
        assert_eq!(stats.current_sem, 1);
        let entry = &stats.upcoming[0];
        assert_eq!(entry.sem, 99);
        assert_eq!(entry.ects, 0.0);
        assert_eq!(entry.status_label, "Future");
        assert_eq!(entry.sort_prio, 4);
    }

    #[test]
    fn missing_file_yields_synthetic_row() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = load_dashboard(&dir.path().join("db.md"));
        assert!(matches!(outcome, Outcome::MissingSource(_)));
        assert!(outcome.is_degraded());

        let stats = outcome.stats();
        assert_eq!(stats.upcoming.len(), 1);
        let row = &stats.upcoming[0];
        assert_eq!(row.sort_prio, 1);
        assert_eq!(row.sem, 0);
        assert_eq!(row.ects, 0.0);
        assert_eq!(row.date, "-");
        assert!(row.module.contains("db.md not found"));
        assert_eq!(stats.total_ects, 0.0);
        assert_eq!(stats.passed_count, 0);
        assert_eq!(stats.avg, 0.0);
        assert_eq!(stats.current_load, 0.0);
        // The semester keeps its metadata default rather than zero.
        assert_eq!(stats.current_sem, 1);
        assert!(stats.transcript.is_empty());
    }

    #[test]
    fn malformed_file_yields_failed_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.md");
        std::fs::write(
            &path,
            "---\nexams:\n  - module: Algebra\n    status: passed\n    grade: excellent\n---\n",
        )
        .unwrap();

        let outcome = load_dashboard(&path);
        assert!(outcome.is_degraded());
        assert!(outcome.error().is_some_and(RecordError::is_record_level));
        let stats = outcome.into_stats();
        assert_eq!(stats, DashboardStats::default());
    }

    #[test]
    fn broken_yaml_yields_failed_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.md");
        std::fs::write(&path, "---\nexams: [\n---\n").unwrap();

        let outcome = load_dashboard(&path);
        assert!(matches!(
            outcome,
            Outcome::Failed {
                error: RecordError::Syntax(_),
                ..
            }
        ));
    }

    #[test]
    fn well_formed_file_is_computed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.md");
        std::fs::write(
            &path,
            "---\ncurrent_semester: 2\nexams:\n  - module: Algebra\n    semester: 1\n    ects: 5\n    status: passed\n    grade: 2.3\n---\n",
        )
        .unwrap();

        let outcome = load_dashboard(&path);
        assert!(!outcome.is_degraded());
        assert_eq!(outcome.stats().total_ects, 5.0);
        assert_eq!(outcome.stats().current_sem, 2);
    }
}
