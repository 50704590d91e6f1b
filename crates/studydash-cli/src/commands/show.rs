//! The `studydash show` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Color, Table};
use serde::Serialize;

use studydash_core::config::{load_config, load_config_from};
use studydash_core::engine::load_dashboard;
use studydash_core::model::{DashboardStats, Outcome};
use studydash_core::statistics::{degree_progress, format_ects, DegreeProgress};

const BAR_WIDTH: usize = 40;

pub fn execute(file: Option<PathBuf>, config: Option<PathBuf>, format: String) -> Result<()> {
    let config = match config {
        Some(path) => load_config_from(Some(&path))?,
        None => load_config()?,
    };
    let data_file = file.unwrap_or(config.data_file);

    tracing::debug!("reading record file {}", data_file.display());
    let outcome = load_dashboard(&data_file);
    let progress = degree_progress(outcome.stats().total_ects, config.required_ects);

    match format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&JsonDashboard::new(&outcome, progress))?);
        }
        "table" => {
            if let Some(error) = outcome.error() {
                eprintln!("Error reading file: {error}");
            }
            print_dashboard(outcome.stats(), &progress);
        }
        other => anyhow::bail!("unknown format: {other} (expected table or json)"),
    }

    Ok(())
}

#[derive(Serialize)]
struct JsonDashboard<'a> {
    outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(flatten)]
    stats: &'a DashboardStats,
    progress: DegreeProgress,
}

impl<'a> JsonDashboard<'a> {
    fn new(outcome: &'a Outcome, progress: DegreeProgress) -> Self {
        let label = match outcome {
            Outcome::Computed(_) => "computed",
            Outcome::MissingSource(_) => "missing_source",
            Outcome::Failed { .. } => "failed",
        };
        Self {
            outcome: label,
            error: outcome.error().map(|e| e.to_string()),
            stats: outcome.stats(),
            progress,
        }
    }
}

fn print_dashboard(stats: &DashboardStats, progress: &DegreeProgress) {
    println!(
        "Semester {}  |  Current Load: {} ECTS",
        stats.current_sem,
        format_ects(stats.current_load)
    );
    println!(
        "Degree Progress: {}%  ({} / {} ECTS)",
        progress.whole_percent,
        format_ects(progress.earned),
        format_ects(progress.required)
    );
    println!("{}", progress_bar(progress));

    let mut summary = Table::new();
    summary.set_header(vec!["ECTS Collected", "Avg Grade", "Passed Exams"]);
    summary.add_row(vec![
        Cell::new(format_ects(stats.total_ects)).fg(Color::Green),
        Cell::new(format!("{:.2}", stats.avg)).fg(Color::Magenta),
        Cell::new(stats.passed_count).fg(Color::Cyan),
    ]);
    println!("\n{summary}");

    println!("\nExam Schedule (Sorted by Priority & Date)");
    let mut plan = Table::new();
    plan.set_header(vec!["Status", "Sem", "Module", "ECTS", "Date"]);
    for item in &stats.upcoming {
        plan.add_row(vec![
            status_cell(&item.status_label),
            Cell::new(item.sem),
            Cell::new(&item.module),
            Cell::new(format_ects(item.ects)),
            Cell::new(&item.date),
        ]);
    }
    println!("{plan}");

    println!("\nTranscript / Passed Modules");
    let mut done = Table::new();
    done.set_header(vec!["Sem", "Grade", "Module", "ECTS"]);
    for item in &stats.transcript {
        done.add_row(vec![
            Cell::new(item.sem),
            Cell::new(&item.grade),
            Cell::new(&item.module),
            Cell::new(format_ects(item.ects)),
        ]);
    }
    println!("{done}");

    if stats.dropped_count > 0 {
        println!(
            "\n{} exam(s) with an unrecognized status were not shown.",
            stats.dropped_count
        );
    }
}

fn status_cell(label: &str) -> Cell {
    let cell = Cell::new(label);
    match label {
        "Registered" => cell.fg(Color::Green),
        "Retake" | "Error" => cell.fg(Color::Red),
        "Current" => cell.fg(Color::Blue),
        _ => cell,
    }
}

fn progress_bar(progress: &DegreeProgress) -> String {
    let filled = (progress.fill_ratio() * BAR_WIDTH as f64).round() as usize;
    format!(
        "[{}{}]",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH.saturating_sub(filled))
    )
}
