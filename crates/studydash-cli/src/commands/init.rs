//! The `studydash init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create studydash.toml
    if std::path::Path::new("studydash.toml").exists() {
        println!("studydash.toml already exists, skipping.");
    } else {
        std::fs::write("studydash.toml", SAMPLE_CONFIG)?;
        println!("Created studydash.toml");
    }

    // Create example record file
    let example_path = std::path::Path::new("example_db.md");
    if example_path.exists() {
        println!("example_db.md already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_RECORD)?;
        println!("Created example_db.md");
    }

    println!("\nNext steps:");
    println!("  1. Rename example_db.md to db.md and fill in your exams");
    println!("  2. Adjust required_ects in studydash.toml for your degree");
    println!("  3. Run: studydash show");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# studydash configuration

data_file = "db.md"
required_ects = 210
"#;

const EXAMPLE_RECORD: &str = r#"---
current_semester: 2
exams:
  - module: Linear Algebra
    semester: 1
    ects: 5
    status: passed
    grade: 2.3
  - module: Programming Lab
    semester: 1
    ects: 5
    status: passed
  - module: Databases
    semester: 2
    ects: 6
    status: angemeldet
    date: 15.03.2026
  - module: Computer Networks
    semester: 1
    ects: 6
    status: open
    date: "-"
  - module: Software Engineering
    semester: 2
    ects: 8
    status: open
    date: 02.07.2026
  - module: Bachelor Thesis
    semester: 6
    ects: 12
    status: open
    date: TBD
---
# Study notes

Statuses: `passed`, `open`, `planned` / `angemeldet` (registered).
Dates use DD.MM.YYYY; use `-` or `TBD` while no date is set.
"#;
