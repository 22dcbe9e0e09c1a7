//! CSV workbook export: one file per sheet.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use gradebook_core::report::grade_rows;
use gradebook_core::store::Snapshot;

pub const STUDENTS_FILE: &str = "students.csv";
pub const GRADES_FILE: &str = "grades.csv";
pub const EXAMS_FILE: &str = "exams.csv";

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Serialize)]
struct StudentRecord<'a> {
    #[serde(rename = "Name")]
    name: &'a str,
    #[serde(rename = "Email")]
    email: &'a str,
    #[serde(rename = "Enrollment Date")]
    enrollment_date: String,
}

#[derive(Serialize)]
struct GradeRecord {
    #[serde(rename = "Student")]
    student: String,
    #[serde(rename = "Exam")]
    exam: String,
    #[serde(rename = "Subject")]
    subject: String,
    #[serde(rename = "Score")]
    score: f64,
    #[serde(rename = "Max Score")]
    max_score: f64,
    #[serde(rename = "Percentage")]
    percentage: String,
    #[serde(rename = "Date")]
    date: String,
}

#[derive(Serialize)]
struct ExamRecord<'a> {
    #[serde(rename = "Name")]
    name: &'a str,
    #[serde(rename = "Subject")]
    subject: &'a str,
    #[serde(rename = "Max Score")]
    max_score: f64,
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Duration (min)")]
    duration: u32,
}

/// Render the students sheet.
pub fn students_csv(snapshot: &Snapshot) -> Result<String> {
    let records = snapshot.students().iter().map(|s| StudentRecord {
        name: &s.name,
        email: &s.email,
        enrollment_date: s.enrollment_date.format(DATE_FORMAT).to_string(),
    });
    render(&["Name", "Email", "Enrollment Date"], records)
}

/// Render the grades sheet. Grades whose student is missing show as "Unknown".
pub fn grades_csv(snapshot: &Snapshot) -> Result<String> {
    let records = grade_rows(snapshot).into_iter().map(|row| GradeRecord {
        percentage: row.percentage_label(),
        date: row.date.format(DATE_FORMAT).to_string(),
        student: row.student_name,
        exam: row.exam_name,
        subject: row.subject,
        score: row.score,
        max_score: row.max_score,
    });
    render(
        &["Student", "Exam", "Subject", "Score", "Max Score", "Percentage", "Date"],
        records,
    )
}

/// Render the exams sheet.
pub fn exams_csv(snapshot: &Snapshot) -> Result<String> {
    let records = snapshot.exams().iter().map(|e| ExamRecord {
        name: &e.name,
        subject: &e.subject,
        max_score: e.max_score,
        date: e.date.format(DATE_FORMAT).to_string(),
        duration: e.duration_minutes,
    });
    render(
        &["Name", "Subject", "Max Score", "Date", "Duration (min)"],
        records,
    )
}

/// Write all three sheets into `dir`, returning the written paths.
pub fn write_csv_export(snapshot: &Snapshot, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;

    let sheets = [
        (STUDENTS_FILE, students_csv(snapshot)?),
        (GRADES_FILE, grades_csv(snapshot)?),
        (EXAMS_FILE, exams_csv(snapshot)?),
    ];

    let mut written = Vec::with_capacity(sheets.len());
    for (file, content) in sheets {
        let path = dir.join(file);
        std::fs::write(&path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        written.push(path);
    }

    info!(dir = %dir.display(), files = written.len(), "wrote CSV export");
    Ok(written)
}

fn render<T: Serialize>(
    headers: &[&str],
    records: impl IntoIterator<Item = T>,
) -> Result<String> {
    // Headers are written by hand so that empty sheets still carry them.
    let mut writer = ::csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer
        .write_record(headers)
        .context("failed to write CSV header")?;
    for record in records {
        writer.serialize(record).context("failed to serialize CSV row")?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("failed to flush CSV writer: {e}"))?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}
