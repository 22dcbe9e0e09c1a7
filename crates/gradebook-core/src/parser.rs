//! TOML data set loader.
//!
//! Loads students, exams and grades from TOML files and validates them. Records
//! are replayed through the store operations in file order, so a data file can
//! never produce a snapshot the store itself would refuse.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::model::{Exam, ExamId, Grade, GradeId, Student};
use crate::store::Snapshot;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A named data set loaded from disk.
#[derive(Debug, Clone)]
pub struct DataSet {
    pub name: String,
    pub description: String,
    /// File the data set was read from.
    pub source: PathBuf,
    pub snapshot: Snapshot,
}

/// Intermediate TOML structure for parsing data set files.
#[derive(Debug, Deserialize)]
struct TomlGradebookFile {
    gradebook: TomlGradebookHeader,
    #[serde(default)]
    students: Vec<TomlStudent>,
    #[serde(default)]
    exams: Vec<TomlExam>,
    #[serde(default)]
    grades: Vec<TomlGrade>,
}

#[derive(Debug, Deserialize)]
struct TomlGradebookHeader {
    name: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct TomlStudent {
    id: String,
    name: String,
    #[serde(default)]
    email: String,
    enrollment_date: String,
}

#[derive(Debug, Deserialize)]
struct TomlExam {
    #[serde(default)]
    id: Option<String>,
    name: String,
    subject: String,
    max_score: f64,
    date: String,
    #[serde(default)]
    duration_minutes: u32,
}

#[derive(Debug, Deserialize)]
struct TomlGrade {
    #[serde(default)]
    id: Option<String>,
    student_id: String,
    exam_name: String,
    subject: String,
    score: f64,
    max_score: f64,
    date: String,
}

fn parse_date(value: &str, what: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .with_context(|| format!("invalid {what} `{value}`, expected YYYY-MM-DD"))
}

/// Parse a single TOML file into a [`DataSet`].
pub fn parse_gradebook(path: &Path) -> Result<DataSet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read data file: {}", path.display()))?;

    parse_gradebook_str(&content, path)
}

/// Parse a TOML string into a [`DataSet`] (useful for testing).
pub fn parse_gradebook_str(content: &str, source_path: &Path) -> Result<DataSet> {
    let parsed: TomlGradebookFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let mut snapshot = Snapshot::empty();

    for s in parsed.students {
        let enrollment_date = parse_date(&s.enrollment_date, "enrollment_date")
            .with_context(|| format!("student `{}`", s.id))?;
        let student = Student::new(s.id, s.name, s.email, enrollment_date);
        snapshot = snapshot
            .add_student(student)
            .with_context(|| format!("in {}", source_path.display()))?;
    }

    for e in parsed.exams {
        let exam = Exam {
            id: e.id.map(ExamId::from).unwrap_or_else(ExamId::generate),
            date: parse_date(&e.date, "date").with_context(|| format!("exam `{}`", e.name))?,
            name: e.name,
            subject: e.subject,
            max_score: e.max_score,
            duration_minutes: e.duration_minutes,
        };
        snapshot = snapshot
            .add_exam(exam)
            .with_context(|| format!("in {}", source_path.display()))?;
    }

    for g in parsed.grades {
        let grade = Grade {
            id: g.id.map(GradeId::from).unwrap_or_else(GradeId::generate),
            date: parse_date(&g.date, "date")
                .with_context(|| format!("grade for student `{}`", g.student_id))?,
            student_id: g.student_id.into(),
            exam_name: g.exam_name,
            subject: g.subject,
            score: g.score,
            max_score: g.max_score,
        };
        snapshot = snapshot
            .add_grade(grade)
            .with_context(|| format!("in {}", source_path.display()))?;
    }

    tracing::info!(
        source = %source_path.display(),
        students = snapshot.students().len(),
        exams = snapshot.exams().len(),
        grades = snapshot.grades().len(),
        "data set loaded"
    );

    Ok(DataSet {
        name: parsed.gradebook.name,
        description: parsed.gradebook.description,
        source: source_path.to_path_buf(),
        snapshot,
    })
}

/// Recursively load all `.toml` data set files from a directory.
pub fn load_gradebook_directory(dir: &Path) -> Result<Vec<DataSet>> {
    let mut sets = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            sets.extend(load_gradebook_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_gradebook(&path) {
                Ok(set) => sets.push(set),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    sets.sort_by(|a, b| a.source.cmp(&b.source));
    Ok(sets)
}

/// A non-fatal issue found in a data set.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The record the warning is about (if applicable).
    pub record_id: Option<String>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn about(id: impl ToString, message: impl Into<String>) -> Self {
        Self {
            record_id: Some(id.to_string()),
            message: message.into(),
        }
    }
}

/// Check a snapshot for data that the store accepts but is probably wrong.
pub fn validate_gradebook(snapshot: &Snapshot) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    // Emails are expected to be unique
    let mut seen_emails = HashSet::new();
    for student in snapshot.students() {
        let email = student.email.trim().to_lowercase();
        if email.is_empty() {
            warnings.push(ValidationWarning::about(&student.id, "email is empty"));
        } else if !seen_emails.insert(email) {
            warnings.push(ValidationWarning::about(
                &student.id,
                format!("duplicate email: {}", student.email),
            ));
        }
    }

    let exams_by_name: HashMap<&str, &Exam> = snapshot
        .exams()
        .iter()
        .map(|e| (e.name.as_str(), e))
        .collect();

    for grade in snapshot.grades() {
        if grade.score > grade.max_score {
            warnings.push(ValidationWarning::about(
                &grade.id,
                format!(
                    "score {} exceeds max score {}",
                    grade.score, grade.max_score
                ),
            ));
        }

        match exams_by_name.get(grade.exam_name.as_str()) {
            None => warnings.push(ValidationWarning::about(
                &grade.id,
                format!("exam `{}` is not in the exam list", grade.exam_name),
            )),
            Some(exam) => {
                if exam.subject != grade.subject {
                    warnings.push(ValidationWarning::about(
                        &grade.id,
                        format!(
                            "subject `{}` differs from exam subject `{}`",
                            grade.subject, exam.subject
                        ),
                    ));
                }
                if (exam.max_score - grade.max_score).abs() > f64::EPSILON {
                    warnings.push(ValidationWarning::about(
                        &grade.id,
                        format!(
                            "max score {} differs from exam max score {}",
                            grade.max_score, exam.max_score
                        ),
                    ));
                }
            }
        }
    }

    // Exams nobody was graded on
    let graded: HashSet<&str> = snapshot
        .grades()
        .iter()
        .map(|g| g.exam_name.as_str())
        .collect();
    for exam in snapshot.exams() {
        if !graded.contains(exam.name.as_str()) {
            warnings.push(ValidationWarning::about(&exam.id, "exam has no grades"));
        }
    }

    warnings
}
