//! Dashboard report types with JSON persistence, plus the display rows the
//! presentation layer renders.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{GradeId, StudentId};
use crate::parser::DataSet;
use crate::statistics::{Dashboard, GradeBand};
use crate::store::Snapshot;

/// Name shown for a grade whose student is no longer in the store.
pub const UNKNOWN_STUDENT: &str = "Unknown";

/// A computed dashboard for one data set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradebookReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Summary of the data set the report was computed from.
    pub data_set: DataSetSummary,
    /// The computed statistics.
    pub dashboard: Dashboard,
}

/// Summary of a data set (without the records).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSetSummary {
    pub name: String,
    pub student_count: usize,
    pub exam_count: usize,
    pub grade_count: usize,
}

impl GradebookReport {
    /// Compute a report from a snapshot.
    pub fn from_snapshot(name: impl Into<String>, snapshot: &Snapshot) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            data_set: DataSetSummary {
                name: name.into(),
                student_count: snapshot.students().len(),
                exam_count: snapshot.exams().len(),
                grade_count: snapshot.grades().len(),
            },
            dashboard: Dashboard::compute(snapshot),
        }
    }

    pub fn from_data_set(set: &DataSet) -> Self {
        Self::from_snapshot(set.name.clone(), &set.snapshot)
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: GradebookReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }
}

/// One grade as shown in the grades table and the grades export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeRow {
    pub grade_id: GradeId,
    pub student_name: String,
    pub exam_name: String,
    pub subject: String,
    pub score: f64,
    pub max_score: f64,
    pub percentage: Option<f64>,
    pub band: Option<GradeBand>,
    pub date: NaiveDate,
}

impl GradeRow {
    /// Percentage with one decimal and a `%` sign, or `n/a`.
    pub fn percentage_label(&self) -> String {
        format_percentage(self.percentage)
    }
}

/// Format an optional percentage for display.
pub fn format_percentage(pct: Option<f64>) -> String {
    match pct {
        Some(p) => format!("{p:.1}%"),
        None => "n/a".to_string(),
    }
}

/// Join every grade with its student's name, in grade order.
pub fn grade_rows(snapshot: &Snapshot) -> Vec<GradeRow> {
    snapshot
        .grades()
        .iter()
        .map(|g| {
            let percentage = g.percentage();
            GradeRow {
                grade_id: g.id.clone(),
                student_name: snapshot
                    .student(&g.student_id)
                    .map(|s| s.name.clone())
                    .unwrap_or_else(|| UNKNOWN_STUDENT.to_string()),
                exam_name: g.exam_name.clone(),
                subject: g.subject.clone(),
                score: g.score,
                max_score: g.max_score,
                percentage,
                band: percentage.map(GradeBand::from_percentage),
                date: g.date,
            }
        })
        .collect()
}

/// Grade ids that point at a missing student. Empty for any snapshot built
/// through the store.
pub fn dangling_grades(snapshot: &Snapshot) -> Vec<(GradeId, StudentId)> {
    snapshot
        .grades()
        .iter()
        .filter(|g| snapshot.student(&g.student_id).is_none())
        .map(|g| (g.id.clone(), g.student_id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Grade, Student};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 20).unwrap()
    }

    fn sample() -> Snapshot {
        Snapshot::empty()
            .add_student(Student::new("4", "Diana Prince", "diana@example.com", date()))
            .unwrap()
            .add_grade(Grade {
                id: "8".into(),
                student_id: "4".into(),
                exam_name: "Final Exam".into(),
                subject: "Physics".into(),
                score: 95.0,
                max_score: 100.0,
                date: date(),
            })
            .unwrap()
    }

    #[test]
    fn grade_rows_join_student_names() {
        let rows = grade_rows(&sample());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].student_name, "Diana Prince");
        assert_eq!(rows[0].percentage_label(), "95.0%");
        assert_eq!(rows[0].band, Some(GradeBand::A));
    }

    #[test]
    fn format_missing_percentage() {
        assert_eq!(format_percentage(None), "n/a");
        assert_eq!(format_percentage(Some(54.5454)), "54.5%");
    }

    #[test]
    fn store_snapshots_have_no_dangling_grades() {
        let snap = sample();
        assert!(dangling_grades(&snap).is_empty());
        let after = snap.delete_student(&"4".into()).unwrap();
        assert!(dangling_grades(&after).is_empty());
        assert!(after.grades().is_empty());
    }

    #[test]
    fn json_roundtrip() {
        let report = GradebookReport::from_snapshot("Test", &sample());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/report.json");

        report.save_json(&path).unwrap();
        let loaded = GradebookReport::load_json(&path).unwrap();

        assert_eq!(loaded.id, report.id);
        assert_eq!(loaded.data_set.grade_count, 1);
        assert_eq!(loaded.dashboard, report.dashboard);
    }
}
