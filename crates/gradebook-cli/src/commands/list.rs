//! The `gradebook list` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use gradebook_core::report::grade_rows;

use super::load_data_set;
use crate::config::GradebookConfig;
use crate::ListTarget;

pub fn execute(what: ListTarget, data: Option<PathBuf>, config: &GradebookConfig) -> Result<()> {
    let set = load_data_set(data, config)?;
    let snapshot = &set.snapshot;

    let mut table = Table::new();
    match what {
        ListTarget::Students => {
            table.set_header(vec!["ID", "Name", "Email", "Enrollment Date"]);
            for s in snapshot.students() {
                table.add_row(vec![
                    Cell::new(&s.id),
                    Cell::new(&s.name),
                    Cell::new(&s.email),
                    Cell::new(s.enrollment_date.format("%Y-%m-%d")),
                ]);
            }
        }
        ListTarget::Exams => {
            table.set_header(vec![
                "ID",
                "Name",
                "Subject",
                "Max Score",
                "Date",
                "Duration (min)",
            ]);
            for e in snapshot.exams() {
                table.add_row(vec![
                    Cell::new(&e.id),
                    Cell::new(&e.name),
                    Cell::new(&e.subject),
                    Cell::new(e.max_score),
                    Cell::new(e.date.format("%Y-%m-%d")),
                    Cell::new(e.duration_minutes),
                ]);
            }
        }
        ListTarget::Grades => {
            table.set_header(vec![
                "ID",
                "Student",
                "Exam",
                "Subject",
                "Score",
                "Percentage",
                "Date",
            ]);
            for row in grade_rows(snapshot) {
                table.add_row(vec![
                    Cell::new(&row.grade_id),
                    Cell::new(&row.student_name),
                    Cell::new(&row.exam_name),
                    Cell::new(&row.subject),
                    Cell::new(format!("{}/{}", row.score, row.max_score)),
                    Cell::new(row.percentage_label()),
                    Cell::new(row.date.format("%Y-%m-%d")),
                ]);
            }
        }
    }

    println!("{table}");
    Ok(())
}
