//! The `gradebook remove-student` command.
//!
//! Applies the cascading delete to the loaded snapshot and shows what it
//! would change. The data file is left untouched.

use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use gradebook_core::report::format_percentage;
use gradebook_core::statistics::{subject_averages, Dashboard};
use gradebook_core::{Gradebook, StudentId};

use super::load_data_set;
use crate::config::GradebookConfig;

pub fn execute(data: Option<PathBuf>, id: String, config: &GradebookConfig) -> Result<()> {
    let set = load_data_set(data, config)?;
    let mut book = Gradebook::from_snapshot(set.snapshot);
    let id = StudentId::from(id);

    let before = book.snapshot();
    let name = before
        .student(&id)
        .map(|s| s.name.clone())
        .unwrap_or_default();

    let after = book
        .delete_student(&id)
        .with_context(|| format!("cannot remove student from {}", set.name))?;

    let removed = before.grades().len() - after.grades().len();
    println!("Removed student {name} ({id}) and {removed} grade(s).");

    let old = Dashboard::compute(&before);
    let new = Dashboard::compute(&after);

    let mut table = Table::new();
    table.set_header(vec!["", "Before", "After"]);
    table.add_row(vec![
        Cell::new("Students"),
        Cell::new(old.overall.total_students),
        Cell::new(new.overall.total_students),
    ]);
    table.add_row(vec![
        Cell::new("Grades"),
        Cell::new(old.overall.total_grades),
        Cell::new(new.overall.total_grades),
    ]);
    table.add_row(vec![
        Cell::new("Average Score"),
        Cell::new(format!("{:.1}%", old.overall.average_percentage)),
        Cell::new(format!("{:.1}%", new.overall.average_percentage)),
    ]);

    // Subjects in first-seen order of the original snapshot.
    let remaining = subject_averages(after.grades());
    for subject in &old.subjects {
        let after_pct = remaining
            .iter()
            .find(|s| s.subject == subject.subject)
            .and_then(|s| s.average_percentage);
        table.add_row(vec![
            Cell::new(&subject.subject),
            Cell::new(format_percentage(subject.average_percentage)),
            Cell::new(format_percentage(after_pct)),
        ]);
    }

    println!("{table}");
    println!("(preview only, {} was not modified)", set.source.display());

    Ok(())
}
