//! Subcommand implementations.

pub mod export;
pub mod init;
pub mod list;
pub mod remove_student;
pub mod summary;
pub mod validate;

use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use gradebook_core::parser::{self, DataSet};
use gradebook_core::report::format_percentage;
use gradebook_core::statistics::{Dashboard, OverallStats};

use crate::config::GradebookConfig;

/// Load the data set named on the command line, or the configured default.
pub(crate) fn load_data_set(data: Option<PathBuf>, config: &GradebookConfig) -> Result<DataSet> {
    let path = data.unwrap_or_else(|| config.data_file.clone());
    parser::parse_gradebook(&path)
        .with_context(|| format!("could not load data set {}", path.display()))
}

pub(crate) fn overview_table(overall: &OverallStats) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        "Students",
        "Exams",
        "Grades",
        "Average Score",
    ]);
    table.add_row(vec![
        Cell::new(overall.total_students),
        Cell::new(overall.total_exams),
        Cell::new(overall.total_grades),
        Cell::new(format!("{:.1}%", overall.average_percentage)),
    ]);
    table
}

pub(crate) fn subjects_table(dashboard: &Dashboard) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Subject", "Grades", "Points", "Average"]);
    for s in &dashboard.subjects {
        table.add_row(vec![
            Cell::new(&s.subject),
            Cell::new(s.grade_count),
            Cell::new(format!("{}/{}", s.total_score, s.total_max_score)),
            Cell::new(format_percentage(s.average_percentage)),
        ]);
    }
    table
}

pub(crate) fn distribution_table(dashboard: &Dashboard) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Band", "Grades"]);
    for b in &dashboard.distribution.bands {
        table.add_row(vec![Cell::new(b.band), Cell::new(b.count)]);
    }
    if dashboard.distribution.undefined > 0 {
        table.add_row(vec![
            Cell::new("undefined"),
            Cell::new(dashboard.distribution.undefined),
        ]);
    }
    table
}

pub(crate) fn students_table(dashboard: &Dashboard) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Student", "Grades", "Average", "Band"]);
    for s in &dashboard.students {
        table.add_row(vec![
            Cell::new(&s.name),
            Cell::new(s.grade_count),
            Cell::new(format_percentage(s.average_percentage)),
            Cell::new(s.band().map(|b| b.to_string()).unwrap_or_else(|| "-".into())),
        ]);
    }
    table
}
