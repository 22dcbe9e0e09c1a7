//! The `gradebook summary` command.

use std::path::PathBuf;

use anyhow::Result;

use gradebook_core::report::GradebookReport;

use super::{distribution_table, load_data_set, overview_table, students_table, subjects_table};
use crate::config::GradebookConfig;

pub fn execute(
    data: Option<PathBuf>,
    format: Option<String>,
    config: &GradebookConfig,
) -> Result<()> {
    let format = format.unwrap_or_else(|| config.default_format.clone());
    anyhow::ensure!(
        matches!(format.as_str(), "table" | "json"),
        "unknown summary format '{format}' (expected table or json)"
    );

    let set = load_data_set(data, config)?;
    let report = GradebookReport::from_data_set(&set);

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let dashboard = &report.dashboard;
    println!("Data set: {}", set.name);
    if !set.description.is_empty() {
        println!("{}", set.description);
    }
    println!("\n{}", overview_table(&dashboard.overall));

    println!("\nAverage by subject");
    if dashboard.subjects.is_empty() {
        println!("  (no grades)");
    } else {
        println!("{}", subjects_table(dashboard));
    }

    println!("\nGrade distribution");
    println!("{}", distribution_table(dashboard));

    println!("\nStudents");
    println!("{}", students_table(dashboard));

    Ok(())
}
