//! The `gradebook validate` command.

use std::path::PathBuf;

use anyhow::Result;

use gradebook_core::parser;

use crate::config::GradebookConfig;

pub fn execute(data: Option<PathBuf>, config: &GradebookConfig) -> Result<()> {
    let path = data.unwrap_or_else(|| config.data_file.clone());
    let sets = if path.is_dir() {
        parser::load_gradebook_directory(&path)?
    } else {
        vec![parser::parse_gradebook(&path)?]
    };

    let mut total_warnings = 0;

    for set in &sets {
        println!(
            "Data set: {} ({} students, {} exams, {} grades)",
            set.name,
            set.snapshot.students().len(),
            set.snapshot.exams().len(),
            set.snapshot.grades().len()
        );

        let warnings = parser::validate_gradebook(&set.snapshot);
        for w in &warnings {
            let prefix = w
                .record_id
                .as_ref()
                .map(|id| format!("  [{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All data sets valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
