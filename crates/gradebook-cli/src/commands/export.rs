//! The `gradebook export` command.

use std::path::PathBuf;

use anyhow::Result;

use gradebook_core::report::GradebookReport;
use gradebook_report::{export, ExportFormat};

use super::load_data_set;
use crate::config::GradebookConfig;

pub fn execute(
    data: Option<PathBuf>,
    output: Option<PathBuf>,
    format: String,
    config: &GradebookConfig,
) -> Result<()> {
    let format: ExportFormat = format.parse()?;
    let output = output.unwrap_or_else(|| config.output_dir.clone());

    let set = load_data_set(data, config)?;
    let report = GradebookReport::from_data_set(&set);

    let written = export(&report, &set.snapshot, &output, format)?;
    for path in &written {
        println!("Wrote {}", path.display());
    }
    println!("{} file(s) exported to {}", written.len(), output.display());

    Ok(())
}
