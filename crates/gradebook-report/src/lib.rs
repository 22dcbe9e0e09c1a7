//! gradebook-report: export of gradebook data and dashboards.
//!
//! Supports CSV sheets, a self-contained HTML dashboard and JSON reports.

pub mod csv;
pub mod html;

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Result;
use gradebook_core::report::GradebookReport;
use gradebook_core::store::Snapshot;

pub const HTML_FILE: &str = "dashboard.html";
pub const JSON_FILE: &str = "report.json";

/// Output formats accepted by [`export`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Html,
    Json,
    All,
}

impl FromStr for ExportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "html" => Ok(Self::Html),
            "json" => Ok(Self::Json),
            "all" => Ok(Self::All),
            other => anyhow::bail!("unknown export format '{other}' (expected csv, html, json or all)"),
        }
    }
}

/// Export `snapshot` and its `report` into `dir`, returning the files written.
pub fn export(
    report: &GradebookReport,
    snapshot: &Snapshot,
    dir: &Path,
    format: ExportFormat,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    if matches!(format, ExportFormat::Csv | ExportFormat::All) {
        written.extend(csv::write_csv_export(snapshot, dir)?);
    }
    if matches!(format, ExportFormat::Html | ExportFormat::All) {
        let path = dir.join(HTML_FILE);
        html::write_html_report(report, snapshot, &path)?;
        written.push(path);
    }
    if matches!(format, ExportFormat::Json | ExportFormat::All) {
        let path = dir.join(JSON_FILE);
        report.save_json(&path)?;
        written.push(path);
    }

    Ok(written)
}
