//! HTML dashboard generator.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use anyhow::Result;
use std::path::Path;

use gradebook_core::report::{format_percentage, grade_rows, GradebookReport};
use gradebook_core::statistics::{GradeBand, GradeDistribution, SubjectAverage};
use gradebook_core::store::Snapshot;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// CSS class used to colour a percentage.
fn band_class(band: Option<GradeBand>) -> &'static str {
    match band {
        Some(GradeBand::A) => "band-a",
        Some(GradeBand::B) => "band-b",
        Some(GradeBand::C) => "band-c",
        Some(_) => "band-low",
        None => "band-none",
    }
}

/// Generate an HTML dashboard from a report and the snapshot it was computed from.
pub fn generate_html(report: &GradebookReport, snapshot: &Snapshot) -> String {
    let dashboard = &report.dashboard;
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>Gradebook - {}</title>\n",
        html_escape(&report.data_set.name)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str("<h1>Exam Dashboard &amp; Gradebook</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">Data set: <strong>{}</strong> | generated {}</p>\n",
        html_escape(&report.data_set.name),
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    // Overview cards
    let overall = &dashboard.overall;
    html.push_str("<section class=\"cards\">\n");
    for (label, value) in [
        ("Total Students", overall.total_students.to_string()),
        ("Total Exams", overall.total_exams.to_string()),
        ("Total Grades", overall.total_grades.to_string()),
        ("Average Score", format!("{:.1}%", overall.average_percentage)),
    ] {
        html.push_str(&format!(
            "<div class=\"card\"><span class=\"label\">{label}</span><span class=\"value\">{value}</span></div>\n"
        ));
    }
    html.push_str("</section>\n");

    // Subject averages
    html.push_str("<section class=\"subjects\">\n");
    html.push_str("<h2>Average by Subject</h2>\n");
    if dashboard.subjects.is_empty() {
        html.push_str("<p class=\"meta\">No grades recorded.</p>\n");
    } else {
        html.push_str(&generate_bar_chart(&dashboard.subjects));
    }
    html.push_str("</section>\n");

    // Distribution
    html.push_str("<section class=\"distribution\">\n");
    html.push_str("<h2>Grade Distribution</h2>\n");
    html.push_str(&generate_distribution_table(&dashboard.distribution));
    html.push_str("</section>\n");

    // Student performance
    html.push_str("<section class=\"students\">\n");
    html.push_str("<h2>Students</h2>\n");
    html.push_str("<table class=\"results-table\" id=\"students\">\n");
    html.push_str("<thead><tr><th onclick=\"sortTable('students', 0)\">Name</th><th onclick=\"sortTable('students', 1)\">Grades</th><th onclick=\"sortTable('students', 2)\">Average</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    for s in &dashboard.students {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td class=\"{}\">{}</td></tr>\n",
            html_escape(&s.name),
            s.grade_count,
            band_class(s.band()),
            format_percentage(s.average_percentage),
        ));
    }
    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Grades
    html.push_str("<section class=\"grades\">\n");
    html.push_str("<h2>Grades</h2>\n");
    html.push_str("<table class=\"results-table\" id=\"grades\">\n");
    html.push_str("<thead><tr><th onclick=\"sortTable('grades', 0)\">Student</th><th onclick=\"sortTable('grades', 1)\">Exam</th><th onclick=\"sortTable('grades', 2)\">Subject</th><th onclick=\"sortTable('grades', 3)\">Score</th><th onclick=\"sortTable('grades', 4)\">Percentage</th><th onclick=\"sortTable('grades', 5)\">Date</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    for row in grade_rows(snapshot) {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}/{}</td><td class=\"{}\">{}</td><td>{}</td></tr>\n",
            html_escape(&row.student_name),
            html_escape(&row.exam_name),
            html_escape(&row.subject),
            row.score,
            row.max_score,
            band_class(row.band),
            row.percentage_label(),
            row.date.format("%Y-%m-%d"),
        ));
    }
    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&html_escape(
        &serde_json::to_string_pretty(report).unwrap_or_default(),
    ));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    // JavaScript for sorting
    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML dashboard to a file.
pub fn write_html_report(report: &GradebookReport, snapshot: &Snapshot, path: &Path) -> Result<()> {
    let html = generate_html(report, snapshot);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    Ok(())
}

fn generate_bar_chart(subjects: &[SubjectAverage]) -> String {
    let bar_height = 30;
    let max_width = 400;
    let padding = 10;
    let label_width = 200;

    let total_height = subjects.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 60,
        total_height
    );

    for (i, subject) in subjects.iter().enumerate() {
        let y = i * (bar_height + padding) + padding;
        let pct = subject.average_percentage.unwrap_or(0.0).clamp(0.0, 100.0);
        let width = (pct / 100.0 * max_width as f64) as usize;

        let color = if pct >= 80.0 {
            "#22c55e"
        } else if pct >= 60.0 {
            "#eab308"
        } else {
            "#ef4444"
        };

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            html_escape(&subject.subject)
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"/>\n",
            label_width, y, width, bar_height, color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{}</text>\n",
            label_width + width + 8,
            y + bar_height / 2,
            format_percentage(subject.average_percentage)
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

fn generate_distribution_table(distribution: &GradeDistribution) -> String {
    let mut html = String::from("<table class=\"summary\">\n");
    html.push_str("<thead><tr><th>Band</th><th>Grades</th></tr></thead>\n<tbody>\n");
    for b in &distribution.bands {
        html.push_str(&format!(
            "<tr><td class=\"{}\">{}</td><td>{}</td></tr>\n",
            band_class(Some(b.band)),
            html_escape(&b.band.to_string()),
            b.count
        ));
    }
    html.push_str("</tbody></table>\n");
    html
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --a: #16a34a; --b: #2563eb; --c: #ca8a04; --low: #dc2626; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #0f172a; --fg: #f8fafc; --border: #334155; --a: #4ade80; --b: #60a5fa; --c: #facc15; --low: #f87171; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
.cards { display: grid; grid-template-columns: repeat(auto-fit, minmax(180px, 1fr)); gap: 1rem; }
.card { border: 1px solid var(--border); border-radius: 12px; padding: 1rem; display: flex; flex-direction: column; }
.card .label { color: #6b7280; font-size: 0.85rem; }
.card .value { font-size: 1.8rem; font-weight: bold; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); cursor: pointer; }
.band-a { color: var(--a); font-weight: bold; }
.band-b { color: var(--b); font-weight: bold; }
.band-c { color: var(--c); font-weight: bold; }
.band-low { color: var(--low); font-weight: bold; }
.band-none { color: #6b7280; }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

const JS: &str = r#"
function sortTable(id, col) {
  const table = document.getElementById(id);
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  rows.sort((a, b) => {
    const va = a.cells[col].textContent;
    const vb = b.cells[col].textContent;
    return asc ? va.localeCompare(vb, undefined, { numeric: true }) : vb.localeCompare(va, undefined, { numeric: true });
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;
