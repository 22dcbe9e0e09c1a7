//! The `gradebook init` command.

use std::path::Path;

use anyhow::{Context, Result};

use crate::config::CONFIG_FILE;

const DATA_FILE: &str = "gradebook-data.toml";

pub fn execute() -> Result<()> {
    for (path, content) in [(CONFIG_FILE, SAMPLE_CONFIG), (DATA_FILE, SAMPLE_DATA)] {
        if Path::new(path).exists() {
            println!("{path} already exists, skipping.");
        } else {
            std::fs::write(path, content).with_context(|| format!("failed to write {path}"))?;
            println!("Created {path}");
        }
    }

    println!("\nNext steps:");
    println!("  1. Edit {DATA_FILE} with your roster, exams and grades");
    println!("  2. Run: gradebook validate");
    println!("  3. Run: gradebook summary");
    println!("  4. Run: gradebook export --format all");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# gradebook configuration

# Data set used when --data is not given
data_file = "gradebook-data.toml"

# Export directory used when --output is not given
output_dir = "./gradebook-export"

# Summary output: table or json
default_format = "table"
"#;

const SAMPLE_DATA: &str = include_str!("../../../../data/sample-gradebook.toml");
