//! gradebook CLI, the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "gradebook", version, about = "Exam dashboard and gradebook")]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show overview statistics, subject averages and the grade distribution
    Summary {
        /// Path to the .toml data set
        #[arg(long)]
        data: Option<PathBuf>,

        /// Output format: table, json
        #[arg(long)]
        format: Option<String>,
    },

    /// List students, exams or grades
    List {
        /// What to list
        #[arg(value_enum)]
        what: ListTarget,

        /// Path to the .toml data set
        #[arg(long)]
        data: Option<PathBuf>,
    },

    /// Export the data set and its dashboard
    Export {
        /// Path to the .toml data set
        #[arg(long)]
        data: Option<PathBuf>,

        /// Output directory
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: csv, html, json, all
        #[arg(long, default_value = "all")]
        format: String,
    },

    /// Validate data set TOML files
    Validate {
        /// Path to a data set file or directory
        #[arg(long)]
        data: Option<PathBuf>,
    },

    /// Preview removing a student and all of their grades
    RemoveStudent {
        /// Path to the .toml data set
        #[arg(long)]
        data: Option<PathBuf>,

        /// Student identifier
        #[arg(long)]
        id: String,
    },

    /// Create starter config and sample data set
    Init,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ListTarget {
    Students,
    Exams,
    Grades,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("gradebook=info")),
        )
        .init();

    let cli = Cli::parse();

    let load_config = || config::load_config_from(cli.config.as_deref());

    let result = match cli.command {
        Commands::Summary { data, format } => {
            load_config().and_then(|config| commands::summary::execute(data, format, &config))
        }
        Commands::List { what, data } => {
            load_config().and_then(|config| commands::list::execute(what, data, &config))
        }
        Commands::Export {
            data,
            output,
            format,
        } => load_config()
            .and_then(|config| commands::export::execute(data, output, format, &config)),
        Commands::Validate { data } => {
            load_config().and_then(|config| commands::validate::execute(data, &config))
        }
        Commands::RemoveStudent { data, id } => load_config()
            .and_then(|config| commands::remove_student::execute(data, id, &config)),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
