//! Portal core CLI
//!
//! Developer harness: reads saved portal pages or grade snapshots from disk
//! and prints the extracted records as JSON.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use portal_core::{
    error::{AppError, Result},
    models::{Config, SubjectGrade, TableOutcome},
    pipeline::{DiffCalculator, Simulator},
    services::{GradeParser, ScheduleParser},
};
use serde::Serialize;

/// Portal core - schedule and grade extraction
#[derive(Parser, Debug)]
#[command(
    name = "portal",
    version,
    about = "Extract schedules and grades from saved portal pages"
)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a saved schedule page
    Schedule {
        /// HTML file
        file: PathBuf,
    },

    /// Parse a saved results page
    Grades {
        /// HTML file
        file: PathBuf,
    },

    /// Parse a saved results page and simulate every subject
    Simulate {
        /// HTML file
        file: PathBuf,
    },

    /// Compare two grade snapshots (JSON output of `grades`)
    Diff {
        old: PathBuf,
        new: PathBuf,

        /// Also report values that disappeared
        #[arg(long)]
        retractions: bool,
    },

    /// Validate the configuration
    Validate,
}

#[derive(Serialize)]
struct SubjectReport<'a> {
    subject: &'a str,
    absence_status: portal_core::models::AbsenceStatus,
    verdict: portal_core::models::SimulationVerdict,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn load_config(path: Option<&Path>) -> Config {
    match path {
        Some(path) => {
            let config = Config::load_or_default(path);
            log::info!("Loaded configuration from {}", path.display());
            config
        }
        None => Config::default(),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_grades(parser: &GradeParser, file: &Path) -> Result<Vec<SubjectGrade>> {
    let html = fs::read_to_string(file)?;
    match parser.parse(&html) {
        TableOutcome::Parsed(grades) => {
            log::info!("Parsed {} subjects from {}", grades.len(), file.display());
            Ok(grades)
        }
        TableOutcome::Missing => Err(AppError::validation(format!(
            "No results table in {}",
            file.display()
        ))),
    }
}

fn read_snapshot(file: &Path) -> Result<Vec<SubjectGrade>> {
    let content = fs::read_to_string(file)?;
    Ok(serde_json::from_str(&content)?)
}

/// Main entry point for the CLI application.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(cli.config.as_deref());

    match cli.command {
        Command::Schedule { file } => {
            let parser = ScheduleParser::new(&config.schedule)?;
            let schedule = parser.parse(&fs::read_to_string(&file)?);
            log::info!("Parsed {} class blocks", schedule.total_blocks());
            print_json(&schedule)?;
        }

        Command::Grades { file } => {
            let parser = GradeParser::new(&config.grades)?;
            print_json(&read_grades(&parser, &file)?)?;
        }

        Command::Simulate { file } => {
            let parser = GradeParser::new(&config.grades)?;
            let grades = read_grades(&parser, &file)?;
            let simulator = Simulator::new(config.policy);

            let reports: Vec<SubjectReport> = simulator
                .simulate_all(&grades)
                .into_iter()
                .map(|(grade, verdict)| SubjectReport {
                    subject: &grade.subject,
                    absence_status: grade.absence_status(simulator.policy()),
                    verdict,
                })
                .collect();
            print_json(&reports)?;
        }

        Command::Diff {
            old,
            new,
            retractions,
        } => {
            let calculator = if retractions {
                DiffCalculator::with_retractions()
            } else {
                DiffCalculator::new()
            };
            let deltas = calculator.calculate(&read_snapshot(&old)?, &read_snapshot(&new)?);

            for delta in &deltas {
                for change in &delta.changes {
                    log::info!("{}: {}", delta.subject, change);
                }
            }
            if deltas.is_empty() {
                log::info!("No changes");
            }
            print_json(&deltas)?;
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            ScheduleParser::new(&config.schedule)?;
            GradeParser::new(&config.grades)?;

            log::info!("✓ Config OK (layouts build and policy is consistent)");
        }
    }

    Ok(())
}
