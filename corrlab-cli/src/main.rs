//! CorrLab CLI — generate and validate correlation/Cpk reports.
//!
//! Commands:
//! - `run` — load a report config, evaluate every board, write the artifact set
//! - `validate` — load and align all inputs without writing anything
//! - `template` — print an annotated starter config

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use corrlab_core::CorrelationReport;
use corrlab_runner::{load_inputs, prepare_inputs, run_report, save_report, ReportConfig, TEMPLATE};

#[derive(Parser)]
#[command(
    name = "corrlab",
    about = "CorrLab CLI — tester board correlation and Cpk reports"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a report from a TOML config file.
    Run {
        /// Path to the report config.
        #[arg(long)]
        config: PathBuf,

        /// Output directory. Defaults to `[output] dir` from the config.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Evaluate boards on a single thread.
        #[arg(long, default_value_t = false)]
        sequential: bool,
    },
    /// Load every input and check it against the limit table; writes nothing.
    Validate {
        /// Path to the report config.
        #[arg(long)]
        config: PathBuf,
    },
    /// Print an annotated config template to stdout.
    Template,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            output_dir,
            sequential,
        } => run_cmd(config, output_dir, sequential),
        Commands::Validate { config } => validate_cmd(config),
        Commands::Template => {
            print!("{TEMPLATE}");
            Ok(())
        }
    }
}

fn load_config(path: &Path) -> Result<ReportConfig> {
    ReportConfig::from_file(path).with_context(|| format!("invalid config: {}", path.display()))
}

fn run_cmd(config_path: PathBuf, output_dir: Option<PathBuf>, sequential: bool) -> Result<()> {
    let mut config = load_config(&config_path)?;
    if sequential {
        config.evaluation.parallel = false;
    }

    let report = run_report(&config)?;
    print_summary(&report);

    let output_dir = output_dir.unwrap_or_else(|| config.output_dir());
    let run_dir = save_report(&report, &config, &output_dir)?;
    info!(dir = %run_dir.display(), "report written");
    println!("Report saved to: {}", run_dir.display());

    Ok(())
}

fn validate_cmd(config_path: PathBuf) -> Result<()> {
    let config = load_config(&config_path)?;
    let inputs = load_inputs(&config)?;
    let prepared = prepare_inputs(&inputs, &config.evaluation)?;

    println!("Config:      {}", config_path.display());
    println!("Parameters:  {}", prepared.limits.len());
    println!("Ref units:   {}", prepared.reference.len());
    println!("Boards:      {}", prepared.boards.len());
    if prepared.warnings.is_empty() {
        println!("Alignment:   ok");
    } else {
        println!("Alignment:   {} warning(s)", prepared.warnings.len());
        for w in &prepared.warnings {
            println!(
                "WARNING: {} parameter #{} is '{}', limit table has '{}'",
                w.table, w.position, w.found, w.expected
            );
        }
    }
    Ok(())
}

fn print_summary(report: &CorrelationReport) {
    println!();
    println!("=== Correlation Report: {} ===", report.test_card_name);
    println!("Parameters:     {}", report.limits.len());
    println!("Ref units:      {}", report.reference_units.len());
    println!("Boards:         {}", report.boards.len());
    println!();
    println!(
        "{:<24} {:>7} {:>10} {:>7} {:>6}  Remarks",
        "Test Card", "Passed", "For Check", "Failed", "Total"
    );
    for s in &report.summary {
        println!(
            "{:<24} {:>7} {:>10} {:>7} {:>6}  {}",
            s.test_card,
            s.overall.passed,
            s.overall.for_check,
            s.overall.failed,
            s.total_test,
            s.remark
        );
    }
    for w in &report.alignment_warnings {
        println!(
            "WARNING: {} parameter #{} is '{}', limit table has '{}'",
            w.table, w.position, w.found, w.expected
        );
    }
    println!();
}
