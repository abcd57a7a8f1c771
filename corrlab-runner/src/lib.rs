//! CorrLab Runner — configuration, file ingestion, pipeline and export.
//!
//! This crate builds on `corrlab-core` to provide:
//! - TOML report configuration with validation
//! - CSV ingestion of limit tables and tester exports
//! - The report pipeline (optionally parallel across boards)
//! - CSV / JSON / Markdown artifact export

pub mod config;
pub mod export;
pub mod loader;
pub mod pipeline;

pub use config::{
    BoardInputs, ConfigError, EvaluationSettings, InputsConfig, OutputConfig, ProductInfo,
    ReportConfig, SetupInfo, TEMPLATE,
};
pub use export::{generate_report, report_dir_name, save_report, write_report_files, Manifest};
pub use loader::{load_inputs, read_raw_table, LoadError, ReportInputs};
pub use pipeline::{prepare_inputs, run_pipeline, run_report, PreparedInputs, RunError};
