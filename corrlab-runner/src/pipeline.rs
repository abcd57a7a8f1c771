//! Report pipeline — wires the engine stages together.
//!
//! Two entry points:
//! - `run_report()`: loads every file a config names, then runs. Used by the CLI.
//! - `run_pipeline()`: takes already-loaded tables, no I/O. Used by tests and benches.

use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info, warn};

use corrlab_core::{
    analyze_board, check_alignment, evaluate_board, normalize, pooled_statistics,
    unit_statistics, AlignmentWarning, BoardId, BoardReport, CoreError, CorrelationReport,
    LimitTable, PooledStatistics, RawTable, RollupPolicy, SampleTable, UnitStatistics,
};

use crate::config::{ConfigError, EvaluationSettings, ReportConfig};
use crate::loader::{load_inputs, LoadError, ReportInputs};

/// Errors from the pipeline.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("input error: {0}")]
    Load(#[from] LoadError),
    #[error("structural error: {0}")]
    Core(#[from] CoreError),
}

/// Normalized, alignment-checked inputs ready for evaluation.
#[derive(Debug, Clone)]
pub struct PreparedInputs {
    pub limits: LimitTable,
    pub reference: Vec<SampleTable>,
    pub boards: Vec<Vec<SampleTable>>,
    pub warnings: Vec<AlignmentWarning>,
}

/// Normalize every table and check it against the limit table.
///
/// Writes nothing; `corrlab validate` stops here.
pub fn prepare_inputs(
    inputs: &ReportInputs,
    settings: &EvaluationSettings,
) -> Result<PreparedInputs, RunError> {
    info!(
        boards = inputs.boards.len(),
        units = inputs.reference.len(),
        "normalizing tables"
    );
    let limits = LimitTable::from_raw(&inputs.limits)?;
    let reference = normalize_all(&inputs.reference)?;
    let boards = inputs
        .boards
        .iter()
        .map(|tables| normalize_all(tables))
        .collect::<Result<Vec<_>, _>>()?;

    let mut warnings = Vec::new();
    for table in reference.iter().chain(boards.iter().flatten()) {
        warnings.extend(check_alignment(&limits, table, settings.alignment)?);
    }
    for w in &warnings {
        warn!(
            table = %w.table,
            position = w.position,
            expected = %w.expected,
            found = %w.found,
            "parameter name does not match limit table"
        );
    }
    info!(parameters = limits.len(), "inputs aligned with limit table");

    Ok(PreparedInputs {
        limits,
        reference,
        boards,
        warnings,
    })
}

fn normalize_all(tables: &[RawTable]) -> Result<Vec<SampleTable>, CoreError> {
    tables.iter().map(normalize).collect()
}

/// Run every stage on loaded inputs.
pub fn run_pipeline(
    inputs: &ReportInputs,
    settings: &EvaluationSettings,
) -> Result<CorrelationReport, RunError> {
    let PreparedInputs {
        limits,
        reference,
        boards,
        warnings,
    } = prepare_inputs(inputs, settings)?;

    info!("computing reference statistics");
    let reference_units: Vec<UnitStatistics> = reference.iter().map(unit_statistics).collect();
    let reference_pooled = pooled_statistics(&reference)?;

    info!(parallel = settings.parallel, "evaluating boards");
    let baseline = Baseline {
        limits: &limits,
        units: &reference_units,
        pooled: &reference_pooled,
        policy: settings.board_rollup,
    };
    // Indexed collect keeps board order identical in both modes.
    let reports: Vec<BoardReport> = if settings.parallel {
        boards
            .par_iter()
            .enumerate()
            .map(|(i, tables)| baseline.evaluate(BoardId::from_index(i), tables))
            .collect::<Result<_, _>>()?
    } else {
        boards
            .iter()
            .enumerate()
            .map(|(i, tables)| baseline.evaluate(BoardId::from_index(i), tables))
            .collect::<Result<_, _>>()?
    };

    let report = CorrelationReport::assemble(
        inputs.test_card_name.clone(),
        limits,
        reference_units,
        reference_pooled,
        reports,
        warnings,
    );
    info!(boards = report.boards.len(), "report assembled");
    Ok(report)
}

/// Load the configured files and run the pipeline.
pub fn run_report(config: &ReportConfig) -> Result<CorrelationReport, RunError> {
    let inputs = load_inputs(config)?;
    run_pipeline(&inputs, &config.evaluation)
}

/// Reference-side state shared read-only by every board evaluation.
struct Baseline<'a> {
    limits: &'a LimitTable,
    units: &'a [UnitStatistics],
    pooled: &'a PooledStatistics,
    policy: RollupPolicy,
}

impl Baseline<'_> {
    fn evaluate(&self, board: BoardId, tables: &[SampleTable]) -> Result<BoardReport, CoreError> {
        let units: Vec<UnitStatistics> = tables.iter().map(unit_statistics).collect();
        let pooled = pooled_statistics(tables)?;
        let evaluation = evaluate_board(self.limits, board, self.units, &units, self.policy)?;
        let capability = analyze_board(self.limits, board, self.pooled, &pooled)?;
        debug!(
            %board,
            passed = evaluation.board_status.iter().filter(|s| s.is_passed()).count(),
            parameters = evaluation.parameter_count(),
            "board evaluated"
        );
        Ok(BoardReport {
            evaluation,
            capability,
        })
    }
}
