//! Parameter Evaluator — candidate vs. reference statistics against spec limits.
//!
//! For every (board, unit, parameter) the evaluator derives the mean shift,
//! the SD ratio, their criteria and a unit status. Everything here resolves
//! locally: missing limits and zero spread produce undefined metrics or
//! fallback classifications, never errors.

use serde::{Deserialize, Serialize};

use crate::baseline::{ColumnStats, UnitStatistics};
use crate::domain::{BoardId, LimitTable, Parameter, UnitId, Verdict};
use crate::error::CoreError;
use crate::numeric::{defined, round_to};

/// Maximum mean shift, as a percentage of the spec window, that still passes.
pub const MEAN_SHIFT_PCT_LIMIT: f64 = 5.0;

/// Maximum candidate/reference SD ratio that still passes.
pub const SD_RATIO_LIMIT: f64 = 1.5;

const DELTA_MEAN_PLACES: u32 = 6;
const MEAN_SHIFT_PLACES: u32 = 5;
const SD_RATIO_PLACES: u32 = 6;

/// Evaluation of one parameter for one candidate unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRow {
    /// Position of the parameter in the limit table.
    pub parameter: usize,
    pub reference: ColumnStats,
    pub candidate: ColumnStats,
    pub delta_mean: f64,
    /// `None` when either spec limit is missing.
    pub mean_shift_pct: Option<f64>,
    pub mean_shift_criteria: Verdict,
    pub sd_ratio: f64,
    pub sd_ratio_criteria: Verdict,
    pub unit_status: Verdict,
}

/// `|m_c - m_r|`, 6 dp.
pub fn delta_mean(reference: ColumnStats, candidate: ColumnStats) -> f64 {
    round_to((candidate.mean - reference.mean).abs(), DELTA_MEAN_PLACES)
}

/// Mean shift as a percentage of the spec window, 5 dp. Not clamped.
pub fn mean_shift_pct(param: &Parameter, delta_mean: f64) -> Option<f64> {
    let (low, high) = param.limits()?;
    if delta_mean == 0.0 {
        return Some(0.0);
    }
    defined(round_to(
        delta_mean / (high - low) * 100.0,
        MEAN_SHIFT_PLACES,
    ))
}

/// Percentage rule when the shift is defined, sdlot fallback otherwise.
pub fn mean_shift_criteria(param: &Parameter, delta_mean: f64, shift_pct: Option<f64>) -> Verdict {
    match shift_pct {
        Some(pct) if pct <= MEAN_SHIFT_PCT_LIMIT => Verdict::Passed,
        Some(_) => Verdict::Failed,
        None => match param.shift_std_threshold {
            Some(threshold) if delta_mean <= threshold => Verdict::Passed,
            _ => Verdict::ForCheck,
        },
    }
}

/// Candidate std over reference std, 6 dp; 0 when either std is zero.
pub fn sd_ratio(reference_std: f64, candidate_std: f64) -> f64 {
    if reference_std == 0.0 || candidate_std == 0.0 {
        return 0.0;
    }
    round_to(candidate_std / reference_std, SD_RATIO_PLACES)
}

pub fn sd_ratio_criteria(ratio: f64) -> Verdict {
    if ratio <= SD_RATIO_LIMIT {
        Verdict::Passed
    } else {
        Verdict::ForCheck
    }
}

/// Passed only when both criteria pass; Failed only on a mean-shift failure.
pub fn unit_status(mean_shift: Verdict, sd_ratio: Verdict) -> Verdict {
    match (mean_shift, sd_ratio) {
        (Verdict::Passed, Verdict::Passed) => Verdict::Passed,
        (Verdict::Failed, _) => Verdict::Failed,
        _ => Verdict::ForCheck,
    }
}

/// Evaluate a single parameter from one snapshot of reference and candidate statistics.
pub fn evaluate_parameter(
    param: &Parameter,
    reference: ColumnStats,
    candidate: ColumnStats,
) -> EvaluationRow {
    let delta = delta_mean(reference, candidate);
    let shift_pct = mean_shift_pct(param, delta);
    let shift_criteria = mean_shift_criteria(param, delta, shift_pct);
    let ratio = sd_ratio(reference.std, candidate.std);
    let ratio_criteria = sd_ratio_criteria(ratio);

    EvaluationRow {
        parameter: param.index,
        reference,
        candidate,
        delta_mean: delta,
        mean_shift_pct: shift_pct,
        mean_shift_criteria: shift_criteria,
        sd_ratio: ratio,
        sd_ratio_criteria: ratio_criteria,
        unit_status: unit_status(shift_criteria, ratio_criteria),
    }
}

/// All parameter rows for one candidate unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitEvaluation {
    pub unit: UnitId,
    pub reference_table: String,
    pub candidate_table: String,
    pub rows: Vec<EvaluationRow>,
}

impl UnitEvaluation {
    pub fn statuses(&self) -> impl Iterator<Item = Verdict> + '_ {
        self.rows.iter().map(|r| r.unit_status)
    }
}

fn require_width(limits: &LimitTable, stats: &UnitStatistics) -> Result<(), CoreError> {
    if stats.len() != limits.len() {
        return Err(CoreError::ParameterCountMismatch {
            table: stats.table.clone(),
            expected: limits.len(),
            found: stats.len(),
        });
    }
    Ok(())
}

/// Evaluate candidate unit `unit` against the reference unit with the same number.
pub fn evaluate_unit(
    limits: &LimitTable,
    unit: UnitId,
    reference: &UnitStatistics,
    candidate: &UnitStatistics,
) -> Result<UnitEvaluation, CoreError> {
    require_width(limits, reference)?;
    require_width(limits, candidate)?;

    let rows = limits
        .iter()
        .zip(reference.columns.iter().zip(&candidate.columns))
        .map(|(param, (&r, &c))| evaluate_parameter(param, r, c))
        .collect();

    Ok(UnitEvaluation {
        unit,
        reference_table: reference.table.clone(),
        candidate_table: candidate.table.clone(),
        rows,
    })
}

/// How per-unit statuses combine into a board-level status per parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollupPolicy {
    /// Passed when every unit passed, otherwise For check. Failed never surfaces.
    #[default]
    Lenient,
    /// As lenient, but any Failed unit makes the board Failed.
    Strict,
}

/// Board-level status for each of `parameter_count` parameters.
pub fn rollup(
    parameter_count: usize,
    units: &[UnitEvaluation],
    policy: RollupPolicy,
) -> Vec<Verdict> {
    (0..parameter_count)
        .map(|p| {
            let statuses = || units.iter().map(move |u| u.rows[p].unit_status);
            if statuses().all(|s| s.is_passed()) {
                Verdict::Passed
            } else if policy == RollupPolicy::Strict && statuses().any(|s| s == Verdict::Failed) {
                Verdict::Failed
            } else {
                Verdict::ForCheck
            }
        })
        .collect()
}

/// Every unit evaluation for one candidate board plus the board rollup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardEvaluation {
    pub board: BoardId,
    pub units: Vec<UnitEvaluation>,
    pub board_status: Vec<Verdict>,
}

impl BoardEvaluation {
    pub fn parameter_count(&self) -> usize {
        self.board_status.len()
    }
}

/// Evaluate every unit of a board. Unit `j` of the board pairs with reference unit `j`.
pub fn evaluate_board(
    limits: &LimitTable,
    board: BoardId,
    reference: &[UnitStatistics],
    candidate: &[UnitStatistics],
    policy: RollupPolicy,
) -> Result<BoardEvaluation, CoreError> {
    if candidate.len() != reference.len() {
        return Err(CoreError::UnitCountMismatch {
            board: board.to_string(),
            expected: reference.len(),
            found: candidate.len(),
        });
    }

    let units = reference
        .iter()
        .zip(candidate)
        .enumerate()
        .map(|(j, (r, c))| evaluate_unit(limits, UnitId::from_index(j), r, c))
        .collect::<Result<Vec<_>, _>>()?;

    let board_status = rollup(limits.len(), &units, policy);
    Ok(BoardEvaluation {
        board,
        units,
        board_status,
    })
}
