//! Capability Analyzer — Cp/Cpk from pooled statistics.
//!
//! Cp = (USL - LSL) / 6σ, two-sided only.
//! Cpk = distance from the mean to the nearer defined limit / 3σ.
//!
//! The reference dataset and every candidate board get their own,
//! independent capability view; the two are never compared.

use serde::{Deserialize, Serialize};

use crate::baseline::{ColumnStats, PooledStatistics};
use crate::domain::{BoardId, CpkDecision, LimitTable, Parameter};
use crate::error::CoreError;
use crate::numeric::{defined, round_to};

/// Minimum Cpk (inclusive) for a "Good capable" decision.
pub const CPK_CAPABLE: f64 = 1.3;

const INDEX_PLACES: u32 = 2;

/// Capability indices for one parameter of one dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapabilityIndices {
    pub cp: Option<f64>,
    pub cpk: Option<f64>,
    pub decision: CpkDecision,
}

/// Cp, 2 dp. Undefined without both limits or with zero spread.
pub fn cp(param: &Parameter, stats: ColumnStats) -> Option<f64> {
    let (low, high) = param.limits()?;
    if stats.std == 0.0 {
        return None;
    }
    defined(round_to((high - low) / (6.0 * stats.std), INDEX_PLACES))
}

/// Cpk, 2 dp. Uses whichever limits exist; undefined with neither or zero spread.
pub fn cpk(param: &Parameter, stats: ColumnStats) -> Option<f64> {
    let ColumnStats { mean, std } = stats;
    if std == 0.0 {
        return None;
    }
    let distance = match (param.low_limit, param.high_limit) {
        (None, None) => return None,
        (None, Some(high)) => high - mean,
        (Some(low), None) => mean - low,
        (Some(low), Some(high)) => (high - mean).min(mean - low),
    };
    defined(round_to(distance / (3.0 * std), INDEX_PLACES))
}

pub fn cpk_decision(cpk: Option<f64>) -> CpkDecision {
    match cpk {
        None => CpkDecision::NotApplicable,
        Some(value) if value < CPK_CAPABLE => CpkDecision::NotCapable,
        Some(_) => CpkDecision::GoodCapable,
    }
}

pub fn capability_indices(param: &Parameter, stats: ColumnStats) -> CapabilityIndices {
    let cpk = cpk(param, stats);
    CapabilityIndices {
        cp: cp(param, stats),
        cpk,
        decision: cpk_decision(cpk),
    }
}

/// Reference and candidate capability for one parameter of one board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityRow {
    pub parameter: usize,
    pub reference_stats: ColumnStats,
    pub reference: CapabilityIndices,
    pub candidate_stats: ColumnStats,
    pub candidate: CapabilityIndices,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardCapability {
    pub board: BoardId,
    pub rows: Vec<CapabilityRow>,
}

impl BoardCapability {
    /// Candidate decisions, in parameter order.
    pub fn decisions(&self) -> impl Iterator<Item = CpkDecision> + '_ {
        self.rows.iter().map(|r| r.candidate.decision)
    }
}

/// Capability view for one board alongside the reference view.
pub fn analyze_board(
    limits: &LimitTable,
    board: BoardId,
    reference: &PooledStatistics,
    candidate: &PooledStatistics,
) -> Result<BoardCapability, CoreError> {
    for (label, pooled) in [("reference (pooled)", reference), ("candidate (pooled)", candidate)] {
        if pooled.len() != limits.len() {
            return Err(CoreError::ParameterCountMismatch {
                table: format!("{board} {label}"),
                expected: limits.len(),
                found: pooled.len(),
            });
        }
    }

    let rows = limits
        .iter()
        .zip(reference.columns.iter().zip(&candidate.columns))
        .map(|(param, (&r, &c))| CapabilityRow {
            parameter: param.index,
            reference_stats: r,
            reference: capability_indices(param, r),
            candidate_stats: c,
            candidate: capability_indices(param, c),
        })
        .collect();

    Ok(BoardCapability { board, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(low: Option<f64>, high: Option<f64>) -> Parameter {
        Parameter {
            index: 0,
            test_id: "1".into(),
            name: "Vout".into(),
            low_limit: low,
            high_limit: high,
            shift_std_threshold: Some(0.01),
        }
    }

    #[test]
    fn centered_two_sided_process() {
        let p = param(Some(0.0), Some(10.0));
        let idx = capability_indices(&p, ColumnStats::new(5.0, 1.0));
        assert_eq!(idx.cp, Some(1.67));
        assert_eq!(idx.cpk, Some(1.67));
        assert_eq!(idx.decision, CpkDecision::GoodCapable);
    }

    #[test]
    fn off_center_uses_nearer_limit() {
        let p = param(Some(0.0), Some(10.0));
        assert_eq!(cpk(&p, ColumnStats::new(8.0, 1.0)), Some(0.67));
        assert_eq!(cp(&p, ColumnStats::new(8.0, 1.0)), Some(1.67));
    }

    #[test]
    fn one_sided_limits() {
        let upper = param(None, Some(10.0));
        assert_eq!(cp(&upper, ColumnStats::new(4.0, 1.0)), None);
        assert_eq!(cpk(&upper, ColumnStats::new(4.0, 1.0)), Some(2.0));

        let lower = param(Some(1.0), None);
        assert_eq!(cpk(&lower, ColumnStats::new(4.0, 1.0)), Some(1.0));
        assert_eq!(
            capability_indices(&lower, ColumnStats::new(4.0, 1.0)).decision,
            CpkDecision::NotCapable
        );
    }

    #[test]
    fn no_limits_or_zero_spread_is_not_applicable() {
        let none = capability_indices(&param(None, None), ColumnStats::new(4.0, 1.0));
        assert_eq!((none.cp, none.cpk), (None, None));
        assert_eq!(none.decision, CpkDecision::NotApplicable);

        let flat = capability_indices(&param(Some(0.0), Some(1.0)), ColumnStats::new(0.5, 0.0));
        assert_eq!((flat.cp, flat.cpk), (None, None));
        assert_eq!(flat.decision, CpkDecision::NotApplicable);
    }

    #[test]
    fn missing_data_is_not_applicable() {
        let p = param(Some(0.0), Some(10.0));
        let idx = capability_indices(&p, ColumnStats::new(f64::NAN, f64::NAN));
        assert_eq!(idx.cpk, None);
        assert_eq!(idx.decision, CpkDecision::NotApplicable);
    }

    #[test]
    fn decision_boundary_is_inclusive() {
        assert_eq!(cpk_decision(Some(1.3)), CpkDecision::GoodCapable);
        assert_eq!(cpk_decision(Some(1.29)), CpkDecision::NotCapable);
    }

    #[test]
    fn analyze_board_checks_widths() {
        let limits = LimitTable::new(vec![param(Some(0.0), Some(10.0))]);
        let reference = PooledStatistics {
            columns: vec![ColumnStats::new(5.0, 1.0)],
        };
        let candidate = PooledStatistics { columns: vec![] };
        assert!(matches!(
            analyze_board(&limits, BoardId(1), &reference, &candidate),
            Err(CoreError::ParameterCountMismatch { .. })
        ));

        let candidate = PooledStatistics {
            columns: vec![ColumnStats::new(9.0, 1.0)],
        };
        let board = analyze_board(&limits, BoardId(1), &reference, &candidate).unwrap();
        assert_eq!(board.rows[0].reference.decision, CpkDecision::GoodCapable);
        assert_eq!(board.rows[0].candidate.cpk, Some(0.33));
        assert_eq!(
            board.decisions().collect::<Vec<_>>(),
            vec![CpkDecision::NotCapable]
        );
    }
}
