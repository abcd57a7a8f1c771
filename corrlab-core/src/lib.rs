//! CorrLab Core — the statistical evaluation engine.
//!
//! Turns repeated test measurements of candidate boards (NB) and a reference
//! board (RB) into correlation and capability verdicts:
//! - Table normalization (raw measurement tables into numeric sample tables)
//! - Baseline estimation (per-unit and pooled mean / population std)
//! - Parameter evaluation (mean shift, SD ratio, unit status, board rollup)
//! - Capability analysis (Cp / Cpk on pooled statistics)
//! - Aggregation (per-board counts and release remark)
//!
//! Every stage is a deterministic function of its inputs. No I/O happens here.

pub mod aggregate;
pub mod baseline;
pub mod capability;
pub mod domain;
pub mod error;
pub mod evaluate;
pub mod normalize;
pub mod numeric;
pub mod report;

pub use aggregate::{summarize, summarize_board, BoardSummary, UnitCounts, VerdictCounts};
pub use baseline::{pooled_statistics, unit_statistics, ColumnStats, PooledStatistics, UnitStatistics};
pub use capability::{analyze_board, capability_indices, BoardCapability, CapabilityIndices, CapabilityRow};
pub use domain::{
    BoardId, CpkDecision, LimitTable, Parameter, RawTable, Remark, SampleTable, UnitId, Verdict,
};
pub use error::CoreError;
pub use evaluate::{
    evaluate_board, evaluate_parameter, evaluate_unit, rollup, BoardEvaluation, EvaluationRow,
    RollupPolicy, UnitEvaluation,
};
pub use normalize::{check_alignment, normalize, AlignmentMode, AlignmentWarning};
pub use report::{BoardReport, CorrelationReport, SCHEMA_VERSION};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: everything the runner hands to worker threads is Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<SampleTable>();
        require_sync::<SampleTable>();
        require_send::<LimitTable>();
        require_sync::<LimitTable>();
        require_send::<UnitStatistics>();
        require_sync::<UnitStatistics>();
        require_send::<PooledStatistics>();
        require_sync::<PooledStatistics>();
        require_send::<BoardEvaluation>();
        require_sync::<BoardEvaluation>();
        require_send::<BoardCapability>();
        require_sync::<BoardCapability>();
        require_send::<CorrelationReport>();
        require_sync::<CorrelationReport>();
        require_send::<CoreError>();
        require_sync::<CoreError>();
    }

    #[test]
    fn digest_is_stable_for_equal_reports() {
        let report = CorrelationReport::assemble(
            "TC",
            LimitTable::default(),
            vec![],
            PooledStatistics { columns: vec![] },
            vec![],
            vec![],
        );
        let again = report.clone();
        assert_eq!(report.digest().unwrap(), again.digest().unwrap());
        assert_eq!(report.schema_version, SCHEMA_VERSION);
        assert!(report.summary.is_empty());
    }
}
