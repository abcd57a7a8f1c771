//! The assembled result of one report-generation run.

use serde::{Deserialize, Serialize};

use crate::aggregate::{summarize, BoardSummary};
use crate::baseline::{PooledStatistics, UnitStatistics};
use crate::capability::BoardCapability;
use crate::domain::{BoardId, LimitTable};
use crate::evaluate::BoardEvaluation;
use crate::normalize::AlignmentWarning;

/// Current schema version for serialized reports.
pub const SCHEMA_VERSION: u32 = 1;

/// Evaluation and capability views of one candidate board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardReport {
    pub evaluation: BoardEvaluation,
    pub capability: BoardCapability,
}

impl BoardReport {
    pub fn board(&self) -> BoardId {
        self.evaluation.board
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationReport {
    pub schema_version: u32,
    pub test_card_name: String,
    pub limits: LimitTable,
    pub reference_units: Vec<UnitStatistics>,
    pub reference_pooled: PooledStatistics,
    pub boards: Vec<BoardReport>,
    pub summary: Vec<BoardSummary>,
    pub alignment_warnings: Vec<AlignmentWarning>,
}

impl CorrelationReport {
    /// Assemble a report from finished stages; the summary is derived here.
    pub fn assemble(
        test_card_name: impl Into<String>,
        limits: LimitTable,
        reference_units: Vec<UnitStatistics>,
        reference_pooled: PooledStatistics,
        boards: Vec<BoardReport>,
        alignment_warnings: Vec<AlignmentWarning>,
    ) -> Self {
        let test_card_name = test_card_name.into();
        let summary = summarize(&test_card_name, boards.iter().map(|b| &b.evaluation));
        Self {
            schema_version: SCHEMA_VERSION,
            test_card_name,
            limits,
            reference_units,
            reference_pooled,
            boards,
            summary,
            alignment_warnings,
        }
    }

    pub fn board(&self, board: BoardId) -> Option<&BoardReport> {
        self.boards.iter().find(|b| b.board() == board)
    }

    /// BLAKE3 digest of the canonical JSON form.
    ///
    /// Identical inputs produce identical digests; undefined values serialize as `null`.
    pub fn digest(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_vec(self)?;
        Ok(blake3::hash(&json).to_hex().to_string())
    }
}
