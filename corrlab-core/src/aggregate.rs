//! Aggregator — per-board verdict counts and release remark.
//!
//! A pure fold over finished evaluation rows.

use serde::{Deserialize, Serialize};

use crate::domain::{BoardId, Remark, UnitId, Verdict};
use crate::evaluate::BoardEvaluation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VerdictCounts {
    pub passed: usize,
    pub for_check: usize,
    pub failed: usize,
}

impl VerdictCounts {
    pub fn tally(verdicts: impl IntoIterator<Item = Verdict>) -> Self {
        verdicts
            .into_iter()
            .fold(Self::default(), |mut counts, verdict| {
                match verdict {
                    Verdict::Passed => counts.passed += 1,
                    Verdict::ForCheck => counts.for_check += 1,
                    Verdict::Failed => counts.failed += 1,
                }
                counts
            })
    }

    pub fn total(&self) -> usize {
        self.passed + self.for_check + self.failed
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitCounts {
    pub unit: UnitId,
    pub counts: VerdictCounts,
}

/// Cross-unit summary of one candidate board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardSummary {
    pub board: BoardId,
    /// `{test card name}_NB{n}`.
    pub test_card: String,
    /// Counts over the board-level rollup.
    pub overall: VerdictCounts,
    pub per_unit: Vec<UnitCounts>,
    pub total_test: usize,
    pub remark: Remark,
}

pub fn test_card_label(test_card_name: &str, board: BoardId) -> String {
    format!("{test_card_name}_{board}")
}

pub fn summarize_board(test_card_name: &str, evaluation: &BoardEvaluation) -> BoardSummary {
    let overall = VerdictCounts::tally(evaluation.board_status.iter().copied());
    let per_unit = evaluation
        .units
        .iter()
        .map(|u| UnitCounts {
            unit: u.unit,
            counts: VerdictCounts::tally(u.statuses()),
        })
        .collect();

    let total_test = evaluation.parameter_count();
    let failed = (total_test > 0).then_some(overall.failed);

    BoardSummary {
        board: evaluation.board,
        test_card: test_card_label(test_card_name, evaluation.board),
        overall,
        per_unit,
        total_test,
        remark: Remark::from_failed(failed),
    }
}

pub fn summarize<'a>(
    test_card_name: &str,
    boards: impl IntoIterator<Item = &'a BoardEvaluation>,
) -> Vec<BoardSummary> {
    boards
        .into_iter()
        .map(|b| summarize_board(test_card_name, b))
        .collect()
}
