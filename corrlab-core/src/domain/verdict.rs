use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a single criterion, a unit status or a board rollup.
///
/// `Failed` is reserved for mean-shift failures against spec limits; every
/// other non-passing outcome is `ForCheck` (engineer review).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    Passed,
    ForCheck,
    Failed,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Passed => "Passed",
            Verdict::ForCheck => "For check",
            Verdict::Failed => "Failed",
        }
    }

    pub fn is_passed(&self) -> bool {
        matches!(self, Verdict::Passed)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability decision derived from Cpk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CpkDecision {
    GoodCapable,
    NotCapable,
    /// Cpk could not be computed (no limits, zero spread, or missing data).
    NotApplicable,
}

impl CpkDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            CpkDecision::GoodCapable => "Good capable",
            CpkDecision::NotCapable => "Not capable",
            CpkDecision::NotApplicable => "N/A",
        }
    }
}

impl fmt::Display for CpkDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Release remark for a candidate board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Remark {
    /// No failed-count available (nothing was evaluated).
    Blank,
    GoodToRelease,
    NotAcceptable,
}

impl Remark {
    /// Remark from the board's failed-test count.
    pub fn from_failed(failed: Option<usize>) -> Self {
        match failed {
            None => Remark::Blank,
            Some(0) => Remark::GoodToRelease,
            Some(_) => Remark::NotAcceptable,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Remark::Blank => "",
            Remark::GoodToRelease => "Good to release if no concern",
            Remark::NotAcceptable => "Not acceptable",
        }
    }
}

impl fmt::Display for Remark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
