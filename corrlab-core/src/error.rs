//! Structural errors raised by the engine.
//!
//! Only malformed or misaligned input tables are errors. Missing limits and
//! zero variance are ordinary data and resolve to undefined metrics or
//! fallback classifications inside the row that produced them.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    #[error("table '{table}' has {found} column(s); at least {required} required")]
    MissingColumns {
        table: String,
        required: usize,
        found: usize,
    },

    #[error("table '{table}': non-numeric value '{value}' at '{row}' / '{column}'")]
    NonNumeric {
        table: String,
        row: String,
        column: String,
        value: String,
    },

    #[error("table '{table}' has {found} parameter(s) but the limit table defines {expected}")]
    ParameterCountMismatch {
        table: String,
        expected: usize,
        found: usize,
    },

    #[error("table '{table}': parameter #{position} is '{found}' but the limit table expects '{expected}'")]
    ParameterNameMismatch {
        table: String,
        position: usize,
        expected: String,
        found: String,
    },

    #[error("{board} has {found} unit(s) but the reference has {expected}")]
    UnitCountMismatch {
        board: String,
        expected: usize,
        found: usize,
    },
}
