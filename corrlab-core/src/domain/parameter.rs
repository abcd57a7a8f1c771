//! Test parameters and the limit table that defines them.
//!
//! Parameter identity is positional: the Nth limit row corresponds to the Nth
//! column of every normalized sample table. The description is carried along
//! so alignment can also be checked by name.

use serde::{Deserialize, Serialize};

use super::table::{parse_real, RawTable};
use crate::error::CoreError;

/// Minimum limit-table width: test id, description, low, high, sdlot.
pub const LIMIT_COLUMNS: usize = 5;

/// Limit rows with more missing cells than this are dropped as blank/section rows.
pub const MAX_MISSING_LIMIT_CELLS: usize = 3;

/// A named test item with its specification limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// 0-based position in the limit table (after blank rows are dropped).
    pub index: usize,
    pub test_id: String,
    pub name: String,
    pub low_limit: Option<f64>,
    pub high_limit: Option<f64>,
    /// Mean-shift threshold ("sdlot") used when the limits cannot express a percentage shift.
    pub shift_std_threshold: Option<f64>,
}

impl Parameter {
    /// Both limits, when both are defined.
    pub fn limits(&self) -> Option<(f64, f64)> {
        self.low_limit.zip(self.high_limit)
    }
}

/// Ordered set of parameters.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LimitTable {
    parameters: Vec<Parameter>,
}

impl LimitTable {
    pub fn new(parameters: Vec<Parameter>) -> Self {
        Self { parameters }
    }

    /// Interpret a raw limit file.
    ///
    /// Columns: `[test id, description, low limit, high limit, sdlot, ...]`.
    /// Tabs are stripped from the test id, rows with more than three missing
    /// cells are skipped, and the numeric columns must parse as reals when
    /// present.
    pub fn from_raw(raw: &RawTable) -> Result<Self, CoreError> {
        raw.require_columns(LIMIT_COLUMNS)?;

        let mut parameters = Vec::new();
        for row in 0..raw.rows.len() {
            if raw.missing_in_row(row) > MAX_MISSING_LIMIT_CELLS {
                continue;
            }

            let test_id = raw.cell(row, 0).unwrap_or_default().replace('\t', "");
            let name = raw.cell(row, 1).unwrap_or_default().to_string();
            let real = |col: usize| {
                parse_real(raw.cell(row, col)).map_err(|value| CoreError::NonNumeric {
                    table: raw.name.clone(),
                    row: name.clone(),
                    column: raw.headers[col].clone(),
                    value,
                })
            };

            parameters.push(Parameter {
                index: parameters.len(),
                low_limit: real(2)?,
                high_limit: real(3)?,
                shift_std_threshold: real(4)?,
                test_id,
                name,
            });
        }

        Ok(Self { parameters })
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Parameter> {
        self.parameters.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Parameter> {
        self.parameters.iter()
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }
}

impl<'a> IntoIterator for &'a LimitTable {
    type Item = &'a Parameter;
    type IntoIter = std::slice::Iter<'a, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.parameters.iter()
    }
}
