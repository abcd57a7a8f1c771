//! Table Normalizer — raw measurement tables into numeric sample tables.
//!
//! Raw layout: column 0 is the run/test identifier, column 1 the parameter
//! description, and every further column one test-run sample. An optional
//! `Units` column carries unit labels. The normalized table is transposed:
//! one row per sample, one column per parameter, in raw row order.

use serde::{Deserialize, Serialize};

use crate::domain::table::parse_real;
use crate::domain::{LimitTable, RawTable, SampleTable};
use crate::error::CoreError;

/// Header of the unit-label column, dropped after transposition.
pub const UNITS_LABEL: &str = "Units";

/// Rows with more missing cells than this are discarded; one gap is tolerated as noise.
pub const MAX_MISSING_CELLS: usize = 1;

/// Normalize a raw measurement table.
///
/// Fails with [`CoreError::NonNumeric`] when a kept cell holds text that is
/// not a number; malformed input is never defaulted.
pub fn normalize(raw: &RawTable) -> Result<SampleTable, CoreError> {
    raw.require_columns(2)?;

    let kept_rows: Vec<usize> = (0..raw.rows.len())
        .filter(|&row| raw.missing_in_row(row) <= MAX_MISSING_CELLS)
        .collect();

    let parameters: Vec<String> = kept_rows
        .iter()
        .map(|&row| raw.cell(row, 1).unwrap_or_default().to_string())
        .collect();

    let sample_columns: Vec<usize> = (2..raw.width())
        .filter(|&col| raw.headers[col].trim() != UNITS_LABEL)
        .collect();

    let mut samples = Vec::with_capacity(sample_columns.len());
    for &col in &sample_columns {
        let mut values = Vec::with_capacity(kept_rows.len());
        for (param, &row) in kept_rows.iter().enumerate() {
            let value = parse_real(raw.cell(row, col)).map_err(|value| CoreError::NonNumeric {
                table: raw.name.clone(),
                row: parameters[param].clone(),
                column: raw.headers[col].clone(),
                value,
            })?;
            values.push(value.unwrap_or(f64::NAN));
        }
        samples.push(values);
    }

    SampleTable::new(raw.name.clone(), parameters, samples)
}

/// How limit rows are matched against sample-table columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignmentMode {
    /// Match by position; name differences are reported as warnings.
    #[default]
    Positional,
    /// Match by position and require identical names.
    ByName,
}

/// A parameter whose description differs between the limit table and a sample table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentWarning {
    pub table: String,
    pub position: usize,
    pub expected: String,
    pub found: String,
}

/// Validate the positional contract between the limit table and a sample table.
///
/// A count mismatch is always fatal. Name mismatches are returned as warnings
/// under [`AlignmentMode::Positional`] and fatal under [`AlignmentMode::ByName`].
pub fn check_alignment(
    limits: &LimitTable,
    table: &SampleTable,
    mode: AlignmentMode,
) -> Result<Vec<AlignmentWarning>, CoreError> {
    if limits.len() != table.parameter_count() {
        return Err(CoreError::ParameterCountMismatch {
            table: table.name().to_string(),
            expected: limits.len(),
            found: table.parameter_count(),
        });
    }

    let mut warnings = Vec::new();
    for (param, found) in limits.iter().zip(table.parameters()) {
        if param.name.trim() == found.trim() {
            continue;
        }
        match mode {
            AlignmentMode::ByName => {
                return Err(CoreError::ParameterNameMismatch {
                    table: table.name().to_string(),
                    position: param.index + 1,
                    expected: param.name.clone(),
                    found: found.clone(),
                });
            }
            AlignmentMode::Positional => warnings.push(AlignmentWarning {
                table: table.name().to_string(),
                position: param.index + 1,
                expected: param.name.clone(),
                found: found.clone(),
            }),
        }
    }
    Ok(warnings)
}
