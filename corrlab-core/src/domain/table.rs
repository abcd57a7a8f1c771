//! Raw delimited tables and the normalized sample tables built from them.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A parsed but uninterpreted table: header names plus rows of optional cells.
///
/// `None` marks a missing cell. Rows shorter than the header are padded with
/// missing cells; cells past the last header are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    pub fn new(
        name: impl Into<String>,
        headers: Vec<String>,
        rows: Vec<Vec<Option<String>>>,
    ) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, None);
                row
            })
            .collect();
        Self {
            name: name.into(),
            headers,
            rows,
        }
    }

    /// Number of columns (from the header).
    pub fn width(&self) -> usize {
        self.headers.len()
    }

    /// Cell text, trimmed. Blank cells count as missing.
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .and_then(|c| c.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Count of missing cells in a row, across all columns.
    pub fn missing_in_row(&self, row: usize) -> usize {
        (0..self.width())
            .filter(|&col| self.cell(row, col).is_none())
            .count()
    }

    pub fn require_columns(&self, required: usize) -> Result<(), CoreError> {
        if self.width() < required {
            return Err(CoreError::MissingColumns {
                table: self.name.clone(),
                required,
                found: self.width(),
            });
        }
        Ok(())
    }
}

/// Parse an optional cell as a real number.
///
/// Missing cells map to `Ok(None)`; any other non-numeric text is an error
/// carrying the offending text.
pub(crate) fn parse_real(cell: Option<&str>) -> Result<Option<f64>, String> {
    match cell {
        None => Ok(None),
        Some(text) => text.parse::<f64>().map(Some).map_err(|_| text.to_string()),
    }
}

/// Purely numeric table: one row per test-run sample, one column per parameter.
///
/// A tolerated missing measurement is stored as `NaN` and skipped by every
/// statistic computed over the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleTable {
    name: String,
    parameters: Vec<String>,
    samples: Vec<Vec<f64>>,
}

impl SampleTable {
    /// Build a sample table. Every sample must have one value per parameter.
    pub fn new(
        name: impl Into<String>,
        parameters: Vec<String>,
        samples: Vec<Vec<f64>>,
    ) -> Result<Self, CoreError> {
        let name = name.into();
        if let Some(bad) = samples.iter().find(|s| s.len() != parameters.len()) {
            return Err(CoreError::ParameterCountMismatch {
                table: name,
                expected: parameters.len(),
                found: bad.len(),
            });
        }
        Ok(Self {
            name,
            parameters,
            samples,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn samples(&self) -> &[Vec<f64>] {
        &self.samples
    }

    /// Values of one parameter column, in sample order.
    pub fn column(&self, index: usize) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(move |s| s[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: &[&str]) -> Vec<Option<String>> {
        values
            .iter()
            .map(|v| if v.is_empty() { None } else { Some(v.to_string()) })
            .collect()
    }

    #[test]
    fn short_rows_are_padded() {
        let raw = RawTable::new(
            "t",
            vec!["a".into(), "b".into(), "c".into()],
            vec![cells(&["1"])],
        );
        assert_eq!(raw.rows[0].len(), 3);
        assert_eq!(raw.missing_in_row(0), 2);
    }

    #[test]
    fn blank_cells_count_as_missing() {
        let raw = RawTable::new(
            "t",
            vec!["a".into(), "b".into()],
            vec![vec![Some("  ".into()), Some(" 2.5 ".into())]],
        );
        assert_eq!(raw.cell(0, 0), None);
        assert_eq!(raw.cell(0, 1), Some("2.5"));
    }

    #[test]
    fn parse_real_reports_offending_text() {
        assert_eq!(parse_real(None), Ok(None));
        assert_eq!(parse_real(Some("1e-3")), Ok(Some(0.001)));
        assert_eq!(parse_real(Some("PASS")), Err("PASS".to_string()));
    }

    #[test]
    fn sample_table_rejects_ragged_rows() {
        let err = SampleTable::new("t", vec!["x".into(), "y".into()], vec![vec![1.0]]);
        assert!(matches!(err, Err(CoreError::ParameterCountMismatch { .. })));
    }

    #[test]
    fn column_iterates_samples() {
        let t = SampleTable::new(
            "t",
            vec!["x".into(), "y".into()],
            vec![vec![1.0, 2.0], vec![3.0, 4.0]],
        )
        .unwrap();
        assert_eq!(t.column(1).collect::<Vec<_>>(), vec![2.0, 4.0]);
    }
}
