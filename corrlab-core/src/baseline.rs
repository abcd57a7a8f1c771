//! Baseline Estimator — per-parameter mean and population standard deviation.
//!
//! Unit statistics feed the parameter evaluator; pooled statistics (all units
//! of one dataset concatenated) feed only the capability analyzer.

use serde::{Deserialize, Serialize};

use crate::domain::SampleTable;
use crate::error::CoreError;
use crate::numeric::{nan_mean, nan_population_std, round_to};

/// Decimal places kept for per-unit means.
pub const UNIT_MEAN_PLACES: u32 = 6;
/// Decimal places kept for per-unit standard deviations.
pub const UNIT_STD_PLACES: u32 = 5;
/// Decimal places kept for pooled mean and standard deviation.
pub const POOLED_PLACES: u32 = 4;

/// Mean and population standard deviation of one parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnStats {
    pub mean: f64,
    pub std: f64,
}

impl ColumnStats {
    pub fn new(mean: f64, std: f64) -> Self {
        Self { mean, std }
    }
}

/// Per-parameter statistics of a single unit's sample table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitStatistics {
    pub table: String,
    pub columns: Vec<ColumnStats>,
}

/// Per-parameter statistics over all units of one dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PooledStatistics {
    pub columns: Vec<ColumnStats>,
}

impl UnitStatistics {
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl PooledStatistics {
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

fn column_stats<'a>(
    tables: impl Iterator<Item = &'a SampleTable>,
    column: usize,
    mean_places: u32,
    std_places: u32,
) -> ColumnStats {
    let values: Vec<f64> = tables.flat_map(|t| t.column(column)).collect();
    ColumnStats {
        mean: round_to(nan_mean(values.iter().copied()), mean_places),
        std: round_to(nan_population_std(&values), std_places),
    }
}

/// Mean (6 dp) and population std (5 dp) for every parameter of one unit.
pub fn unit_statistics(table: &SampleTable) -> UnitStatistics {
    let columns = (0..table.parameter_count())
        .map(|col| {
            column_stats(
                std::iter::once(table),
                col,
                UNIT_MEAN_PLACES,
                UNIT_STD_PLACES,
            )
        })
        .collect();
    UnitStatistics {
        table: table.name().to_string(),
        columns,
    }
}

/// Mean and population std (both 4 dp) over the union of all units' samples.
///
/// All tables must have the same parameter count.
pub fn pooled_statistics(tables: &[SampleTable]) -> Result<PooledStatistics, CoreError> {
    let Some(first) = tables.first() else {
        return Ok(PooledStatistics {
            columns: Vec::new(),
        });
    };
    let width = first.parameter_count();
    if let Some(bad) = tables.iter().find(|t| t.parameter_count() != width) {
        return Err(CoreError::ParameterCountMismatch {
            table: bad.name().to_string(),
            expected: width,
            found: bad.parameter_count(),
        });
    }

    let columns = (0..width)
        .map(|col| column_stats(tables.iter(), col, POOLED_PLACES, POOLED_PLACES))
        .collect();
    Ok(PooledStatistics { columns })
}
