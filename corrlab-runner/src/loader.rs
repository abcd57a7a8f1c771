//! Delimited-file ingestion.
//!
//! Reads tester exports and the limit table into [`RawTable`]s. Short rows are
//! padded with missing cells; a row carrying values past the last header column
//! is rejected. Blank cells and the usual spreadsheet spellings of "not a
//! number" load as missing.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use corrlab_core::RawTable;

use crate::config::ReportConfig;

/// Cell spellings treated as missing (pandas' default NA strings).
const MISSING_MARKERS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("'{path}' has no header row")]
    MissingHeader { path: PathBuf },

    #[error("'{path}' line {line}: {found} cells but the header has {expected} columns")]
    ExtraCells {
        path: PathBuf,
        line: u64,
        expected: usize,
        found: usize,
    },
}

/// Raw tables for one report, in configuration order.
#[derive(Debug, Clone)]
pub struct ReportInputs {
    pub test_card_name: String,
    pub limits: RawTable,
    pub reference: Vec<RawTable>,
    /// Outer index = board, inner index = unit.
    pub boards: Vec<Vec<RawTable>>,
}

/// Read one delimited file. The table is named after the file.
pub fn read_raw_table(path: &Path) -> Result<RawTable, LoadError> {
    let csv_err = |source| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(csv_err)?;

    let headers: Vec<String> = reader
        .byte_headers()
        .map_err(csv_err)?
        .iter()
        .map(|h| String::from_utf8_lossy(h).trim().to_string())
        .collect();
    if headers.iter().all(String::is_empty) {
        return Err(LoadError::MissingHeader {
            path: path.to_path_buf(),
        });
    }

    let mut rows = Vec::new();
    for record in reader.byte_records() {
        let record = record.map_err(csv_err)?;
        let row: Vec<Option<String>> = record
            .iter()
            .map(|field| cell(&String::from_utf8_lossy(field)))
            .collect();
        // trailing empty cells carry nothing; values past the header would be lost
        if row[headers.len().min(row.len())..].iter().any(Option::is_some) {
            return Err(LoadError::ExtraCells {
                path: path.to_path_buf(),
                line: record.position().map_or(rows.len() as u64 + 2, |p| p.line()),
                expected: headers.len(),
                found: row.len(),
            });
        }
        rows.push(row);
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    debug!(file = %path.display(), columns = headers.len(), rows = rows.len(), "read table");
    Ok(RawTable::new(name, headers, rows))
}

fn cell(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() || MISSING_MARKERS.contains(&text) {
        None
    } else {
        Some(text.to_string())
    }
}

fn read_all(paths: &[PathBuf]) -> Result<Vec<RawTable>, LoadError> {
    paths.iter().map(|p| read_raw_table(p)).collect()
}

/// Read every file a configuration names.
pub fn load_inputs(config: &ReportConfig) -> Result<ReportInputs, LoadError> {
    let limits = read_raw_table(&config.limit_path())?;
    let reference = read_all(&config.reference_paths())?;
    let boards = config
        .board_paths()
        .iter()
        .map(|paths| read_all(paths))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ReportInputs {
        test_card_name: config.product.test_card_name.clone(),
        limits,
        reference,
        boards,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn reads_headers_and_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "unit1.csv",
            "Test,Description,S1,S2\n1, VOUT ,1.0,1.1\n2,IQ,2.0,2.1\n",
        );
        let table = read_raw_table(&path).unwrap();
        assert_eq!(table.name, "unit1.csv");
        assert_eq!(table.headers, vec!["Test", "Description", "S1", "S2"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.cell(0, 1), Some("VOUT"));
        assert_eq!(table.cell(1, 3), Some("2.1"));
    }

    #[test]
    fn missing_markers_and_ragged_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "ragged.csv",
            "Test,Description,S1,S2\n1,VOUT,N/A,\n2,IQ\n3,ILIM,NaN,4\n",
        );
        let table = read_raw_table(&path).unwrap();
        assert_eq!(table.cell(0, 2), None);
        assert_eq!(table.cell(0, 3), None);
        assert_eq!(table.rows[1].len(), 4);
        assert_eq!(table.missing_in_row(1), 2);
        assert_eq!(table.cell(2, 2), None);
        assert_eq!(table.cell(2, 3), Some("4"));
    }

    #[test]
    fn empty_file_has_no_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "empty.csv", "");
        assert!(matches!(
            read_raw_table(&path),
            Err(LoadError::MissingHeader { .. })
        ));
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = read_raw_table(Path::new("/nonexistent/unit9.csv")).unwrap_err();
        assert!(err.to_string().contains("unit9.csv"));
    }

    #[test]
    fn values_past_the_header_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "wide.csv",
            "Test,Description,S1,S2\n1,VOUT,1.0,2.0,99.0\n",
        );
        match read_raw_table(&path) {
            Err(LoadError::ExtraCells {
                line,
                expected,
                found,
                ..
            }) => {
                assert_eq!((line, expected, found), (2, 4, 5));
            }
            other => panic!("expected ExtraCells, got {other:?}"),
        }
        let err = read_raw_table(&path).unwrap_err();
        assert!(err.to_string().contains("wide.csv"));
    }

    #[test]
    fn trailing_empty_cells_are_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "trailing.csv",
            "Test,Description,S1,S2\n1,VOUT,1.0,2.0,,\n",
        );
        let table = read_raw_table(&path).unwrap();
        assert_eq!(table.rows[0].len(), 4);
        assert_eq!(table.cell(0, 3), Some("2.0"));
    }

    #[test]
    fn pandas_na_spellings_load_as_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "na.csv",
            "Test,Description,S1,S2,S3,S4,S5\n1,VOUT,None,<NA>,#NA,-NaN,1.#QNAN\n",
        );
        let table = read_raw_table(&path).unwrap();
        assert_eq!(table.missing_in_row(0), 5);
    }
}
