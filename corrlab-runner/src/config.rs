//! Report configuration — product/setup metadata, input files, evaluation
//! switches and output options, loaded from TOML.
//!
//! Relative input and output paths resolve against the directory holding
//! the config file, so a report folder can be moved as a whole.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use corrlab_core::{AlignmentMode, RollupPolicy};

/// Errors raised while loading or validating a report configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("required field '{0}' is blank")]
    BlankField(&'static str),

    #[error("board {board} lists {found} file(s) but there are {expected} reference unit(s)")]
    MismatchedUnitCount {
        board: usize,
        expected: usize,
        found: usize,
    },

    #[error("input '{0}' is not a .csv file")]
    NotCsv(PathBuf),

    #[error("no {0} configured")]
    EmptyInputs(&'static str),
}

/// Product information block of the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductInfo {
    pub test_card_name: String,
    pub part_name: String,
    pub package: String,
    pub lead_count: String,
    pub description: String,
}

impl ProductInfo {
    /// Label/value pairs in report order.
    pub fn entries(&self) -> [(&'static str, &str); 5] {
        [
            ("Test Card Name", &self.test_card_name),
            ("Part Name", &self.part_name),
            ("Package", &self.package),
            ("Lead Count", &self.lead_count),
            ("Description", &self.description),
        ]
    }
}

/// Tester setup block of the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetupInfo {
    pub tester_id: String,
    pub reference_board: String,
    pub new_board_id: String,
    pub test_program: String,
}

impl SetupInfo {
    pub fn entries(&self) -> [(&'static str, &str); 4] {
        [
            ("Tester ID", &self.tester_id),
            ("Reference Board", &self.reference_board),
            ("New Board ID", &self.new_board_id),
            ("Test Program", &self.test_program),
        ]
    }
}

/// Measurement files for one candidate board, one per unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardInputs {
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputsConfig {
    pub limit_file: PathBuf,
    pub reference_units: Vec<PathBuf>,
    pub boards: Vec<BoardInputs>,
}

/// Switches controlling how the engine evaluates the inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationSettings {
    pub alignment: AlignmentMode,
    pub board_rollup: RollupPolicy,
    /// Evaluate boards on the rayon pool.
    pub parallel: bool,
}

impl Default for EvaluationSettings {
    fn default() -> Self {
        Self {
            alignment: AlignmentMode::default(),
            board_rollup: RollupPolicy::default(),
            parallel: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub markdown: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("reports"),
            markdown: true,
        }
    }
}

/// Top-level report configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    pub product: ProductInfo,
    pub setup: SetupInfo,
    pub inputs: InputsConfig,
    #[serde(default)]
    pub evaluation: EvaluationSettings,
    #[serde(default)]
    pub output: OutputConfig,
    /// Directory relative paths resolve against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl ReportConfig {
    /// Read, parse and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self::from_toml(&content, base_dir)
    }

    /// Parse and validate TOML content.
    pub fn from_toml(content: &str, base_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let mut config: ReportConfig = toml::from_str(content)?;
        config.base_dir = base_dir.into();
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("product.test_card_name", &self.product.test_card_name),
            ("product.part_name", &self.product.part_name),
            ("product.package", &self.product.package),
            ("product.lead_count", &self.product.lead_count),
            ("product.description", &self.product.description),
            ("setup.tester_id", &self.setup.tester_id),
            ("setup.reference_board", &self.setup.reference_board),
            ("setup.new_board_id", &self.setup.new_board_id),
            ("setup.test_program", &self.setup.test_program),
        ];
        if let Some((field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(ConfigError::BlankField(*field));
        }

        let inputs = &self.inputs;
        if inputs.reference_units.is_empty() {
            return Err(ConfigError::EmptyInputs("reference units"));
        }
        if inputs.boards.is_empty() {
            return Err(ConfigError::EmptyInputs("candidate boards"));
        }
        for (i, board) in inputs.boards.iter().enumerate() {
            if board.files.len() != inputs.reference_units.len() {
                return Err(ConfigError::MismatchedUnitCount {
                    board: i + 1,
                    expected: inputs.reference_units.len(),
                    found: board.files.len(),
                });
            }
        }

        let all_files = std::iter::once(&inputs.limit_file)
            .chain(&inputs.reference_units)
            .chain(inputs.boards.iter().flat_map(|b| &b.files));
        for file in all_files {
            if !is_csv(file) {
                return Err(ConfigError::NotCsv(file.clone()));
            }
        }
        Ok(())
    }

    /// Resolve a configured path against the config directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn limit_path(&self) -> PathBuf {
        self.resolve(&self.inputs.limit_file)
    }

    pub fn reference_paths(&self) -> Vec<PathBuf> {
        self.inputs
            .reference_units
            .iter()
            .map(|p| self.resolve(p))
            .collect()
    }

    /// Resolved file paths, outer index = board, inner index = unit.
    pub fn board_paths(&self) -> Vec<Vec<PathBuf>> {
        self.inputs
            .boards
            .iter()
            .map(|b| b.files.iter().map(|p| self.resolve(p)).collect())
            .collect()
    }

    pub fn output_dir(&self) -> PathBuf {
        self.resolve(&self.output.dir)
    }
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

/// Annotated starter configuration printed by `corrlab template`.
pub const TEMPLATE: &str = r#"# CorrLab report configuration.
# Relative paths resolve against this file's directory.

[product]
test_card_name = "TC-0001"
part_name = "PART-X"
package = "QFN"
lead_count = "32"
description = "Tester board correlation"

[setup]
tester_id = "T01"
reference_board = "RB-01"
new_board_id = "NB-01"
test_program = "PROG_V1"

[inputs]
# Limit table: test id, description, low limit, high limit, sdlot.
limit_file = "limits.csv"
# One file per reference unit; every board lists the same number of units.
reference_units = ["rb/unit1.csv", "rb/unit2.csv"]

[[inputs.boards]]
files = ["nb1/unit1.csv", "nb1/unit2.csv"]

[evaluation]
# "positional" warns on parameter-name mismatches, "by_name" rejects them.
alignment = "positional"
# "lenient": Passed or For check; "strict" also reports Failed boards.
board_rollup = "lenient"
parallel = true

[output]
dir = "reports"
markdown = true
"#;
