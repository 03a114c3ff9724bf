//! Log/sheet models, conversion config and top-level error types.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::conf::{
    C_AP_DIR_DEFAULT, C_OUTPUT_DIR_DEFAULT, C_STA_DIR_DEFAULT, TUP_ALGORITHMS_DEFAULT,
    derive_output_file_name,
};

////////////////////////////////////////////////////////////////////////////////
// #region EnumsInit

/// Kind of entity described by a log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumEntityKind {
    /// Access point; first block of each sheet.
    AccessPoint,
    /// Station; appended below the access-point block.
    Station,
}

impl EnumEntityKind {
    /// Prefix of the entity row label (`AP 0`, `STA 3`).
    pub fn label_prefix(self) -> &'static str {
        match self {
            Self::AccessPoint => "AP",
            Self::Station => "STA",
        }
    }
}

impl fmt::Display for EnumEntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label_prefix())
    }
}

/// Classified log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumLogLine<'a> {
    /// Time-column boundary.
    Separator,
    /// `token : value` line.
    KeyValue {
        /// Text before the first ` :`.
        token: &'a str,
        /// Text after ` : `, newline stripped.
        value: &'a str,
    },
    /// Line without a ` :` delimiter.
    Ignored,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region BlockModels

/// Token/label set driving the parser for one entity kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecBlockProfile {
    /// Entity kind of the parsed log.
    pub kind: EnumEntityKind,
    /// Tokens whose value is written as a metric cell.
    pub tokens_metric: Vec<String>,
    /// Labels written in the metric-label column below each entity label.
    /// The last label is the demand-ratio row.
    pub labels_metric: Vec<String>,
    /// Accept `...Channel...` metric tokens.
    pub if_channel_metrics: bool,
    /// Row of the summary `AVERAGE` formula.
    pub row_summary: usize,
}

/// Row placement of one block inside the sheet grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecBlockLayout {
    /// Row cursor value at file start and after each separator.
    pub row_start: usize,
    /// Row receiving the `Time` values.
    pub row_header: usize,
}

/// Result of parsing one log into the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecBlockOutcome {
    /// Largest row cursor reached in any column.
    pub row_max: usize,
    /// Final column cursor (`2 + number of separators`).
    pub col_end: usize,
    /// Demand-ratio rows referenced by the summary formula.
    pub rows_ratio: Vec<usize>,
    /// `(row, col)` of the summary formula cell.
    pub cell_summary: (usize, usize),
    /// Summary formula text.
    pub formula: String,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Config

/// Conversion settings; every field may come from a TOML file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SpecConvertConfig {
    /// AP log directory prefix.
    pub ap_dir: PathBuf,
    /// STA log directory prefix.
    pub sta_dir: PathBuf,
    /// Algorithm variants, one sheet each, in order.
    pub algorithms: Vec<String>,
    /// Shared test identifier naming both input logs and the workbook.
    pub test_id: String,
    /// Directory receiving the workbook.
    pub output_dir: PathBuf,
}

impl Default for SpecConvertConfig {
    fn default() -> Self {
        Self {
            ap_dir: PathBuf::from(C_AP_DIR_DEFAULT),
            sta_dir: PathBuf::from(C_STA_DIR_DEFAULT),
            algorithms: TUP_ALGORITHMS_DEFAULT
                .iter()
                .map(ToString::to_string)
                .collect(),
            test_id: String::new(),
            output_dir: PathBuf::from(C_OUTPUT_DIR_DEFAULT),
        }
    }
}

impl SpecConvertConfig {
    /// Check fields that cannot be defaulted.
    pub fn validate(&self) -> Result<(), ConvertError> {
        if self.test_id.is_empty() {
            return Err(ConvertError::InvalidConfig(
                "test_id must not be empty.".to_string(),
            ));
        }
        if self.algorithms.is_empty() {
            return Err(ConvertError::InvalidConfig(
                "algorithms must list at least one variant.".to_string(),
            ));
        }
        if let Some(algorithm) = self.algorithms.iter().find(|val| val.is_empty()) {
            return Err(ConvertError::InvalidConfig(format!(
                "algorithm names must not be empty: {algorithm:?}"
            )));
        }
        Ok(())
    }

    /// AP and STA log paths for `algorithm`: `{dir}{algorithm}/{test_id}`.
    ///
    /// Plain concatenation, so the directory prefix keeps (or lacks) its own
    /// trailing slash and an absolute test id stays under the prefix.
    pub fn derive_log_paths(&self, algorithm: &str) -> (PathBuf, PathBuf) {
        (
            concat_log_path(&self.ap_dir, algorithm, &self.test_id),
            concat_log_path(&self.sta_dir, algorithm, &self.test_id),
        )
    }

    /// Workbook output path (`<output_dir>/test_<test_id>.xlsx`).
    pub fn path_file_out(&self) -> PathBuf {
        self.output_dir.join(derive_output_file_name(&self.test_id))
    }
}

fn concat_log_path(dir: &Path, algorithm: &str, test_id: &str) -> PathBuf {
    let mut c_path = dir.as_os_str().to_os_string();
    c_path.push(algorithm);
    c_path.push("/");
    c_path.push(test_id);
    PathBuf::from(c_path)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Fatal conversion failure; aborts the whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
    /// Configuration rejected before any file was opened.
    InvalidConfig(String),
    /// Input log could not be opened.
    OpenLog {
        /// Log path.
        path: PathBuf,
        /// Underlying IO error text.
        message: String,
    },
    /// Input log could not be read to the end.
    ReadLog {
        /// Log path.
        path: PathBuf,
        /// One-based line number of the failed read.
        n_line: usize,
        /// Underlying IO error text.
        message: String,
    },
    /// Value of a recognized metric token is not a number.
    InvalidMetricValue {
        /// Log path.
        path: PathBuf,
        /// One-based line number.
        n_line: usize,
        /// Metric token.
        token: String,
        /// Raw value text.
        value: String,
    },
    /// Workbook write/save failure.
    Xlsx(String),
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig(msg) => write!(f, "Invalid config: {msg}"),
            Self::OpenLog { path, message } => {
                write!(f, "Failed to open log {}: {message}", path.display())
            }
            Self::ReadLog {
                path,
                n_line,
                message,
            } => write!(
                f,
                "Failed to read log {} at line {n_line}: {message}",
                path.display()
            ),
            Self::InvalidMetricValue {
                path,
                n_line,
                token,
                value,
            } => write!(
                f,
                "Non-numeric value for {token:?} in {} at line {n_line}: {value:?}",
                path.display()
            ),
            Self::Xlsx(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ConvertError {}

// #endregion
////////////////////////////////////////////////////////////////////////////////
