//! Conversion report models and mutable report builder.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Aggregate counters and diagnostics for one conversion run.
#[derive(Debug, Default, Clone)]
pub struct ReportConvert {
    /// Total log lines read.
    pub cnt_lines_scanned: u64,
    /// Lines without a delimiter or with an unrecognized token.
    pub cnt_lines_ignored: u64,
    /// Separator lines (time-column boundaries).
    pub cnt_separators: u64,
    /// Entity blocks labelled in the first time column.
    pub cnt_entities: u64,
    /// Grid cells written, labels and formulas included.
    pub cnt_cells_written: u64,
    /// Sheets added to the workbook.
    pub cnt_sheets: u64,
    /// Saved workbook path.
    pub path_file_out: Option<PathBuf>,
    /// Non-fatal warnings collected while parsing/writing.
    pub warnings: Vec<String>,
}

impl ReportConvert {
    /// Number of collected warnings.
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Machine-readable counters.
    pub fn to_dict(&self) -> BTreeMap<String, u64> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("cnt_lines_scanned".to_string(), self.cnt_lines_scanned);
        dict_counts.insert("cnt_lines_ignored".to_string(), self.cnt_lines_ignored);
        dict_counts.insert("cnt_separators".to_string(), self.cnt_separators);
        dict_counts.insert("cnt_entities".to_string(), self.cnt_entities);
        dict_counts.insert("cnt_cells_written".to_string(), self.cnt_cells_written);
        dict_counts.insert("cnt_sheets".to_string(), self.cnt_sheets);
        dict_counts.insert("cnt_warnings".to_string(), self.warning_count() as u64);
        dict_counts
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        let dict_counts = self.to_dict();
        format!(
            "{prefix} sheets={} lines={} ignored={} separators={} entities={} cells={} warnings={}",
            dict_counts["cnt_sheets"],
            dict_counts["cnt_lines_scanned"],
            dict_counts["cnt_lines_ignored"],
            dict_counts["cnt_separators"],
            dict_counts["cnt_entities"],
            dict_counts["cnt_cells_written"],
            dict_counts["cnt_warnings"]
        )
    }
}

impl fmt::Display for ReportConvert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[CONVERT]"))
    }
}

/// Mutable accumulator for conversion statistics.
#[derive(Debug, Default, Clone)]
pub struct ReportConvertBuilder {
    /// See [`ReportConvert::cnt_lines_scanned`].
    pub cnt_lines_scanned: u64,
    /// See [`ReportConvert::cnt_lines_ignored`].
    pub cnt_lines_ignored: u64,
    /// See [`ReportConvert::cnt_separators`].
    pub cnt_separators: u64,
    /// See [`ReportConvert::cnt_entities`].
    pub cnt_entities: u64,
    /// See [`ReportConvert::cnt_cells_written`].
    pub cnt_cells_written: u64,
    /// See [`ReportConvert::cnt_sheets`].
    pub cnt_sheets: u64,
    /// See [`ReportConvert::warnings`].
    pub warnings: Vec<String>,
}

impl ReportConvertBuilder {
    /// Increment scanned line count by one.
    pub fn add_scanned(&mut self) {
        self.cnt_lines_scanned += 1;
    }

    /// Increment ignored line count by one.
    pub fn add_ignored(&mut self) {
        self.cnt_lines_ignored += 1;
    }

    /// Increment separator count by one.
    pub fn add_separator(&mut self) {
        self.cnt_separators += 1;
    }

    /// Increment entity count by one.
    pub fn add_entity(&mut self) {
        self.cnt_entities += 1;
    }

    /// Increment written cell count by `value`.
    pub fn add_cells(&mut self, value: u64) {
        self.cnt_cells_written += value;
    }

    /// Increment sheet count by one.
    pub fn add_sheet(&mut self) {
        self.cnt_sheets += 1;
    }

    /// Add warning message.
    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    /// Finalize builder into immutable report.
    pub fn build(self, path_file_out: Option<PathBuf>) -> ReportConvert {
        ReportConvert {
            cnt_lines_scanned: self.cnt_lines_scanned,
            cnt_lines_ignored: self.cnt_lines_ignored,
            cnt_separators: self.cnt_separators,
            cnt_entities: self.cnt_entities,
            cnt_cells_written: self.cnt_cells_written,
            cnt_sheets: self.cnt_sheets,
            path_file_out,
            warnings: self.warnings,
        }
    }
}
