//! Shared XLSX specification models.

use std::collections::{BTreeMap, BTreeSet};

////////////////////////////////////////////////////////////////////////////////
// #region CellFormatSpecification

/// Cell format specification used to build `rust_xlsxwriter` formats.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecCellFormat {
    /// Font family name.
    pub font_name: Option<String>,
    /// Font size in points.
    pub font_size: Option<i64>,
    /// Bold style.
    pub bold: Option<bool>,

    /// Horizontal alignment.
    pub align: Option<String>,
    /// Vertical alignment.
    pub valign: Option<String>,

    /// Number format code.
    pub num_format: Option<String>,
}

impl SpecCellFormat {
    /// Return a new format by overlaying `patch` onto `self`.
    pub fn with_(&self, patch: SpecCellFormat) -> SpecCellFormat {
        self.merge(&patch)
    }

    /// Merge two formats with right-side non-`None` overwrite semantics.
    pub fn merge(&self, other: &SpecCellFormat) -> SpecCellFormat {
        SpecCellFormat {
            font_name: other.font_name.clone().or_else(|| self.font_name.clone()),
            font_size: other.font_size.or(self.font_size),
            bold: other.bold.or(self.bold),
            align: other.align.clone().or_else(|| self.align.clone()),
            valign: other.valign.clone().or_else(|| self.valign.clone()),
            num_format: other.num_format.clone().or_else(|| self.num_format.clone()),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetGrid

/// One cell value in a sheet grid.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumCellValue {
    /// Text value.
    String(String),
    /// Numeric value.
    Number(f64),
    /// Spreadsheet formula text, kept exactly as composed (e.g. `= AVERAGE(C6)`).
    Formula(String),
}

/// Sparse two-dimensional cell grid for one sheet.
///
/// Rows and columns are zero-based. Writing the same cell twice keeps the
/// last value, matching worksheet overwrite semantics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpecSheetGrid {
    cells: BTreeMap<(usize, usize), EnumCellValue>,
    rows_header: BTreeSet<usize>,
}

impl SpecSheetGrid {
    /// Create an empty grid.
    pub fn new() -> Self {
        Self::default()
    }

    /// Write text at `(row, col)`.
    pub fn write_string(&mut self, row: usize, col: usize, value: impl Into<String>) {
        self.cells
            .insert((row, col), EnumCellValue::String(value.into()));
    }

    /// Write a number at `(row, col)`.
    pub fn write_number(&mut self, row: usize, col: usize, value: f64) {
        self.cells.insert((row, col), EnumCellValue::Number(value));
    }

    /// Write formula text at `(row, col)`.
    pub fn write_formula(&mut self, row: usize, col: usize, formula: impl Into<String>) {
        self.cells
            .insert((row, col), EnumCellValue::Formula(formula.into()));
    }

    /// Mark `row` as a header row (rendered with the header format).
    pub fn mark_header_row(&mut self, row: usize) {
        self.rows_header.insert(row);
    }

    /// Return whether `row` was marked as header row.
    pub fn is_header_row(&self, row: usize) -> bool {
        self.rows_header.contains(&row)
    }

    /// Cell value at `(row, col)`, if any.
    pub fn get(&self, row: usize, col: usize) -> Option<&EnumCellValue> {
        self.cells.get(&(row, col))
    }

    /// Text content at `(row, col)` when the cell is a string.
    pub fn get_str(&self, row: usize, col: usize) -> Option<&str> {
        match self.cells.get(&(row, col)) {
            Some(EnumCellValue::String(val)) => Some(val.as_str()),
            _ => None,
        }
    }

    /// Numeric content at `(row, col)` when the cell is a number.
    pub fn get_number(&self, row: usize, col: usize) -> Option<f64> {
        match self.cells.get(&(row, col)) {
            Some(EnumCellValue::Number(val)) => Some(*val),
            _ => None,
        }
    }

    /// Formula text at `(row, col)` when the cell is a formula.
    pub fn get_formula(&self, row: usize, col: usize) -> Option<&str> {
        match self.cells.get(&(row, col)) {
            Some(EnumCellValue::Formula(val)) => Some(val.as_str()),
            _ => None,
        }
    }

    /// Iterate cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (&(usize, usize), &EnumCellValue)> {
        self.cells.iter()
    }

    /// Number of written cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Return whether no cell was written.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of rows spanned (`max row + 1`), zero for an empty grid.
    pub fn height(&self) -> usize {
        self.cells
            .keys()
            .map(|(row, _)| row + 1)
            .max()
            .unwrap_or(0)
    }

    /// Number of columns spanned (`max col + 1`), zero for an empty grid.
    pub fn width(&self) -> usize {
        self.cells
            .keys()
            .map(|(_, col)| col + 1)
            .max()
            .unwrap_or(0)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region WriteOptions

/// Autofit rule for column width inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumAutofitColumnsRule {
    /// Disable autofit.
    None,
    /// Infer width from text cells only (default).
    #[default]
    Text,
    /// Infer width from every cell.
    All,
}

/// Autofit policy for per-sheet write call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecAutofitCellsPolicy {
    /// Autofit width inference rule.
    pub rule_columns: EnumAutofitColumnsRule,
    /// Minimum final width.
    pub width_cell_min: usize,
    /// Maximum final width.
    pub width_cell_max: usize,
    /// Width padding added after inference.
    pub width_cell_padding: usize,
}

impl Default for SpecAutofitCellsPolicy {
    fn default() -> Self {
        Self {
            rule_columns: EnumAutofitColumnsRule::Text,
            width_cell_min: 8,
            width_cell_max: 60,
            width_cell_padding: 2,
        }
    }
}

/// Writer-wide options controlling formatting defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecXlsxWriteOptions {
    /// Base patch merged into every cell format.
    pub base_format_patch: SpecCellFormat,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportSpecification

/// Summary of one sheet emitted to the workbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSheetSummary {
    /// Actual unique sheet name in workbook.
    pub sheet_name: String,
    /// Rows spanned by the grid.
    pub n_rows: usize,
    /// Columns spanned by the grid.
    pub n_cols: usize,
    /// Number of written cells.
    pub n_cells: usize,
}

/// Per-write call report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecXlsxReport {
    /// Sheets produced by the write call.
    pub sheets: Vec<SpecSheetSummary>,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl SpecXlsxReport {
    /// Add a warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        self.warnings.push(msg.as_ref().to_string());
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sheet_grid_overwrite_keeps_last_value() {
        let mut grid = SpecSheetGrid::new();
        grid.write_string(6, 1, "total throughput/demand(%)");
        grid.write_string(6, 1, "Channel 36");
        grid.write_number(6, 2, 12.5);

        assert_eq!(grid.get_str(6, 1), Some("Channel 36"));
        assert_eq!(grid.get_number(6, 2), Some(12.5));
        assert_eq!(grid.len(), 2);
    }

    #[test]
    fn test_sheet_grid_extent() {
        let mut grid = SpecSheetGrid::new();
        assert_eq!((grid.height(), grid.width()), (0, 0));

        grid.write_string(1, 2, "5.0");
        grid.write_formula(3, 7, "= AVERAGE(C6)");
        assert_eq!(grid.height(), 4);
        assert_eq!(grid.width(), 8);
        assert_eq!(grid.get_formula(3, 7), Some("= AVERAGE(C6)"));
        assert_eq!(grid.get_str(3, 7), None);
    }

    #[test]
    fn test_cell_format_merge_prefers_right_side() {
        let base = SpecCellFormat {
            font_name: Some("Times New Roman".to_string()),
            align: Some("left".to_string()),
            ..Default::default()
        };
        let merged = base.with_(SpecCellFormat {
            align: Some("right".to_string()),
            bold: Some(true),
            ..Default::default()
        });

        assert_eq!(merged.font_name.as_deref(), Some("Times New Roman"));
        assert_eq!(merged.align.as_deref(), Some("right"));
        assert_eq!(merged.bold, Some(true));
    }
}
