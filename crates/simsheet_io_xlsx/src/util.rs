//! Stateless helper utilities used by the XLSX writer kernel.

use crate::conf::{
    N_COLUMN_LABEL_RADIX, N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX,
    TUP_EXCEL_ILLEGAL,
};
use crate::spec::SpecSheetGrid;

////////////////////////////////////////////////////////////////////////////////
// #region CellAddressing

/// Convert zero-based column index to its alphabetic label (`0 -> A`, `26 -> AA`).
pub fn derive_column_label(col: usize) -> String {
    let mut l_chars = Vec::new();
    let mut n_rest = col + 1;
    while n_rest > 0 {
        let n_digit = (n_rest - 1) % N_COLUMN_LABEL_RADIX;
        l_chars.push(char::from(b'A' + n_digit as u8));
        n_rest = (n_rest - 1) / N_COLUMN_LABEL_RADIX;
    }
    l_chars.iter().rev().collect()
}

/// Convert alphabetic column label back to zero-based column index.
pub fn parse_column_label(label: &str) -> Result<usize, String> {
    if label.is_empty() {
        return Err("Column label must not be empty.".to_string());
    }

    let mut n_value: usize = 0;
    for chr in label.chars() {
        if !chr.is_ascii_uppercase() {
            return Err(format!("Invalid column label: {label:?}"));
        }
        let n_digit = (chr as u8 - b'A') as usize + 1;
        n_value = n_value
            .checked_mul(N_COLUMN_LABEL_RADIX)
            .and_then(|val| val.checked_add(n_digit))
            .ok_or_else(|| format!("Column label overflow: {label:?}"))?;
    }
    Ok(n_value - 1)
}

/// Convert zero-based `(row, col)` to an `A1`-style address (`(5, 2) -> C6`).
pub fn derive_cell_address(row: usize, col: usize) -> String {
    format!("{}{}", derive_column_label(col), row + 1)
}

/// Compose `= AVERAGE(C6, C11)` over `rows`, all taken from column `col`.
pub fn compose_average_formula(rows: &[usize], col: usize) -> String {
    let c_args = rows
        .iter()
        .map(|row| derive_cell_address(*row, col))
        .collect::<Vec<_>>()
        .join(", ");
    format!("= AVERAGE({c_args})")
}

/// Strip leading `=` and surrounding blanks so the text can be stored as formula XML.
pub fn derive_formula_body(formula: &str) -> &str {
    formula.trim().trim_start_matches('=').trim()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetNormalization

/// Replace invalid chars and trim to valid Excel sheet name.
pub fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    let mut c_name = name.to_string();
    for c_illegal in TUP_EXCEL_ILLEGAL {
        c_name = c_name.replace(c_illegal, replace_to);
    }
    c_name = c_name.trim().to_string();
    if c_name.is_empty() {
        c_name = "Sheet".to_string();
    }

    c_name.chars().take(N_LEN_EXCEL_SHEET_NAME_MAX).collect()
}

/// Create suffixed sheet name (`base__2`, `base__3`, ...), respecting length cap.
pub fn create_sheet_identifier(base_name: &str, part_idx: usize) -> String {
    let c_sheet_name_suffix = format!("__{part_idx}");
    let n_len_base_name_max = N_LEN_EXCEL_SHEET_NAME_MAX.saturating_sub(c_sheet_name_suffix.len());

    let c_sheet_name_base: String = base_name
        .chars()
        .take(usize::max(1, n_len_base_name_max))
        .collect();

    format!("{c_sheet_name_base}{c_sheet_name_suffix}")
}

/// Reject grids that do not fit in one Excel worksheet.
pub fn validate_grid_within_limits(grid: &SpecSheetGrid) -> Result<(), String> {
    if grid.height() > N_NROWS_EXCEL_MAX {
        return Err(format!(
            "Grid too tall: {} rows exceeds Excel limit {N_NROWS_EXCEL_MAX}.",
            grid.height()
        ));
    }
    if grid.width() > N_NCOLS_EXCEL_MAX {
        return Err(format!(
            "Grid too wide: {} columns exceeds Excel limit {N_NCOLS_EXCEL_MAX}.",
            grid.width()
        ));
    }
    Ok(())
}

/// Estimate displayed width units for text (non-ASCII counts wider).
pub fn estimate_unicode_string_width(s: &str) -> usize {
    let n_ascii = s.chars().filter(|chr| chr.is_ascii()).count();
    let n_non_ascii = s.chars().count().saturating_sub(n_ascii);
    n_ascii + (n_non_ascii as f64 * 1.6).round() as usize
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
