//! `simsheet_io_xlsx` v1:
//! Sheet grid model and XLSX writer kernel.
//!
//! Modules:
//! - `conf`   : Excel limits and default format presets
//! - `spec`   : grid, format, option and report models
//! - `util`   : cell addressing and sheet-name helpers
//! - `writer` : `rust_xlsxwriter`-backed workbook writer
pub mod conf;
pub mod spec;
pub mod util;
pub mod writer;

pub use conf::{
    N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX, TUP_EXCEL_ILLEGAL,
};
pub use spec::{
    EnumAutofitColumnsRule, EnumCellValue, SpecAutofitCellsPolicy, SpecCellFormat,
    SpecSheetGrid, SpecSheetSummary, SpecXlsxReport, SpecXlsxWriteOptions,
};
pub use util::{
    compose_average_formula, derive_cell_address, derive_column_label, parse_column_label,
    sanitize_sheet_name,
};
pub use writer::{SpecXlsxSheetWriteOptions, XlsxWriter};
