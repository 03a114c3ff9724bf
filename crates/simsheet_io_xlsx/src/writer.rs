//! XLSX writer kernel that renders sheet grids into workbook output.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use log::debug;
use rust_xlsxwriter::{Format, FormatAlign, Workbook, Worksheet, XlsxError};

use crate::conf::{EnumFmtKey, derive_default_xlsx_formats};
use crate::spec::{
    EnumAutofitColumnsRule, EnumCellValue, SpecAutofitCellsPolicy, SpecCellFormat, SpecSheetGrid,
    SpecSheetSummary, SpecXlsxReport, SpecXlsxWriteOptions,
};
use crate::util::{
    create_sheet_identifier, derive_formula_body, estimate_unicode_string_width,
    sanitize_sheet_name, validate_grid_within_limits,
};

/// Per-sheet call options.
#[derive(Default, Debug, Clone)]
pub struct SpecXlsxSheetWriteOptions {
    /// Number of frozen columns.
    pub col_freeze: usize,
    /// Number of frozen rows.
    pub row_freeze: usize,
    /// Column autofit policy.
    pub policy_autofit: SpecAutofitCellsPolicy,
}

/// Stateful workbook writer.
pub struct XlsxWriter {
    path_file_out: PathBuf,
    workbook: Workbook,
    fmt_text: SpecCellFormat,
    fmt_decimal: SpecCellFormat,
    fmt_header: SpecCellFormat,
    write_options: SpecXlsxWriteOptions,
    set_sheet_names_existing: BTreeSet<String>,
    l_reports: Vec<SpecXlsxReport>,
    if_closed: bool,
}

impl XlsxWriter {
    /// Create writer bound to output path and format/options presets.
    ///
    /// The workbook is buffered in memory until [`Self::close`] is called.
    pub fn new(
        path_file_out: PathBuf,
        fmt_text: SpecCellFormat,
        fmt_decimal: SpecCellFormat,
        fmt_header: SpecCellFormat,
        write_options: SpecXlsxWriteOptions,
    ) -> Self {
        Self {
            path_file_out,
            workbook: Workbook::new(),
            fmt_text,
            fmt_decimal,
            fmt_header,
            write_options,
            set_sheet_names_existing: BTreeSet::new(),
            l_reports: Vec::new(),
            if_closed: false,
        }
    }

    /// Create writer using the presets from [`derive_default_xlsx_formats`].
    pub fn with_default_formats(
        path_file_out: PathBuf,
        write_options: SpecXlsxWriteOptions,
    ) -> Result<Self, String> {
        let dict_default_fmts = derive_default_xlsx_formats();
        let pick = |key: EnumFmtKey| {
            dict_default_fmts
                .get(key.as_str())
                .cloned()
                .ok_or_else(|| format!("Missing default format: {}", key.as_str()))
        };

        Ok(Self::new(
            path_file_out,
            pick(EnumFmtKey::Text)?,
            pick(EnumFmtKey::Decimal)?,
            pick(EnumFmtKey::Header)?,
            write_options,
        ))
    }

    /// Return output file path as string.
    pub fn file_out(&self) -> String {
        self.path_file_out.to_string_lossy().to_string()
    }

    /// Return immutable snapshot of per-sheet write reports.
    pub fn report(&self) -> Vec<SpecXlsxReport> {
        self.l_reports.clone()
    }

    /// Flush workbook to disk. Idempotent.
    pub fn close(&mut self) -> Result<(), String> {
        if self.if_closed {
            return Ok(());
        }
        self.workbook
            .save(&self.path_file_out)
            .map_err(derive_xlsx_error_text)?;
        self.if_closed = true;
        debug!("Saved workbook {}", self.path_file_out.display());
        Ok(())
    }

    /// Write one sheet from an in-memory grid.
    pub fn write_sheet_from_grid(
        &mut self,
        grid: &SpecSheetGrid,
        sheet_name: &str,
        options: &SpecXlsxSheetWriteOptions,
    ) -> Result<(), String> {
        if self.if_closed {
            return Err("Cannot write after close().".to_string());
        }
        validate_policy_autofit(&options.policy_autofit)?;
        validate_grid_within_limits(grid)?;

        let mut report = SpecXlsxReport::default();

        let c_sheet_name_clean = sanitize_sheet_name(sheet_name, "_");
        if c_sheet_name_clean != sheet_name {
            report.warn(format!(
                "Sheet name {sheet_name:?} sanitized to {c_sheet_name_clean:?}."
            ));
        }
        let sheet_name_unique = self.derive_unique_sheet_name(&c_sheet_name_clean);

        let fmt_text = derive_rust_xlsx_format(
            &self.fmt_text.merge(&self.write_options.base_format_patch),
        );
        let fmt_decimal = derive_rust_xlsx_format(
            &self
                .fmt_decimal
                .merge(&self.write_options.base_format_patch),
        );
        let fmt_header = derive_rust_xlsx_format(
            &self.fmt_header.merge(&self.write_options.base_format_patch),
        );

        let worksheet = self.workbook.add_worksheet();
        worksheet
            .set_name(&sheet_name_unique)
            .map_err(derive_xlsx_error_text)?;

        let mut dict_width_by_col: BTreeMap<usize, usize> = BTreeMap::new();
        for ((row_idx, col_idx), value) in grid.iter() {
            let format = if grid.is_header_row(*row_idx) {
                &fmt_header
            } else {
                match value {
                    EnumCellValue::String(_) => &fmt_text,
                    EnumCellValue::Number(_) | EnumCellValue::Formula(_) => &fmt_decimal,
                }
            };
            write_cell_with_format(worksheet, *row_idx, *col_idx, value, format)?;

            let n_width = estimate_width_len(value, options.policy_autofit.rule_columns);
            let n_width_recorded = dict_width_by_col.entry(*col_idx).or_insert(0);
            *n_width_recorded = usize::max(*n_width_recorded, n_width);
        }

        if options.row_freeze > 0 || options.col_freeze > 0 {
            worksheet
                .set_freeze_panes(
                    cast_row_num(options.row_freeze)?,
                    cast_col_num(options.col_freeze)?,
                )
                .map_err(derive_xlsx_error_text)?;
        }

        if !matches!(
            options.policy_autofit.rule_columns,
            EnumAutofitColumnsRule::None
        ) {
            let n_min = usize::max(1, options.policy_autofit.width_cell_min);
            let n_max = usize::min(
                255,
                usize::max(n_min, options.policy_autofit.width_cell_max),
            );
            let n_pad = options.policy_autofit.width_cell_padding;

            for (n_idx_col, n_width_recorded) in &dict_width_by_col {
                if *n_width_recorded == 0 {
                    continue;
                }
                let n_width_final = usize::min(n_max, usize::max(n_min, n_width_recorded + n_pad));
                worksheet
                    .set_column_width(cast_col_num(*n_idx_col)?, n_width_final as f64)
                    .map_err(derive_xlsx_error_text)?;
            }
        }

        debug!(
            "Wrote sheet {sheet_name_unique:?}: {} cells over {}x{}",
            grid.len(),
            grid.height(),
            grid.width()
        );
        report.sheets.push(SpecSheetSummary {
            sheet_name: sheet_name_unique,
            n_rows: grid.height(),
            n_cols: grid.width(),
            n_cells: grid.len(),
        });
        self.l_reports.push(report);
        Ok(())
    }

    fn derive_unique_sheet_name(&mut self, name: &str) -> String {
        if !self.set_sheet_names_existing.contains(name) {
            self.set_sheet_names_existing.insert(name.to_string());
            return name.to_string();
        }

        let mut n_idx = 2usize;
        loop {
            let candidate = create_sheet_identifier(name, n_idx);
            if !self.set_sheet_names_existing.contains(&candidate) {
                self.set_sheet_names_existing.insert(candidate.clone());
                return candidate;
            }
            n_idx += 1;
        }
    }
}

/// Estimate displayed width units for one cell value under `rule`.
///
/// Used by autofit inference logic.
pub fn estimate_width_len(value: &EnumCellValue, rule: EnumAutofitColumnsRule) -> usize {
    match (rule, value) {
        (EnumAutofitColumnsRule::None, _) => 0,
        (_, EnumCellValue::String(s)) => estimate_unicode_string_width(s),
        (EnumAutofitColumnsRule::Text, _) => 0,
        (EnumAutofitColumnsRule::All, EnumCellValue::Number(n)) => format!("{n:.4}").len(),
        (EnumAutofitColumnsRule::All, EnumCellValue::Formula(f)) => {
            estimate_unicode_string_width(f)
        }
    }
}

fn validate_policy_autofit(policy_autofit: &SpecAutofitCellsPolicy) -> Result<(), String> {
    if policy_autofit.width_cell_min == 0 {
        return Err("policy_autofit.width_cell_min must be >= 1.".to_string());
    }
    if policy_autofit.width_cell_max < policy_autofit.width_cell_min {
        return Err(
            "policy_autofit.width_cell_max must be >= policy_autofit.width_cell_min.".to_string(),
        );
    }
    Ok(())
}

fn write_cell_with_format(
    worksheet: &mut Worksheet,
    row_idx: usize,
    col_idx: usize,
    value: &EnumCellValue,
    format: &Format,
) -> Result<(), String> {
    match value {
        EnumCellValue::String(val) => {
            worksheet
                .write_string_with_format(
                    cast_row_num(row_idx)?,
                    cast_col_num(col_idx)?,
                    val,
                    format,
                )
                .map_err(derive_xlsx_error_text)?;
        }
        EnumCellValue::Number(val) => {
            worksheet
                .write_number_with_format(
                    cast_row_num(row_idx)?,
                    cast_col_num(col_idx)?,
                    *val,
                    format,
                )
                .map_err(derive_xlsx_error_text)?;
        }
        EnumCellValue::Formula(val) => {
            worksheet
                .write_formula_with_format(
                    cast_row_num(row_idx)?,
                    cast_col_num(col_idx)?,
                    derive_formula_body(val),
                    format,
                )
                .map_err(derive_xlsx_error_text)?;
        }
    }
    Ok(())
}

fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = Format::new();

    if let Some(val) = &spec.font_name {
        format = format.set_font_name(val.clone());
    }
    if let Some(val) = spec.font_size {
        format = format.set_font_size(val as f64);
    }
    if spec.bold.unwrap_or(false) {
        format = format.set_bold();
    }

    if let Some(val) = &spec.align
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }
    if let Some(val) = &spec.valign
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }

    if let Some(val) = &spec.num_format {
        format = format.set_num_format(val.clone());
    }

    format
}

fn derive_format_align(align: &str) -> Option<FormatAlign> {
    let value = align.trim().to_ascii_lowercase();
    match value.as_str() {
        "general" => Some(FormatAlign::General),
        "left" => Some(FormatAlign::Left),
        "center" => Some(FormatAlign::Center),
        "right" => Some(FormatAlign::Right),
        "top" => Some(FormatAlign::Top),
        "bottom" => Some(FormatAlign::Bottom),
        "vcenter" | "vertical_center" => Some(FormatAlign::VerticalCenter),
        _ => None,
    }
}

fn cast_row_num(value: usize) -> Result<u32, String> {
    u32::try_from(value).map_err(|_| format!("row index overflow: {value}"))
}

fn cast_col_num(value: usize) -> Result<u16, String> {
    u16::try_from(value).map_err(|_| format!("column index overflow: {value}"))
}

fn derive_xlsx_error_text(err: XlsxError) -> String {
    format!("xlsx write error: {err}")
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::*;

    struct TestDir {
        path: PathBuf,
    }

    impl TestDir {
        fn new() -> Self {
            let n = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .expect("clock")
                .as_nanos();
            let path = std::env::temp_dir().join(format!("simsheet_xlsx_test_{n}"));
            std::fs::create_dir_all(&path).expect("create test dir");
            Self { path }
        }

        fn path(&self) -> &Path {
            &self.path
        }
    }

    impl Drop for TestDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.path);
        }
    }

    fn make_grid() -> SpecSheetGrid {
        let mut grid = SpecSheetGrid::new();
        grid.mark_header_row(1);
        grid.write_string(1, 2, "5.0");
        grid.write_string(2, 0, "AP 0");
        grid.write_string(2, 1, "throughput");
        grid.write_number(2, 2, 12.25);
        grid.write_formula(2, 5, "= AVERAGE(C6)");
        grid
    }

    #[test]
    fn test_write_grid_and_close_creates_xlsx_file() {
        let dir = TestDir::new();
        let path_out = dir.path().join("test_1.xlsx");
        let mut writer =
            XlsxWriter::with_default_formats(path_out.clone(), SpecXlsxWriteOptions::default())
                .expect("writer");

        writer
            .write_sheet_from_grid(&make_grid(), "opt", &SpecXlsxSheetWriteOptions::default())
            .expect("write sheet");
        writer.close().expect("close");
        writer.close().expect("close is idempotent");

        let v_bytes = std::fs::read(&path_out).expect("read output");
        assert!(v_bytes.starts_with(b"PK"));

        let l_reports = writer.report();
        assert_eq!(l_reports.len(), 1);
        assert_eq!(
            l_reports[0].sheets[0],
            SpecSheetSummary {
                sheet_name: "opt".to_string(),
                n_rows: 3,
                n_cols: 6,
                n_cells: 5,
            }
        );
    }

    #[test]
    fn test_write_after_close_is_rejected() {
        let dir = TestDir::new();
        let mut writer = XlsxWriter::with_default_formats(
            dir.path().join("closed.xlsx"),
            SpecXlsxWriteOptions::default(),
        )
        .expect("writer");
        writer.close().expect("close");

        let result =
            writer.write_sheet_from_grid(&make_grid(), "opt", &SpecXlsxSheetWriteOptions::default());
        assert_eq!(result, Err("Cannot write after close().".to_string()));
    }

    #[test]
    fn test_duplicate_and_illegal_sheet_names_are_made_unique() {
        let dir = TestDir::new();
        let mut writer = XlsxWriter::with_default_formats(
            dir.path().join("names.xlsx"),
            SpecXlsxWriteOptions::default(),
        )
        .expect("writer");
        let options = SpecXlsxSheetWriteOptions::default();

        writer
            .write_sheet_from_grid(&make_grid(), "opt", &options)
            .expect("first");
        writer
            .write_sheet_from_grid(&make_grid(), "opt", &options)
            .expect("second");
        writer
            .write_sheet_from_grid(&make_grid(), "a/b", &options)
            .expect("third");

        let l_names: Vec<String> = writer
            .report()
            .iter()
            .map(|report| report.sheets[0].sheet_name.clone())
            .collect();
        assert_eq!(l_names, vec!["opt", "opt__2", "a_b"]);
        assert_eq!(writer.report()[2].warnings.len(), 1);
    }

    #[test]
    fn test_estimate_width_len_by_rule() {
        let text = EnumCellValue::String("average throughput".to_string());
        let number = EnumCellValue::Number(1.5);

        assert_eq!(estimate_width_len(&text, EnumAutofitColumnsRule::Text), 18);
        assert_eq!(estimate_width_len(&number, EnumAutofitColumnsRule::Text), 0);
        assert_eq!(estimate_width_len(&number, EnumAutofitColumnsRule::All), 6);
        assert_eq!(estimate_width_len(&text, EnumAutofitColumnsRule::None), 0);
    }

    #[test]
    fn test_default_presets_render_to_xlsx_formats() {
        let dict_fmt = derive_default_xlsx_formats();

        let fmt_header = derive_rust_xlsx_format(&dict_fmt[EnumFmtKey::Header.as_str()]);
        let fmt_header_expected = Format::new()
            .set_font_name("Times New Roman")
            .set_font_size(11)
            .set_bold()
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter);
        assert_eq!(fmt_header, fmt_header_expected);

        let fmt_decimal = derive_rust_xlsx_format(&dict_fmt[EnumFmtKey::Decimal.as_str()]);
        let fmt_decimal_expected = Format::new()
            .set_font_name("Times New Roman")
            .set_font_size(11)
            .set_align(FormatAlign::Right)
            .set_align(FormatAlign::VerticalCenter)
            .set_num_format("0.0000");
        assert_eq!(fmt_decimal, fmt_decimal_expected);
    }
}
