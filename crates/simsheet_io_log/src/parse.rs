//! Line classification and the cursor state machine that places log values
//! into the sheet grid.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use log::debug;
use simsheet_io_xlsx::{SpecSheetGrid, compose_average_formula};

use crate::conf::{
    C_KEY_VALUE_DELIMITER, C_SEPARATOR_MARKER, C_TOKEN_CHANNEL_MARKER, C_TOKEN_INDEX,
    C_TOKEN_TIME, N_COL_DATA_START, N_COL_ENTITY_LABEL, N_COL_METRIC_LABEL,
    N_COL_SUMMARY_OFFSET, N_VALUE_SKIP_CHARS,
};
use crate::report::ReportConvertBuilder;
use crate::spec::{
    ConvertError, EnumLogLine, SpecBlockLayout, SpecBlockOutcome, SpecBlockProfile,
};

/// Classify one raw log line.
///
/// Separator detection wins over the key-value split, so `index : ---` is a
/// separator.
pub fn classify_line(line: &str) -> EnumLogLine<'_> {
    if line.contains(C_SEPARATOR_MARKER) {
        return EnumLogLine::Separator;
    }
    let Some(n_pos) = line.find(C_KEY_VALUE_DELIMITER) else {
        return EnumLogLine::Ignored;
    };

    let token = &line[..n_pos];
    let c_rest = &line[n_pos + C_KEY_VALUE_DELIMITER.len()..];
    // skip by characters, not bytes, so a multibyte pad keeps the value
    let value = c_rest
        .char_indices()
        .nth(N_VALUE_SKIP_CHARS)
        .map_or("", |(n_idx, _)| &c_rest[n_idx..]);
    let value = value.trim_end_matches(['\n', '\r']);
    EnumLogLine::KeyValue { token, value }
}

/// Cursor state for one log file.
#[derive(Debug, Clone)]
pub struct ParserState {
    profile: SpecBlockProfile,
    layout: SpecBlockLayout,
    path_source: PathBuf,
    row: usize,
    col: usize,
    row_max: usize,
    if_first_column: bool,
    if_time_seen: bool,
    if_column_has_data: bool,
    rows_ratio: Vec<usize>,
    rows_end_by_col: Vec<usize>,
    n_line: usize,
}

impl ParserState {
    /// Fresh state positioned at `layout.row_start`, first data column.
    pub fn new(
        profile: SpecBlockProfile,
        layout: SpecBlockLayout,
        path_source: impl Into<PathBuf>,
    ) -> Self {
        Self {
            profile,
            layout,
            path_source: path_source.into(),
            row: layout.row_start,
            col: N_COL_DATA_START,
            row_max: 0,
            if_first_column: false,
            if_time_seen: false,
            if_column_has_data: false,
            rows_ratio: Vec::new(),
            rows_end_by_col: Vec::new(),
            n_line: 0,
        }
    }

    /// Current row cursor.
    pub fn row(&self) -> usize {
        self.row
    }

    /// Current column cursor.
    pub fn col(&self) -> usize {
        self.col
    }

    /// Whether labels are still being written (first time column).
    pub fn is_first_column(&self) -> bool {
        self.if_first_column
    }

    /// Demand-ratio rows recorded so far.
    pub fn rows_ratio(&self) -> &[usize] {
        &self.rows_ratio
    }

    /// Apply one raw line, writing any produced cells into `grid`.
    pub fn apply_line(
        &mut self,
        line: &str,
        grid: &mut SpecSheetGrid,
        builder: &mut ReportConvertBuilder,
    ) -> Result<(), ConvertError> {
        self.n_line += 1;
        builder.add_scanned();

        match classify_line(line) {
            EnumLogLine::Separator => {
                builder.add_separator();
                self.advance_column();
            }
            EnumLogLine::Ignored => builder.add_ignored(),
            EnumLogLine::KeyValue { token, value } => {
                self.apply_key_value(token, value, grid, builder)?;
            }
        }
        Ok(())
    }

    fn advance_column(&mut self) {
        self.col += 1;
        self.if_first_column = false;
        self.row_max = usize::max(self.row_max, self.row);
        if self.if_column_has_data {
            self.rows_end_by_col.push(self.row);
        }
        self.if_column_has_data = false;
        self.row = self.layout.row_start;
    }

    fn apply_key_value(
        &mut self,
        token: &str,
        value: &str,
        grid: &mut SpecSheetGrid,
        builder: &mut ReportConvertBuilder,
    ) -> Result<(), ConvertError> {
        if token == C_TOKEN_TIME {
            if !self.if_time_seen {
                self.if_time_seen = true;
                self.if_first_column = true;
            }
            grid.mark_header_row(self.layout.row_header);
            grid.write_string(self.layout.row_header, self.col, value);
            builder.add_cells(1);
            self.if_column_has_data = true;
            return Ok(());
        }

        if token == C_TOKEN_INDEX {
            self.row += 1;
            self.if_column_has_data = true;
            if self.if_first_column {
                grid.write_string(
                    self.row,
                    N_COL_ENTITY_LABEL,
                    format!("{} {value}", self.profile.kind.label_prefix()),
                );
                for (n_offset, c_label) in self.profile.labels_metric.iter().enumerate() {
                    grid.write_string(self.row + n_offset, N_COL_METRIC_LABEL, c_label.as_str());
                }
                builder.add_cells(1 + self.profile.labels_metric.len() as u64);
                builder.add_entity();
                let n_offset_ratio = self.profile.labels_metric.len().saturating_sub(1);
                self.rows_ratio.push(self.row + n_offset_ratio);
            }
            return Ok(());
        }

        if self.profile.tokens_metric.iter().any(|val| val == token) {
            let n_value = self.parse_metric_value(token, value)?;
            grid.write_number(self.row, self.col, n_value);
            builder.add_cells(1);
            self.row += 1;
            self.if_column_has_data = true;
            return Ok(());
        }

        if self.profile.if_channel_metrics && token.contains(C_TOKEN_CHANNEL_MARKER) {
            if self.if_first_column {
                grid.write_string(self.row, N_COL_METRIC_LABEL, token);
                builder.add_cells(1);
            }
            let n_value = self.parse_metric_value(token, value)?;
            grid.write_number(self.row, self.col, n_value);
            builder.add_cells(1);
            self.row += 1;
            self.if_column_has_data = true;
            return Ok(());
        }

        builder.add_ignored();
        Ok(())
    }

    fn parse_metric_value(&self, token: &str, value: &str) -> Result<f64, ConvertError> {
        value
            .trim()
            .parse::<f64>()
            .map_err(|_| ConvertError::InvalidMetricValue {
                path: self.path_source.clone(),
                n_line: self.n_line,
                token: token.to_string(),
                value: value.to_string(),
            })
    }

    /// Close the block: write the summary formula and report layout warnings.
    pub fn finish(
        mut self,
        grid: &mut SpecSheetGrid,
        builder: &mut ReportConvertBuilder,
    ) -> SpecBlockOutcome {
        self.row_max = usize::max(self.row_max, self.row);
        if self.if_column_has_data {
            self.rows_end_by_col.push(self.row);
        }

        let c_source = self.path_source.display();
        let c_kind = self.profile.kind;
        if !self.if_time_seen {
            builder.add_warning(format!(
                "{c_kind} log {c_source}: no Time line, entity labels were not written."
            ));
        }
        if self.rows_ratio.is_empty() {
            builder.add_warning(format!(
                "{c_kind} log {c_source}: no labelled entities, summary formula is empty."
            ));
        }
        if let Some(n_row_first) = self.rows_end_by_col.first()
            && self.rows_end_by_col.iter().any(|row| row != n_row_first)
        {
            builder.add_warning(format!(
                "{c_kind} log {c_source}: time columns end on different rows {:?}.",
                self.rows_end_by_col
            ));
        }

        // a trailing separator leaves the cursor on an empty column
        let n_col_formula_source = if self.if_column_has_data {
            self.col
        } else {
            usize::max(N_COL_DATA_START, self.col - 1)
        };
        let cell_summary = (self.profile.row_summary, self.col + N_COL_SUMMARY_OFFSET);
        let formula = compose_average_formula(&self.rows_ratio, n_col_formula_source);
        grid.write_formula(cell_summary.0, cell_summary.1, formula.as_str());
        builder.add_cells(1);

        debug!(
            "{c_kind} block {c_source}: {} entities, {} columns, max row {}",
            self.rows_ratio.len(),
            self.col - N_COL_DATA_START + 1,
            self.row_max
        );

        SpecBlockOutcome {
            row_max: self.row_max,
            col_end: self.col,
            rows_ratio: self.rows_ratio,
            cell_summary,
            formula,
        }
    }
}

/// Stream every line of `reader` through a fresh [`ParserState`] and close it.
pub fn parse_block<R: BufRead>(
    reader: R,
    path_source: &Path,
    profile: SpecBlockProfile,
    layout: SpecBlockLayout,
    grid: &mut SpecSheetGrid,
    builder: &mut ReportConvertBuilder,
) -> Result<SpecBlockOutcome, ConvertError> {
    let mut state = ParserState::new(profile, layout, path_source);
    for (n_idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|err| ConvertError::ReadLog {
            path: path_source.to_path_buf(),
            n_line: n_idx + 1,
            message: err.to_string(),
        })?;
        state.apply_line(&line, grid, builder)?;
    }
    Ok(state.finish(grid, builder))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::conf::{N_ROW_AP_START, derive_default_block_profile};
    use crate::spec::EnumEntityKind;

    fn layout_ap() -> SpecBlockLayout {
        SpecBlockLayout {
            row_start: N_ROW_AP_START,
            row_header: N_ROW_AP_START,
        }
    }

    fn run(
        text: &str,
        kind: EnumEntityKind,
        layout: SpecBlockLayout,
        grid: &mut SpecSheetGrid,
    ) -> (SpecBlockOutcome, ReportConvertBuilder) {
        let mut builder = ReportConvertBuilder::default();
        let outcome = parse_block(
            Cursor::new(text.as_bytes()),
            Path::new("mem.log"),
            derive_default_block_profile(kind),
            layout,
            grid,
            &mut builder,
        )
        .expect("parse");
        (outcome, builder)
    }

    const TXT_STA_ONE: &str = "Time : 5.0\n\
        index : 0\n\
        throughput : 1.5\n\
        average throughput : 1.25\n\
        minimum throughput : 0.5\n\
        maximum throughput : 2\n\
        throughput/demand(%) : 75\n";

    #[test]
    fn test_classify_line() {
        assert_eq!(classify_line("----------"), EnumLogLine::Separator);
        assert_eq!(classify_line("index : ---"), EnumLogLine::Separator);
        assert_eq!(classify_line(""), EnumLogLine::Ignored);
        assert_eq!(classify_line("Time: 5"), EnumLogLine::Ignored);
        assert_eq!(
            classify_line("Time : 5.0\n"),
            EnumLogLine::KeyValue {
                token: "Time",
                value: "5.0"
            }
        );
        assert_eq!(
            classify_line("a : b : c"),
            EnumLogLine::KeyValue {
                token: "a",
                value: "b : c"
            }
        );
        assert_eq!(
            classify_line("index :"),
            EnumLogLine::KeyValue {
                token: "index",
                value: ""
            }
        );
    }

    #[test]
    fn test_classify_line_skips_one_char_after_delimiter() {
        assert_eq!(
            classify_line("Time :é5"),
            EnumLogLine::KeyValue {
                token: "Time",
                value: "5"
            }
        );
        assert_eq!(
            classify_line("Time :\u{3000}6.5\n"),
            EnumLogLine::KeyValue {
                token: "Time",
                value: "6.5"
            }
        );
        assert_eq!(
            classify_line("Time :5"),
            EnumLogLine::KeyValue {
                token: "Time",
                value: ""
            }
        );
    }

    #[test]
    fn test_entity_metrics_land_in_consecutive_rows() {
        let mut grid = SpecSheetGrid::new();
        let layout = SpecBlockLayout {
            row_start: 10,
            row_header: 10,
        };
        let (outcome, builder) = run(TXT_STA_ONE, EnumEntityKind::Station, layout, &mut grid);

        assert_eq!(grid.get_str(10, 2), Some("5.0"));
        assert!(grid.is_header_row(10));
        assert_eq!(grid.get_str(11, 0), Some("STA 0"));
        assert_eq!(grid.get_str(11, 1), Some("throughput"));
        assert_eq!(grid.get_str(15, 1), Some("throughput/demand(%)"));
        let l_values: Vec<Option<f64>> = (11..16).map(|row| grid.get_number(row, 2)).collect();
        assert_eq!(
            l_values,
            vec![Some(1.5), Some(1.25), Some(0.5), Some(2.0), Some(75.0)]
        );

        assert_eq!(outcome.rows_ratio, vec![15]);
        assert_eq!(outcome.row_max, 16);
        assert_eq!(outcome.cell_summary, (3, 5));
        assert_eq!(grid.get_formula(3, 5), Some("= AVERAGE(C16)"));
        assert_eq!(builder.cnt_entities, 1);
        assert!(builder.warnings.is_empty());
    }

    #[test]
    fn test_no_separator_keeps_single_first_column() {
        let mut grid = SpecSheetGrid::new();
        let mut builder = ReportConvertBuilder::default();
        let mut state = ParserState::new(
            derive_default_block_profile(EnumEntityKind::Station),
            layout_ap(),
            "mem.log",
        );
        for line in TXT_STA_ONE.lines() {
            state
                .apply_line(line, &mut grid, &mut builder)
                .expect("line");
            if line.starts_with("Time") || state.rows_ratio().len() == 1 {
                assert!(state.is_first_column());
            }
        }
        assert_eq!(state.col(), 2);
        assert_eq!(state.row(), 7);
        let outcome = state.finish(&mut grid, &mut builder);
        assert_eq!(outcome.col_end, 2);
        assert_eq!(grid.width(), 6);
    }

    #[test]
    fn test_separators_advance_columns_and_write_labels_once() {
        let text = format!(
            "{TXT_STA_ONE}---\n{}---\n{}",
            TXT_STA_ONE.replace("5.0", "6.0").replace("1.5", "3"),
            TXT_STA_ONE.replace("5.0", "7.0").replace(": 75", ": 80")
        );
        let mut grid = SpecSheetGrid::new();
        let layout = SpecBlockLayout {
            row_start: 1,
            row_header: 1,
        };
        let (outcome, builder) = run(&text, EnumEntityKind::Station, layout, &mut grid);

        assert_eq!(outcome.col_end, 4);
        assert_eq!(builder.cnt_separators, 2);
        assert_eq!(grid.get_str(1, 2), Some("5.0"));
        assert_eq!(grid.get_str(1, 3), Some("6.0"));
        assert_eq!(grid.get_str(1, 4), Some("7.0"));
        assert_eq!(grid.get_number(2, 3), Some(3.0));
        assert_eq!(grid.get_number(6, 4), Some(80.0));

        assert_eq!(builder.cnt_entities, 1);
        assert_eq!(outcome.rows_ratio, vec![6]);
        assert_eq!(grid.get_formula(3, 7), Some("= AVERAGE(E7)"));
        assert!(builder.warnings.is_empty());
    }

    #[test]
    fn test_trailing_separator_points_formula_at_last_filled_column() {
        let text = format!(
            "{TXT_STA_ONE}---\n{}---\n",
            TXT_STA_ONE.replace("5.0", "6.0").replace(": 75", ": 80")
        );
        let mut grid = SpecSheetGrid::new();
        let (outcome, builder) = run(&text, EnumEntityKind::Station, layout_ap(), &mut grid);

        assert_eq!(outcome.col_end, 4);
        assert_eq!(outcome.row_max, 7);
        assert_eq!(builder.cnt_separators, 2);
        assert_eq!(grid.get_str(1, 3), Some("6.0"));
        assert_eq!(grid.get_number(6, 3), Some(80.0));
        assert_eq!(grid.get_str(1, 4), None);
        assert_eq!(outcome.cell_summary, (3, 7));
        assert_eq!(grid.get_formula(3, 7), Some("= AVERAGE(D7)"));
        assert!(builder.warnings.is_empty());
    }

    #[test]
    fn test_ap_spaced_ratio_token_and_channel_rows() {
        let text = "Time : 1.0\n\
            index : 0\n\
            throughput : 10\n\
            average throughput : 9\n\
            minimum throughput : 8\n\
            maximum throughput : 11\n\
            total throughput/demand(%) : 90\n\
            Channel 36 : 4.5\n\
            Channel 40 : 5.5\n\
            index : 1\n\
            throughput : 20\n\
            average throughput : 19\n\
            minimum throughput : 18\n\
            maximum throughput : 21\n\
            total throughput/demand(%) : 95\n";
        let mut grid = SpecSheetGrid::new();
        let (outcome, builder) = run(text, EnumEntityKind::AccessPoint, layout_ap(), &mut grid);

        // unspaced ratio line is not a recognized AP token
        assert_eq!(grid.get_number(6, 2), Some(4.5));
        assert_eq!(grid.get_str(6, 1), Some("Channel 36"));
        assert_eq!(grid.get_number(7, 2), Some(5.5));
        assert_eq!(grid.get_str(7, 1), Some("Channel 40"));
        assert_eq!(grid.get_str(9, 0), Some("AP 1"));
        assert_eq!(grid.get_number(9, 2), Some(20.0));

        assert_eq!(outcome.rows_ratio, vec![6, 13]);
        assert_eq!(grid.get_formula(2, 5), Some("= AVERAGE(C7, C14)"));
        assert_eq!(builder.cnt_lines_ignored, 2);
    }

    #[test]
    fn test_channel_tokens_ignored_for_stations() {
        let text = format!("{TXT_STA_ONE}Channel 36 : 4.5\n");
        let mut grid = SpecSheetGrid::new();
        let (outcome, builder) = run(&text, EnumEntityKind::Station, layout_ap(), &mut grid);

        assert_eq!(outcome.row_max, 7);
        assert_eq!(grid.get_number(7, 2), None);
        assert_eq!(builder.cnt_lines_ignored, 1);
    }

    #[test]
    fn test_labels_skipped_before_first_time_line() {
        let text = "index : 0\nthroughput : 1\n";
        let mut grid = SpecSheetGrid::new();
        let (outcome, builder) = run(text, EnumEntityKind::Station, layout_ap(), &mut grid);

        assert_eq!(grid.get_str(2, 0), None);
        assert_eq!(grid.get_number(2, 2), Some(1.0));
        assert!(outcome.rows_ratio.is_empty());
        assert_eq!(grid.get_formula(3, 5), Some("= AVERAGE()"));
        assert_eq!(builder.warnings.len(), 2);
    }

    #[test]
    fn test_uneven_columns_are_reported() {
        let text = format!("{TXT_STA_ONE}---\nTime : 6.0\nindex : 0\nthroughput : 1\n");
        let mut grid = SpecSheetGrid::new();
        let (_, builder) = run(&text, EnumEntityKind::Station, layout_ap(), &mut grid);

        assert_eq!(builder.warnings.len(), 1);
        assert!(builder.warnings[0].contains("different rows"));
    }

    #[test]
    fn test_non_numeric_metric_is_an_error() {
        let mut grid = SpecSheetGrid::new();
        let mut builder = ReportConvertBuilder::default();
        let result = parse_block(
            Cursor::new("Time : 1\nindex : 0\nthroughput : fast\n".as_bytes()),
            Path::new("ap/opt/1"),
            derive_default_block_profile(EnumEntityKind::AccessPoint),
            layout_ap(),
            &mut grid,
            &mut builder,
        );

        assert_eq!(
            result,
            Err(ConvertError::InvalidMetricValue {
                path: PathBuf::from("ap/opt/1"),
                n_line: 3,
                token: "throughput".to_string(),
                value: "fast".to_string(),
            })
        );
    }
}
