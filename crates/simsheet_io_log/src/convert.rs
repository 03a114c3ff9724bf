//! Per-algorithm conversion orchestration: open both logs, parse them into one
//! sheet grid, hand the grids to the workbook writer.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::{info, warn};
use simsheet_io_xlsx::conf::derive_default_xlsx_write_options;
use simsheet_io_xlsx::{SpecSheetGrid, SpecXlsxSheetWriteOptions, XlsxWriter};

use crate::conf::{N_COL_DATA_START, N_ROW_AP_START, N_ROW_STA_GAP, derive_default_block_profile};
use crate::parse::parse_block;
use crate::report::{ReportConvert, ReportConvertBuilder};
use crate::spec::{
    ConvertError, EnumEntityKind, SpecBlockLayout, SpecBlockProfile, SpecConvertConfig,
};

/// Parsing profiles for the AP and STA logs of one sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSheetProfiles {
    /// Profile applied to the AP log.
    pub ap: SpecBlockProfile,
    /// Profile applied to the STA log.
    pub sta: SpecBlockProfile,
}

impl Default for SpecSheetProfiles {
    fn default() -> Self {
        Self {
            ap: derive_default_block_profile(EnumEntityKind::AccessPoint),
            sta: derive_default_block_profile(EnumEntityKind::Station),
        }
    }
}

/// Convert every configured algorithm into one sheet of `test_<id>.xlsx`.
///
/// Any unreadable log or malformed metric aborts the run before the workbook
/// is saved.
pub fn convert_logs_to_workbook(cfg: &SpecConvertConfig) -> Result<ReportConvert, ConvertError> {
    convert_logs_to_workbook_with(cfg, &SpecSheetProfiles::default())
}

/// Same as [`convert_logs_to_workbook`] with explicit parsing profiles.
pub fn convert_logs_to_workbook_with(
    cfg: &SpecConvertConfig,
    profiles: &SpecSheetProfiles,
) -> Result<ReportConvert, ConvertError> {
    cfg.validate()?;

    let path_file_out = cfg.path_file_out();
    let mut writer =
        XlsxWriter::with_default_formats(path_file_out.clone(), derive_default_xlsx_write_options())
            .map_err(ConvertError::Xlsx)?;
    let options_sheet = SpecXlsxSheetWriteOptions {
        col_freeze: N_COL_DATA_START,
        row_freeze: N_ROW_AP_START + 1,
        ..Default::default()
    };

    let mut builder = ReportConvertBuilder::default();
    for algorithm in &cfg.algorithms {
        let (path_log_ap, path_log_sta) = cfg.derive_log_paths(algorithm);
        info!(
            "Converting {algorithm}: {} + {}",
            path_log_ap.display(),
            path_log_sta.display()
        );

        let grid = convert_algorithm(&path_log_ap, &path_log_sta, profiles, &mut builder)?;
        writer
            .write_sheet_from_grid(&grid, algorithm, &options_sheet)
            .map_err(ConvertError::Xlsx)?;
        builder.add_sheet();
    }

    writer.close().map_err(ConvertError::Xlsx)?;
    for report in writer.report() {
        for warning in report.warnings {
            builder.add_warning(warning);
        }
    }

    let report = builder.build(Some(path_file_out));
    for warning in &report.warnings {
        warn!("{warning}");
    }
    info!("Saved {} ({report})", writer.file_out());
    Ok(report)
}

/// Parse one AP log and its companion STA log into a single sheet grid.
///
/// Both files are opened before parsing starts; the STA block begins two rows
/// below the last AP row.
pub fn convert_algorithm(
    path_log_ap: &Path,
    path_log_sta: &Path,
    profiles: &SpecSheetProfiles,
    builder: &mut ReportConvertBuilder,
) -> Result<SpecSheetGrid, ConvertError> {
    let reader_ap = open_log(path_log_ap)?;
    let reader_sta = open_log(path_log_sta)?;

    let mut grid = SpecSheetGrid::new();
    let outcome_ap = parse_block(
        reader_ap,
        path_log_ap,
        profiles.ap.clone(),
        SpecBlockLayout {
            row_start: N_ROW_AP_START,
            row_header: N_ROW_AP_START,
        },
        &mut grid,
        builder,
    )?;

    let n_row_sta_start = outcome_ap.row_max + N_ROW_STA_GAP;
    parse_block(
        reader_sta,
        path_log_sta,
        profiles.sta.clone(),
        SpecBlockLayout {
            row_start: n_row_sta_start,
            row_header: n_row_sta_start,
        },
        &mut grid,
        builder,
    )?;

    Ok(grid)
}

fn open_log(path: &Path) -> Result<BufReader<File>, ConvertError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|err| ConvertError::OpenLog {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
}
