//! Log grammar constants, sheet layout constants and default presets.

use crate::spec::{EnumEntityKind, SpecBlockProfile};

////////////////////////////////////////////////////////////////////////////////
// #region LogGrammar

/// Substring marking a time-column boundary.
pub const C_SEPARATOR_MARKER: &str = "---";
/// Delimiter between token and value on a key-value line.
pub const C_KEY_VALUE_DELIMITER: &str = " :";
/// Characters skipped after the delimiter before the value starts (the blank in ` : `).
pub const N_VALUE_SKIP_CHARS: usize = 1;

/// Token carrying the time sample of the current column.
pub const C_TOKEN_TIME: &str = "Time";
/// Token opening an entity block.
pub const C_TOKEN_INDEX: &str = "index";
/// Substring identifying per-channel metric tokens (AP log only).
pub const C_TOKEN_CHANNEL_MARKER: &str = "Channel";

/// Metric tokens recognized in the AP log.
///
/// The ratio token is the spaced form, so an unspaced AP ratio line is not
/// captured and the following row (channel or next entity) lands on the
/// ratio row.
pub const TUP_METRIC_TOKENS_AP: [&str; 5] = [
    "throughput",
    "average throughput",
    "minimum throughput",
    "maximum throughput",
    "total throughput / demand(%)",
];
/// Metric tokens recognized in the STA log.
pub const TUP_METRIC_TOKENS_STA: [&str; 5] = [
    "throughput",
    "average throughput",
    "minimum throughput",
    "maximum throughput",
    "throughput/demand(%)",
];

/// Metric row labels written below an AP entity label.
pub const TUP_METRIC_LABELS_AP: [&str; 5] = [
    "throughput",
    "average throughput",
    "minimum throughput",
    "maximum throughput",
    "total throughput/demand(%)",
];
/// Metric row labels written below a STA entity label.
pub const TUP_METRIC_LABELS_STA: [&str; 5] = [
    "throughput",
    "average throughput",
    "minimum throughput",
    "maximum throughput",
    "throughput/demand(%)",
];

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetLayout

/// Column holding `AP <id>` / `STA <id>` labels.
pub const N_COL_ENTITY_LABEL: usize = 0;
/// Column holding metric labels.
pub const N_COL_METRIC_LABEL: usize = 1;
/// First data column (one column per time sample).
pub const N_COL_DATA_START: usize = 2;
/// Row cursor start and time header row of the AP block.
pub const N_ROW_AP_START: usize = 1;
/// Gap between the AP block's last row and the STA block start.
pub const N_ROW_STA_GAP: usize = 2;
/// Distance from the final column cursor to the summary formula column.
pub const N_COL_SUMMARY_OFFSET: usize = 3;
/// Summary formula row of the AP block.
pub const N_ROW_SUMMARY_AP: usize = 2;
/// Summary formula row of the STA block.
pub const N_ROW_SUMMARY_STA: usize = 3;

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ConfigDefaults

/// Default AP log directory prefix.
pub const C_AP_DIR_DEFAULT: &str = "./output/ap/";
/// Default STA log directory prefix.
pub const C_STA_DIR_DEFAULT: &str = "./output/sta/";
/// Default workbook output directory.
pub const C_OUTPUT_DIR_DEFAULT: &str = ".";
/// Default algorithm variants, in sheet order.
pub const TUP_ALGORITHMS_DEFAULT: [&str; 3] = ["opt", "proposed", "waterfall"];

/// Workbook file name for `test_id`.
pub fn derive_output_file_name(test_id: &str) -> String {
    format!("test_{test_id}.xlsx")
}

/// Build the default parsing profile for one entity kind.
pub fn derive_default_block_profile(kind: EnumEntityKind) -> SpecBlockProfile {
    let (tokens_metric, labels_metric, if_channel_metrics, row_summary) = match kind {
        EnumEntityKind::AccessPoint => (
            TUP_METRIC_TOKENS_AP,
            TUP_METRIC_LABELS_AP,
            true,
            N_ROW_SUMMARY_AP,
        ),
        EnumEntityKind::Station => (
            TUP_METRIC_TOKENS_STA,
            TUP_METRIC_LABELS_STA,
            false,
            N_ROW_SUMMARY_STA,
        ),
    };

    SpecBlockProfile {
        kind,
        tokens_metric: tokens_metric.iter().map(ToString::to_string).collect(),
        labels_metric: labels_metric.iter().map(ToString::to_string).collect(),
        if_channel_metrics,
        row_summary,
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
