//! `simsheet_io_log` v1:
//! Simulator throughput logs to sheet grids.
//!
//! Modules:
//! - `conf`    : log grammar, sheet layout constants and defaults
//! - `spec`    : line/block models, config and errors
//! - `parse`   : line classifier and cursor state machine
//! - `report`  : run-time report model
//! - `convert` : per-algorithm orchestration and workbook output

pub mod conf;
pub mod convert;
pub mod parse;
pub mod report;
pub mod spec;

pub use convert::{
    SpecSheetProfiles, convert_algorithm, convert_logs_to_workbook, convert_logs_to_workbook_with,
};
pub use parse::{ParserState, classify_line, parse_block};
pub use report::{ReportConvert, ReportConvertBuilder};
pub use spec::{
    ConvertError, EnumEntityKind, EnumLogLine, SpecBlockLayout, SpecBlockOutcome,
    SpecBlockProfile, SpecConvertConfig,
};
