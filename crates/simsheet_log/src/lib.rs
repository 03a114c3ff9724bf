//! `simsheet_log` v1:
//! Logging bootstrap shared by the simsheet binaries.

use env_logger::{Builder, Env};
use log::LevelFilter;

/// Environment variable overriding the default filter.
pub const C_ENV_LOG_FILTER: &str = "RUST_LOG";

/// Map `-v` / `-q` counts onto a default level (`Info` when both are zero).
pub fn derive_level_filter(n_verbose: u8, n_quiet: u8) -> LevelFilter {
    match (i16::from(n_verbose) - i16::from(n_quiet)).clamp(-2, 2) {
        -2 => LevelFilter::Error,
        -1 => LevelFilter::Warn,
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Build the logger: `level` applies unless `RUST_LOG` is set.
pub fn build_logger(level: LevelFilter) -> Builder {
    let mut builder = Builder::from_env(Env::default().filter(C_ENV_LOG_FILTER));
    if std::env::var_os(C_ENV_LOG_FILTER).is_none() {
        builder.filter_level(level);
    }
    builder.format_timestamp(None).format_target(false);
    builder
}

/// Install the global logger. A second call is a no-op.
pub fn init_logging(level: LevelFilter) {
    let _ = build_logger(level).try_init();
}
