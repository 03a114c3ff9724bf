//! `simsheet`: consolidate simulator AP/STA throughput logs into one workbook.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser};
use log::{debug, info};
use simsheet_io_log::{SpecConvertConfig, convert_logs_to_workbook};
use simsheet_log::{derive_level_filter, init_logging};

const C_PROMPT_TEST_ID: &str = "input the test number : ";

#[derive(Parser, Debug)]
#[command(name = "simsheet")]
#[command(version, about = "Convert simulator AP/STA logs into test_<id>.xlsx", long_about = None)]
struct Cli {
    /// Test identifier naming both input logs; prompted for when absent
    #[arg(short, long)]
    test_id: Option<String>,

    /// TOML config file (ap-dir, sta-dir, algorithms, test-id, output-dir)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// AP log directory prefix
    #[arg(long, value_name = "DIR")]
    ap_dir: Option<PathBuf>,

    /// STA log directory prefix
    #[arg(long, value_name = "DIR")]
    sta_dir: Option<PathBuf>,

    /// Algorithm variant, repeatable; replaces the configured list
    #[arg(short, long = "algorithm", value_name = "NAME")]
    algorithms: Vec<String>,

    /// Directory receiving the workbook
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Less log output (-q warn, -qq error)
    #[arg(short, long, action = ArgAction::Count)]
    quiet: u8,
}

fn load_config(path: &Path) -> Result<SpecConvertConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}

/// Layer CLI flags over the config file over defaults.
fn resolve_config(cli: &Cli) -> Result<SpecConvertConfig> {
    let mut cfg = match &cli.config {
        Some(path) => load_config(path)?,
        None => SpecConvertConfig::default(),
    };

    if let Some(val) = &cli.ap_dir {
        cfg.ap_dir = val.clone();
    }
    if let Some(val) = &cli.sta_dir {
        cfg.sta_dir = val.clone();
    }
    if !cli.algorithms.is_empty() {
        cfg.algorithms = cli.algorithms.clone();
    }
    if let Some(val) = &cli.output_dir {
        cfg.output_dir = val.clone();
    }
    if let Some(val) = &cli.test_id {
        cfg.test_id = val.clone();
    }
    Ok(cfg)
}

/// Ask for the test identifier; the answer is used verbatim minus the line break.
fn prompt_test_id<R: BufRead, W: Write>(reader: &mut R, writer: &mut W) -> Result<String> {
    write!(writer, "{C_PROMPT_TEST_ID}")?;
    writer.flush()?;

    let mut c_line = String::new();
    if reader.read_line(&mut c_line)? == 0 {
        bail!("No test number given (end of input).");
    }
    Ok(c_line.trim_end_matches(['\n', '\r']).to_string())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(derive_level_filter(cli.verbose, cli.quiet));

    let mut cfg = resolve_config(&cli)?;
    if cfg.test_id.is_empty() {
        cfg.test_id = prompt_test_id(&mut io::stdin().lock(), &mut io::stdout())?;
    }
    debug!("Resolved config: {cfg:?}");

    let report = convert_logs_to_workbook(&cfg)
        .with_context(|| format!("Conversion failed for test {:?}", cfg.test_id))?;
    info!("{report}");
    Ok(())
}
