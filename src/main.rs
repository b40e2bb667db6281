use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{Level, info};

use dashpick::page::{DEMO_PAGE, load_page, parse_page_text};
use dashpick::time_source::select_time_source;
use dashpick::{diagnostics, ui};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

impl From<CliLogLevel> for Level {
    fn from(value: CliLogLevel) -> Self {
        match value {
            CliLogLevel::Error => Level::ERROR,
            CliLogLevel::Warn => Level::WARN,
            CliLogLevel::Info => Level::INFO,
            CliLogLevel::Debug => Level::DEBUG,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "dashpick",
    version,
    about = "Calendar date, range and time pickers for a dashboard page"
)]
struct Cli {
    /// Page description (JSON). Defaults to the built-in demo page.
    #[arg(long)]
    page: Option<PathBuf>,

    #[arg(long)]
    diagnostics: bool,

    /// Calendar month (YYYY-MM) to print with --diagnostics.
    #[arg(long)]
    month: Option<String>,

    /// Pin the clock to a local datetime, e.g. 2025-03-15T09:30.
    #[arg(long)]
    today: Option<String>,

    #[arg(long, value_enum, default_value_t = CliLogLevel::Info)]
    log_level: CliLogLevel,

    /// Shorthand for --log-level debug.
    #[arg(long, short)]
    verbose: bool,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(if cli.verbose {
        Level::DEBUG
    } else {
        cli.log_level.into()
    });

    let page = match &cli.page {
        Some(path) => {
            load_page(path).with_context(|| format!("failed to load {}", path.display()))?
        }
        None => parse_page_text(DEMO_PAGE).context("failed to load the built-in demo page")?,
    };
    let selected = select_time_source(cli.today.as_deref())?;
    let month = cli
        .month
        .as_deref()
        .map(diagnostics::parse_month)
        .transpose()?;
    info!(page = page.title(), clock = selected.label, "starting dashpick");

    if cli.diagnostics {
        diagnostics::run_diagnostics(&page, &selected, month)?;
        return Ok(());
    }

    ui::app::run_gui(page, selected)
}

fn init_logging(level: Level) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
