//! harvest CLI: fetch market history, inspect saved CSVs, extract PDF text.
//!
//! Commands:
//! - `fetch`: download one symbol's history, preview it, and save it as CSV
//! - `show`: load a saved CSV and print its head
//! - `extract`: concatenate the text of every page of one or more PDFs

mod logging;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use harvest_core::data::{
    load_csv, FileNaming, Reporter, StdoutReporter, TimeSeriesCollector, TracingReporter,
    YahooProvider, PREVIEW_ROWS,
};
use harvest_core::documents::{DocumentHandle, DocumentTextExtractor, PdfParser};
use harvest_core::domain::{Interval, Period, TimeSeriesRequest};
use harvest_core::HarvestConfig;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "harvest",
    version,
    about = "Market history collector and PDF text extractor"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a symbol's history from Yahoo Finance, preview it, and save it as CSV.
    Fetch {
        /// Ticker symbol (e.g., AAPL, msft). Case-insensitive.
        symbol: String,

        /// Lookback window: 1d 5d 1mo 3mo 6mo 1y 2y 5y 10y ytd max.
        #[arg(long)]
        period: Option<Period>,

        /// Bar size: 1m 2m 5m 15m 30m 60m 90m 1h 1d 5d 1wk 1mo 3mo.
        #[arg(long)]
        interval: Option<Interval>,

        /// File name prefix. Defaults to "stock_data".
        #[arg(long)]
        prefix: Option<String>,

        /// File naming: deterministic, timestamped, content_hash.
        #[arg(long)]
        naming: Option<FileNaming>,

        /// Storage directory. Defaults to ./data.
        #[arg(long)]
        storage_dir: Option<PathBuf>,

        /// Provider request timeout in seconds.
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Use raw prices instead of split/dividend-adjusted ones.
        #[arg(long, default_value_t = false)]
        raw: bool,

        /// Preview only; do not write a CSV.
        #[arg(long, default_value_t = false)]
        no_save: bool,

        /// Print diagnostics as plain lines instead of log events.
        #[arg(long, default_value_t = false)]
        plain: bool,

        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Load a saved CSV and print its first rows.
    Show {
        /// Path to a CSV written by `fetch`.
        path: PathBuf,

        /// Number of rows to print.
        #[arg(long, default_value_t = PREVIEW_ROWS)]
        rows: usize,
    },
    /// Extract the text of every page of the given PDFs, in order.
    Extract {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Write the text here instead of stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

/// Flag overrides for `fetch`, applied on top of the config file.
struct FetchArgs {
    symbol: String,
    period: Option<Period>,
    interval: Option<Interval>,
    prefix: Option<String>,
    naming: Option<FileNaming>,
    storage_dir: Option<PathBuf>,
    timeout_secs: Option<u64>,
    raw: bool,
    no_save: bool,
    plain: bool,
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Fetch {
            symbol,
            period,
            interval,
            prefix,
            naming,
            storage_dir,
            timeout_secs,
            raw,
            no_save,
            plain,
            config,
        } => run_fetch(FetchArgs {
            symbol,
            period,
            interval,
            prefix,
            naming,
            storage_dir,
            timeout_secs,
            raw,
            no_save,
            plain,
            config,
        }),
        Commands::Show { path, rows } => run_show(&path, rows),
        Commands::Extract { files, output } => run_extract(&files, output.as_deref()),
    }
}

fn load_config(args: &FetchArgs) -> Result<HarvestConfig> {
    let mut config = match &args.config {
        Some(path) => HarvestConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => HarvestConfig::default(),
    };

    if let Some(period) = args.period {
        config.collector.period = period;
    }
    if let Some(interval) = args.interval {
        config.collector.interval = interval;
    }
    if let Some(prefix) = &args.prefix {
        config.collector.prefix = prefix.clone();
    }
    if let Some(naming) = args.naming {
        config.collector.naming = naming;
    }
    if let Some(dir) = &args.storage_dir {
        config.collector.storage_dir = dir.clone();
    }
    if let Some(secs) = args.timeout_secs {
        config.provider.timeout_secs = secs;
    }
    if args.raw {
        config.provider.adjust = false;
    }

    config.validate()?;
    Ok(config)
}

fn run_fetch(args: FetchArgs) -> Result<()> {
    let config = load_config(&args)?;
    let request = TimeSeriesRequest::new(
        &args.symbol,
        config.collector.period,
        config.collector.interval,
    )?;
    let provider = YahooProvider::new(&config.provider)?;
    let reporter: Arc<dyn Reporter> = if args.plain {
        Arc::new(StdoutReporter)
    } else {
        Arc::new(TracingReporter)
    };

    let collector = TimeSeriesCollector::new(request, provider)
        .with_config(&config.collector)
        .with_reporter(reporter);

    let table = collector.fetch();
    collector.display(&table);

    if table.is_empty() {
        std::process::exit(1);
    }
    if args.no_save {
        return Ok(());
    }
    if collector.persist(&table, &config.collector.prefix).is_none() {
        std::process::exit(1);
    }

    Ok(())
}

fn run_show(path: &Path, rows: usize) -> Result<()> {
    let table = load_csv(path)?;
    if table.is_empty() {
        println!("No rows in {}", path.display());
        return Ok(());
    }

    let bars = table.bars();
    println!("File: {}", path.display());
    println!("Rows: {}", table.len());
    if let (Some(first), Some(last)) = (bars.first(), bars.last()) {
        println!(
            "Range: {} to {}",
            first.timestamp.to_rfc3339(),
            last.timestamp.to_rfc3339()
        );
    }
    println!();
    println!("{}", table.preview(rows));

    Ok(())
}

fn run_extract(files: &[PathBuf], output: Option<&Path>) -> Result<()> {
    if files.is_empty() {
        bail!("at least one PDF is required");
    }

    let handles: Vec<DocumentHandle> = files.iter().cloned().map(DocumentHandle::from).collect();
    let extractor = DocumentTextExtractor::<PdfParser>::default();
    let text = extractor.extract(&handles)?;

    match output {
        Some(path) => {
            std::fs::write(path, &text)
                .with_context(|| format!("writing {}", path.display()))?;
            tracing::info!(
                documents = files.len(),
                chars = text.chars().count(),
                "wrote {}",
                path.display()
            );
        }
        None => print!("{text}"),
    }

    Ok(())
}
