//! tasignal CLI: score instruments and export results.
//!
//! Commands:
//! - `score`: score one or more symbols and print the signal report
//! - `batch`: score the ticker list, print a summary, optionally export JSON/CSV
//! - `export`: write the full indicator frame of one symbol to Parquet

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tasignal_core::SignalEngine;
use tasignal_runner::{
    export_frame_parquet, export_results_csv, export_results_json, load_tickers, open_source,
    render_report, render_summary, run_batch, score_symbol, BatchOptions, RunnerConfig, SourceKind,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "tasignal",
    about = "tasignal: regime-aware technical-analysis signal engine"
)]
struct Cli {
    /// Debug logging (overridden by RUST_LOG).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score one or more symbols and print the per-signal report.
    Score {
        #[arg(required = true)]
        symbols: Vec<String>,

        #[command(flatten)]
        args: SourceArgs,

        /// Print results as JSON instead of the console report.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Score every symbol in the ticker list.
    Batch {
        #[command(flatten)]
        args: SourceArgs,

        /// Ticker list. Defaults to `tickers_file` from the config.
        #[arg(long)]
        tickers: Option<PathBuf>,

        /// Score symbols one by one instead of in parallel.
        #[arg(long, default_value_t = false)]
        sequential: bool,

        /// Write the full report as JSON.
        #[arg(long)]
        out_json: Option<PathBuf>,

        /// Write one CSV row per scored symbol.
        #[arg(long)]
        out_csv: Option<PathBuf>,
    },
    /// Write the indicator frame of one symbol to Parquet.
    Export {
        symbol: String,

        #[command(flatten)]
        args: SourceArgs,

        /// Output Parquet file.
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Args)]
struct SourceArgs {
    /// Path to a runner TOML config.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Price directory. Overrides `data_dir` from the config.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Price source. Overrides `source` from the config.
    #[arg(long, value_enum)]
    source: Option<SourceArg>,

    /// Shorthand for `--source synthetic`.
    #[arg(long, default_value_t = false)]
    synthetic: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum SourceArg {
    Csv,
    Parquet,
    Synthetic,
}

impl From<SourceArg> for SourceKind {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::Csv => SourceKind::Csv,
            SourceArg::Parquet => SourceKind::Parquet,
            SourceArg::Synthetic => SourceKind::Synthetic,
        }
    }
}

impl SourceArgs {
    /// Config file (or defaults) with command-line overrides applied.
    fn resolve(&self) -> Result<RunnerConfig> {
        let mut config = match &self.config {
            Some(path) => RunnerConfig::from_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => RunnerConfig::default(),
        };
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(source) = self.source {
            config.source = source.into();
        }
        if self.synthetic {
            config.source = SourceKind::Synthetic;
        }
        Ok(config)
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Score {
            symbols,
            args,
            json,
        } => run_score(&symbols, &args, json),
        Commands::Batch {
            args,
            tickers,
            sequential,
            out_json,
            out_csv,
        } => run_batch_cmd(&args, tickers, sequential, out_json, out_csv),
        Commands::Export {
            symbol,
            args,
            out,
        } => run_export(&symbol, &args, &out),
    }
}

fn run_score(symbols: &[String], args: &SourceArgs, json: bool) -> Result<()> {
    let config = args.resolve()?;
    let engine = SignalEngine::new(config.engine_config())?;
    let source = open_source(&config)?;
    let today = chrono::Local::now().date_naive();

    let mut results = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        let symbol = symbol.to_uppercase();
        let entry = score_symbol(&engine, source.as_ref(), &symbol, Some(today))
            .with_context(|| format!("failed to score {symbol}"))?;
        if entry.stale {
            eprintln!(
                "Warning: {symbol} data ends {}, not up to date",
                entry.result.date
            );
        }
        results.push(entry.result);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        for (i, result) in results.iter().enumerate() {
            if i > 0 {
                println!();
            }
            print!("{}", render_report(result)?);
        }
    }
    Ok(())
}

fn run_batch_cmd(
    args: &SourceArgs,
    tickers: Option<PathBuf>,
    sequential: bool,
    out_json: Option<PathBuf>,
    out_csv: Option<PathBuf>,
) -> Result<()> {
    let config = args.resolve()?;
    let engine = SignalEngine::new(config.engine_config())?;
    let source = open_source(&config)?;
    let tickers_file = tickers.unwrap_or_else(|| config.tickers_file.clone());
    let symbols = load_tickers(&tickers_file)?;

    let opts = BatchOptions {
        parallel: config.parallel && !sequential,
        today: Some(chrono::Local::now().date_naive()),
    };
    let report = run_batch(&engine, source.as_ref(), &symbols, opts);

    print!("{}", render_summary(&report)?);
    if report.has_synthetic() {
        println!("Note: results computed on synthetic data");
    }

    if let Some(path) = out_json {
        std::fs::write(&path, export_results_json(&report)?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "wrote JSON report");
    }
    if let Some(path) = out_csv {
        std::fs::write(&path, export_results_csv(&report.entries)?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "wrote CSV report");
    }

    if report.entries.is_empty() {
        bail!("no symbol could be scored");
    }
    Ok(())
}

fn run_export(symbol: &str, args: &SourceArgs, out: &Path) -> Result<()> {
    let config = args.resolve()?;
    let engine = SignalEngine::new(config.engine_config())?;
    let source = open_source(&config)?;

    let symbol = symbol.to_uppercase();
    let loaded = source
        .load(&symbol)
        .with_context(|| format!("failed to load {symbol}"))?;
    let analysis = engine
        .analyze(loaded.instrument, loaded.bars)
        .with_context(|| format!("failed to score {symbol}"))?;
    export_frame_parquet(&analysis.frame, out)?;

    println!(
        "{}: {} rows written to {}",
        symbol,
        analysis.frame.len(),
        out.display()
    );
    Ok(())
}
