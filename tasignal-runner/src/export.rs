//! Export: JSON, CSV and Parquet artifacts plus the console report.
//!
//! - **JSON**: full `BatchReport` round trip with schema versioning
//! - **CSV**: one row per scored symbol, one column per signal
//! - **Parquet**: the enriched indicator frame of a single symbol
//!
//! Reports newer than `SCHEMA_VERSION` are rejected on load.

use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use polars::prelude::*;
use tasignal_core::scoring::{Signal, Verdict};
use tasignal_core::{IndicatorFrame, ScoreResult};

use crate::batch::{BatchEntry, BatchReport, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

pub fn export_results_json(report: &BatchReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize BatchReport to JSON")
}

/// Deserialize a `BatchReport`, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<BatchReport> {
    let report: BatchReport =
        serde_json::from_str(json).context("failed to deserialize BatchReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV export ─────────────────────────────────────────────────────

fn verdict_cell(verdict: Option<&Verdict>) -> &'static str {
    match verdict {
        Some(Verdict::Fired) => "1",
        Some(Verdict::NotFired) => "0",
        Some(Verdict::NotApplicable) | None => "",
    }
}

/// Export scored symbols as CSV.
///
/// Columns: symbol, name, date, close, regime, score, ceiling, percent,
/// signal, strength, source, stale, then one column per signal holding
/// `1` (fired), `0` (not fired) or empty (not applicable).
pub fn export_results_csv(entries: &[BatchEntry]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec![
        "symbol", "name", "date", "close", "regime", "score", "ceiling", "percent", "signal",
        "strength", "source", "stale",
    ];
    header.extend(Signal::ALL.iter().map(Signal::as_str));
    wtr.write_record(&header)?;

    for e in entries {
        let r = &e.result;
        let mut record = vec![
            r.instrument.symbol.clone(),
            r.instrument.name.clone(),
            r.date.to_string(),
            format!("{:.4}", r.close),
            r.regime.to_string(),
            format!("{:.2}", r.score),
            format!("{:.2}", r.ceiling),
            format!("{:.1}", r.percent()),
            r.signal.to_string(),
            r.strength.to_string(),
            e.source.to_string(),
            e.stale.to_string(),
        ];
        record.extend(
            Signal::ALL
                .iter()
                .map(|s| verdict_cell(r.signals.get(s)).to_string()),
        );
        wtr.write_record(&record)?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Parquet export ─────────────────────────────────────────────────

/// Write the full indicator frame to a Parquet file.
pub fn export_frame_parquet(frame: &IndicatorFrame, path: &Path) -> Result<()> {
    let mut df = frame
        .to_dataframe()
        .context("failed to build indicator DataFrame")?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let file = fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    ParquetWriter::new(file)
        .finish(&mut df)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

// ─── Console report ─────────────────────────────────────────────────

/// Human-readable report for one scored instrument.
pub fn write_report<W: fmt::Write>(out: &mut W, result: &ScoreResult) -> fmt::Result {
    writeln!(out, "{}", result.instrument)?;
    writeln!(out, "  Date:     {}", result.date)?;
    writeln!(out, "  Close:    {:.2}", result.close)?;
    writeln!(out, "  Regime:   {}", result.regime)?;
    writeln!(out, "  Signal:   {} ({})", result.signal, result.strength)?;
    writeln!(
        out,
        "  Score:    {:.1} / {:.1} ({:.0}%)",
        result.score,
        result.ceiling,
        result.percent()
    )?;
    writeln!(out)?;
    for (signal, verdict) in &result.signals {
        writeln!(out, "  {} {}", verdict.marker(), signal.label())?;
    }
    Ok(())
}

pub fn render_report(result: &ScoreResult) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_report(&mut out, result)?;
    Ok(out)
}

/// One line per entry, sorted by percent descending, then the failures.
pub fn write_summary<W: fmt::Write>(out: &mut W, report: &BatchReport) -> fmt::Result {
    let mut rows: Vec<&BatchEntry> = report.entries.iter().collect();
    rows.sort_by(|a, b| b.result.percent().total_cmp(&a.result.percent()));

    writeln!(
        out,
        "{:<8} {:<11} {:<8} {:<8} {:>7} {:>6}",
        "SYMBOL", "DATE", "SIGNAL", "STRENGTH", "SCORE", "PCT"
    )?;
    for e in rows {
        let r = &e.result;
        writeln!(
            out,
            "{:<8} {:<11} {:<8} {:<8} {:>7.1} {:>5.0}%{}",
            r.instrument.symbol,
            r.date.to_string(),
            r.signal.as_str(),
            r.strength.as_str(),
            r.score,
            r.percent(),
            if e.stale { "  (stale)" } else { "" }
        )?;
    }
    for f in &report.failures {
        writeln!(out, "{:<8} failed: {}", f.symbol, f.reason)?;
    }
    Ok(())
}

pub fn render_summary(report: &BatchReport) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_summary(&mut out, report)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::{run_batch, BatchOptions};
    use crate::data_loader::{generate_synthetic_bars, SyntheticPriceSource};
    use chrono::NaiveDate;
    use tasignal_core::domain::Instrument;
    use tasignal_core::SignalEngine;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn report() -> BatchReport {
        let source = SyntheticPriceSource::new(date(2023, 1, 2), date(2023, 12, 29));
        let symbols = vec!["SPY".to_string(), "QQQ".to_string()];
        run_batch(&SignalEngine::default(), &source, &symbols, BatchOptions::default())
    }

    #[test]
    fn json_roundtrip() {
        let report = report();
        let json = export_results_json(&report).unwrap();
        assert!(json.contains("\"schema_version\": 1"));
        let back = import_json(&json).unwrap();
        assert_eq!(back.dataset_hash, report.dataset_hash);
        assert_eq!(back.entries.len(), report.entries.len());
        for (a, b) in back.entries.iter().zip(&report.entries) {
            assert_eq!(a.result.instrument, b.result.instrument);
            assert_eq!(a.result.signal, b.result.signal);
            assert_eq!(a.result.strength, b.result.strength);
            assert_eq!(a.result.signals, b.result.signals);
            assert!((a.result.close - b.result.close).abs() < 1e-9);
        }
    }

    #[test]
    fn newer_schema_version_rejected() {
        let mut report = report();
        report.schema_version = SCHEMA_VERSION + 1;
        let json = export_results_json(&report).unwrap();
        let err = import_json(&json).unwrap_err();
        assert!(err.to_string().contains("unsupported schema version"));
    }

    #[test]
    fn csv_has_one_column_per_signal() {
        let report = report();
        let csv = export_results_csv(&report.entries).unwrap();
        let mut lines = csv.lines();
        let header: Vec<&str> = lines.next().unwrap().split(',').collect();
        assert_eq!(header.len(), 12 + 18);
        assert_eq!(header[0], "symbol");
        assert_eq!(header[12], "ma_alignment");
        let rows: Vec<&str> = lines.collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].starts_with("SPY,"));
        assert!(rows[1].starts_with("QQQ,"));
    }

    #[test]
    fn parquet_export_writes_every_row() {
        let dir = tempfile::tempdir().unwrap();
        let bars = generate_synthetic_bars("SPY", date(2023, 1, 2), date(2023, 6, 30));
        let n = bars.len();
        let analysis = SignalEngine::default()
            .analyze(Instrument::from_symbol("SPY"), bars)
            .unwrap();
        let path = dir.path().join("frames").join("SPY.parquet");
        export_frame_parquet(&analysis.frame, &path).unwrap();

        let df = ParquetReader::new(fs::File::open(&path).unwrap()).finish().unwrap();
        assert_eq!(df.height(), n);
        assert!(df.column("adx").is_ok());
        assert!(df.column("regime").is_ok());
    }

    #[test]
    fn report_lists_every_signal() {
        let report = report();
        let text = render_report(&report.entries[0].result).unwrap();
        assert!(text.starts_with("SPY"));
        assert!(text.contains("Score:"));
        let markers = text
            .lines()
            .filter(|l| l.starts_with("  ✓") || l.starts_with("  ✗") || l.starts_with("  –"))
            .count();
        assert_eq!(markers, 18);
    }

    #[test]
    fn summary_includes_failures() {
        let mut report = report();
        report.failures.push(crate::batch::BatchFailure {
            symbol: "XYZ".into(),
            reason: "symbol not found: XYZ".into(),
        });
        let text = render_summary(&report).unwrap();
        assert!(text.lines().next().unwrap().starts_with("SYMBOL"));
        assert!(text.contains("failed: symbol not found: XYZ"));
        assert_eq!(text.lines().count(), 4);
    }

    /// Accepts a fixed number of writes, then fails.
    struct Limited(usize);

    impl fmt::Write for Limited {
        fn write_str(&mut self, _: &str) -> fmt::Result {
            if self.0 == 0 {
                return Err(fmt::Error);
            }
            self.0 -= 1;
            Ok(())
        }
    }

    #[test]
    fn writer_errors_propagate() {
        let report = report();
        assert!(write_report(&mut Limited(3), &report.entries[0].result).is_err());
        assert!(write_summary(&mut Limited(3), &report).is_err());
        assert!(write_report(&mut Limited(10_000), &report.entries[0].result).is_ok());
    }
}
