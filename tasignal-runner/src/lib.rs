//! tasignal runner: batch scoring, price sources, export.
//!
//! This crate builds on `tasignal-core` to provide:
//! - Runner configuration and ticker lists (TOML)
//! - CSV, Parquet and synthetic price sources with dataset hashing
//! - Parallel batch scoring with per-symbol failure isolation
//! - JSON/CSV/Parquet export and console reports

pub mod batch;
pub mod config;
pub mod data_loader;
pub mod export;

pub use batch::{run_batch, score_symbol, BatchEntry, BatchFailure, BatchOptions, BatchReport, ScoreError, SCHEMA_VERSION};
pub use config::{load_tickers, parse_tickers, RunnerConfig, SourceKind, SyntheticRange};
pub use data_loader::{
    dataset_hash, generate_synthetic_bars, is_up_to_date, open_source, previous_weekday, CsvPriceSource,
    LoadError, ParquetPriceSource, SyntheticPriceSource,
};
pub use export::{
    export_frame_parquet, export_results_csv, export_results_json, import_json, render_report, render_summary,
    write_report, write_summary,
};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<RunnerConfig>();
        assert_sync::<RunnerConfig>();
        assert_send::<BatchOptions>();
        assert_sync::<BatchOptions>();
    }

    #[test]
    fn sources_are_send_sync() {
        assert_send::<CsvPriceSource>();
        assert_sync::<CsvPriceSource>();
        assert_send::<ParquetPriceSource>();
        assert_sync::<ParquetPriceSource>();
        assert_send::<SyntheticPriceSource>();
        assert_sync::<SyntheticPriceSource>();
    }

    #[test]
    fn batch_report_is_send_sync() {
        assert_send::<BatchReport>();
        assert_sync::<BatchReport>();
        assert_send::<BatchEntry>();
        assert_sync::<BatchEntry>();
    }

    #[test]
    fn errors_are_send_sync() {
        assert_send::<ScoreError>();
        assert_sync::<ScoreError>();
        assert_send::<LoadError>();
        assert_sync::<LoadError>();
    }
}
