//! Indicator frame: the bar series plus every derived column.
//!
//! A frame is built once by [`crate::pipeline::build_frame`] and never
//! mutated. Every column has exactly one entry per input bar.

use chrono::NaiveDate;
use polars::prelude::*;
use serde::Serialize;
use thiserror::Error;

use crate::config::ConfigError;
use crate::data::schema::date_column;
use crate::domain::Bar;
use crate::indicators::{
    BollingerColumns, Breakout, Direction, DmiColumns, DonchianColumns, MaAlignment, MaColumns,
    MacdColumns, PriceLevel, Regime, RsiColumns, SarColumns, StochasticColumns, VolumeColumns,
    VolumePriceSignal, Zone,
};

/// Structural problems with the input series. Computation never starts.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("missing required column: {0}")]
    MissingColumn(String),

    #[error("invalid column {column}: {reason}")]
    InvalidColumn { column: String, reason: String },

    #[error("empty bar series")]
    EmptySeries,

    #[error("dates not ascending at row {index}: {current} follows {previous}")]
    UnsortedDates {
        index: usize,
        previous: NaiveDate,
        current: NaiveDate,
    },

    #[error("duplicate date {date} at row {index}")]
    DuplicateDate { index: usize, date: NaiveDate },

    #[error("invalid indicator parameters: {0}")]
    Parameters(#[from] ConfigError),

    #[error("polars: {0}")]
    Polars(#[from] PolarsError),
}

/// Reject empty, unsorted, or duplicated date sequences.
pub fn validate_dates(bars: &[Bar]) -> Result<(), FrameError> {
    if bars.is_empty() {
        return Err(FrameError::EmptySeries);
    }
    for (i, pair) in bars.windows(2).enumerate() {
        let (previous, current) = (pair[0].date, pair[1].date);
        if current == previous {
            return Err(FrameError::DuplicateDate {
                index: i + 1,
                date: current,
            });
        }
        if current < previous {
            return Err(FrameError::UnsortedDates {
                index: i + 1,
                previous,
                current,
            });
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorFrame {
    pub(crate) bars: Vec<Bar>,
    pub(crate) dmi: DmiColumns,
    pub(crate) regime: Vec<Regime>,
    pub(crate) sar: SarColumns,
    pub(crate) ma: MaColumns,
    pub(crate) bollinger: BollingerColumns,
    pub(crate) donchian: DonchianColumns,
    pub(crate) rsi: RsiColumns,
    pub(crate) macd: MacdColumns,
    pub(crate) stochastic: StochasticColumns,
    pub(crate) volume: VolumeColumns,
}

impl IndicatorFrame {
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn dmi(&self) -> &DmiColumns {
        &self.dmi
    }

    pub fn regime(&self) -> &[Regime] {
        &self.regime
    }

    pub fn sar(&self) -> &SarColumns {
        &self.sar
    }

    pub fn moving_averages(&self) -> &MaColumns {
        &self.ma
    }

    pub fn bollinger(&self) -> &BollingerColumns {
        &self.bollinger
    }

    pub fn donchian(&self) -> &DonchianColumns {
        &self.donchian
    }

    pub fn rsi(&self) -> &RsiColumns {
        &self.rsi
    }

    pub fn macd(&self) -> &MacdColumns {
        &self.macd
    }

    pub fn stochastic(&self) -> &StochasticColumns {
        &self.stochastic
    }

    pub fn volume(&self) -> &VolumeColumns {
        &self.volume
    }

    /// Look up a derived numeric column by its export name
    /// (`adx`, `ema_50`, `bb_width`, ...).
    pub fn numeric(&self, name: &str) -> Option<&[f64]> {
        if let Some(period) = name.strip_prefix("ema_") {
            let period: usize = period.parse().ok()?;
            let slot = self.ma.periods.iter().position(|&p| p == period)?;
            return Some(&self.ma.ema[slot]);
        }
        let column = match name {
            "true_range" => &self.dmi.true_range,
            "di_plus" => &self.dmi.di_plus,
            "di_minus" => &self.dmi.di_minus,
            "dx" => &self.dmi.dx,
            "adx" => &self.dmi.adx,
            "psar" => &self.sar.psar,
            "bb_mid" => &self.bollinger.mid,
            "bb_upper" => &self.bollinger.upper,
            "bb_lower" => &self.bollinger.lower,
            "bb_width" => &self.bollinger.width,
            "bb_pct" => &self.bollinger.pct,
            "donchian_high" => &self.donchian.high,
            "donchian_low" => &self.donchian.low,
            "rsi" => &self.rsi.rsi,
            "macd" => &self.macd.line,
            "macd_signal" => &self.macd.signal,
            "macd_hist" => &self.macd.histogram,
            "stoch_k" => &self.stochastic.k,
            "stoch_d" => &self.stochastic.d,
            "obv" => &self.volume.obv,
            "obv_ema" => &self.volume.obv_ema,
            "vol_sma" => &self.volume.volume_sma,
            "vol_ratio" => &self.volume.volume_ratio,
            _ => return None,
        };
        Some(column)
    }

    /// Values of row `i`, or `None` past the end.
    pub fn row(&self, i: usize) -> Option<BarSnapshot> {
        let bar = self.bars.get(i)?;
        Some(BarSnapshot {
            date: bar.date,
            close: bar.close,
            regime: self.regime[i],
            adx: self.dmi.adx[i],
            di_plus: self.dmi.di_plus[i],
            di_minus: self.dmi.di_minus[i],
            psar_bull: self.sar.psar_bull[i],
            ma_alignment: self.ma.alignment[i],
            price_vs_medium: self.ma.price_vs_medium[i],
            price_vs_long: self.ma.price_vs_long[i],
            donchian_breakout: self.donchian.breakout[i],
            rsi: self.rsi.rsi[i],
            rsi_zone: self.rsi.zone[i],
            rsi_above_50: self.rsi.above_50[i],
            macd: self.macd.line[i],
            macd_signal: self.macd.signal[i],
            macd_hist_direction: self.macd.hist_direction[i],
            stoch_d: self.stochastic.d[i],
            stoch_zone: self.stochastic.zone[i],
            obv_trend: self.volume.obv_trend[i],
            volume_above_average: self.volume.above_average[i],
            volume_price: self.volume.price_signal[i],
            bb_squeeze: self.bollinger.squeeze[i],
            bb_pct: self.bollinger.pct[i],
        })
    }

    /// The last row, which the scorer decides on.
    pub fn decision_row(&self) -> Option<BarSnapshot> {
        self.len().checked_sub(1).and_then(|i| self.row(i))
    }

    /// Polars view of the bars and every derived column.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        fn f64_col(name: &str, values: &[f64]) -> Column {
            Column::new(name.into(), values)
        }
        fn bool_col(name: &str, values: &[bool]) -> Column {
            Column::new(name.into(), values)
        }
        fn label_col<T>(name: &str, values: &[T], f: impl Fn(&T) -> &'static str) -> Column {
            Column::new(name.into(), values.iter().map(f).collect::<Vec<&str>>())
        }
        fn optional_label_col<T>(
            name: &str,
            values: &[Option<T>],
            f: impl Fn(&T) -> &'static str,
        ) -> Column {
            Column::new(
                name.into(),
                values.iter().map(|v| v.as_ref().map(&f)).collect::<Vec<Option<&str>>>(),
            )
        }

        let b = &self.bars;
        let mut columns = vec![
            date_column("date", b.iter().map(|x| x.date))?,
            f64_col("open", &b.iter().map(|x| x.open).collect::<Vec<_>>()),
            f64_col("high", &b.iter().map(|x| x.high).collect::<Vec<_>>()),
            f64_col("low", &b.iter().map(|x| x.low).collect::<Vec<_>>()),
            f64_col("close", &b.iter().map(|x| x.close).collect::<Vec<_>>()),
            f64_col("volume", &b.iter().map(|x| x.volume).collect::<Vec<_>>()),
            f64_col("true_range", &self.dmi.true_range),
            f64_col("di_plus", &self.dmi.di_plus),
            f64_col("di_minus", &self.dmi.di_minus),
            f64_col("dx", &self.dmi.dx),
            f64_col("adx", &self.dmi.adx),
            label_col("regime", &self.regime, Regime::as_str),
            f64_col("psar", &self.sar.psar),
            bool_col("psar_bull", &self.sar.psar_bull),
        ];

        for (period, values) in self.ma.periods.iter().zip(&self.ma.ema) {
            columns.push(f64_col(&format!("ema_{period}"), values));
        }
        let [_, _, medium, long] = self.ma.periods;
        columns.extend([
            label_col(&format!("price_vs_ema{medium}"), &self.ma.price_vs_medium, PriceLevel::as_str),
            label_col(&format!("price_vs_ema{long}"), &self.ma.price_vs_long, PriceLevel::as_str),
            label_col("ma_alignment", &self.ma.alignment, MaAlignment::as_str),
            f64_col("bb_mid", &self.bollinger.mid),
            f64_col("bb_upper", &self.bollinger.upper),
            f64_col("bb_lower", &self.bollinger.lower),
            f64_col("bb_width", &self.bollinger.width),
            f64_col("bb_pct", &self.bollinger.pct),
            bool_col("bb_squeeze", &self.bollinger.squeeze),
            f64_col("donchian_high", &self.donchian.high),
            f64_col("donchian_low", &self.donchian.low),
            optional_label_col("donchian_breakout", &self.donchian.breakout, Breakout::as_str),
            f64_col("rsi", &self.rsi.rsi),
            label_col("rsi_zone", &self.rsi.zone, Zone::as_str),
            bool_col("rsi_above50", &self.rsi.above_50),
            f64_col("macd", &self.macd.line),
            f64_col("macd_signal", &self.macd.signal),
            f64_col("macd_hist", &self.macd.histogram),
            label_col("macd_hist_dir", &self.macd.hist_direction, Direction::as_str),
            f64_col("stoch_k", &self.stochastic.k),
            f64_col("stoch_d", &self.stochastic.d),
            label_col("stoch_zone", &self.stochastic.zone, Zone::as_str),
            f64_col("obv", &self.volume.obv),
            f64_col("obv_ema", &self.volume.obv_ema),
            label_col("obv_trend", &self.volume.obv_trend, Direction::as_str),
            f64_col("vol_sma", &self.volume.volume_sma),
            f64_col("vol_ratio", &self.volume.volume_ratio),
            bool_col("vol_above_avg", &self.volume.above_average),
            optional_label_col("vol_price_signal", &self.volume.price_signal, VolumePriceSignal::as_str),
        ]);

        DataFrame::new(columns)
    }
}

/// One row of the frame, as read by the scorer.
///
/// Numeric fields are NaN where the indicator had too little history.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct BarSnapshot {
    pub date: NaiveDate,
    pub close: f64,
    pub regime: Regime,
    pub adx: f64,
    pub di_plus: f64,
    pub di_minus: f64,
    pub psar_bull: bool,
    pub ma_alignment: MaAlignment,
    pub price_vs_medium: PriceLevel,
    pub price_vs_long: PriceLevel,
    pub donchian_breakout: Option<Breakout>,
    pub rsi: f64,
    pub rsi_zone: Zone,
    pub rsi_above_50: bool,
    pub macd: f64,
    pub macd_signal: f64,
    pub macd_hist_direction: Direction,
    pub stoch_d: f64,
    pub stoch_zone: Zone,
    pub obv_trend: Direction,
    pub volume_above_average: bool,
    pub volume_price: Option<VolumePriceSignal>,
    pub bb_squeeze: bool,
    pub bb_pct: f64,
}
