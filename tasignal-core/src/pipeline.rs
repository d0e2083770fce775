//! Fixed-order indicator pipeline.
//!
//! ADX/DMI → regime → SAR → EMA stack → Bollinger → Donchian → RSI → MACD →
//! stochastic → OBV and volume context. Each stage only reads the bars, so
//! the order is about reproducible logs rather than data dependencies.

use tracing::{debug, trace};

use crate::config::IndicatorParams;
use crate::domain::Bar;
use crate::frame::{validate_dates, FrameError, IndicatorFrame};
use crate::indicators::Indicator;

/// Build the full indicator frame for one instrument.
///
/// Rejects empty input, unsorted or duplicated dates, and parameter sets
/// that fail [`IndicatorParams::validate`]. Short histories are not an
/// error; columns simply stay NaN where lookback is missing.
pub fn build_frame(bars: Vec<Bar>, params: &IndicatorParams) -> Result<IndicatorFrame, FrameError> {
    params.validate()?;
    validate_dates(&bars)?;

    let n = bars.len();
    let longest = params.moving_averages.long.max(params.bollinger.squeeze_lookback);
    if n < longest {
        debug!(bars = n, wanted = longest, "short history, some columns stay NaN");
    }
    let gaps = bars.iter().filter(|b| b.has_gap()).count();
    let inconsistent = bars.iter().filter(|b| !b.has_gap() && !b.is_consistent()).count();
    if gaps + inconsistent > 0 {
        debug!(gaps, inconsistent, "bars with missing or inconsistent OHLCV");
    }

    let dmi = run_stage(&params.dmi, &bars);
    let regime = params.regime.classify_series(&dmi.adx);
    let sar = run_stage(&params.sar, &bars);
    let ma = run_stage(&params.moving_averages, &bars);
    let bollinger = run_stage(&params.bollinger, &bars);
    let donchian = run_stage(&params.donchian, &bars);
    let rsi = run_stage(&params.rsi, &bars);
    let macd = run_stage(&params.macd, &bars);
    let stochastic = run_stage(&params.stochastic, &bars);
    let volume = run_stage(&params.volume, &bars);

    debug!(
        bars = n,
        first = %bars[0].date,
        last = %bars[n - 1].date,
        regime = %regime[n - 1],
        "indicator frame built"
    );

    Ok(IndicatorFrame {
        bars,
        dmi,
        regime,
        sar,
        ma,
        bollinger,
        donchian,
        rsi,
        macd,
        stochastic,
        volume,
    })
}

fn run_stage<I: Indicator>(indicator: &I, bars: &[Bar]) -> I::Output {
    let lookback = indicator.lookback();
    trace!(
        indicator = %indicator.name(),
        lookback,
        computable = bars.len() > lookback,
        "stage"
    );
    indicator.compute(bars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{make_bars, Regime};

    #[test]
    fn rejects_empty_series() {
        let err = build_frame(Vec::new(), &IndicatorParams::default()).unwrap_err();
        assert!(matches!(err, FrameError::EmptySeries));
    }

    #[test]
    fn rejects_invalid_params_before_computing() {
        let mut params = IndicatorParams::default();
        params.rsi.period = 0;
        let err = build_frame(make_bars(&[1.0, 2.0]), &params).unwrap_err();
        assert!(matches!(err, FrameError::Parameters(_)));
    }

    #[test]
    fn single_bar_is_all_degraded() {
        let frame = build_frame(make_bars(&[100.0]), &IndicatorParams::default()).unwrap();
        assert_eq!(frame.len(), 1);
        let row = frame.decision_row().unwrap();
        assert_eq!(row.regime, Regime::Ranging);
        assert!(row.adx.is_nan());
        assert!(row.rsi.is_nan());
        assert!(row.bb_pct.is_nan());
        assert!(row.donchian_breakout.is_none());
    }

    #[test]
    fn every_column_matches_bar_count() {
        let closes: Vec<f64> = (0..75).map(|i| 50.0 + (i % 7) as f64).collect();
        let frame = build_frame(make_bars(&closes), &IndicatorParams::default()).unwrap();
        let n = frame.len();
        assert_eq!(n, 75);
        assert_eq!(frame.regime().len(), n);
        assert_eq!(frame.sar().psar_bull.len(), n);
        assert!(frame.moving_averages().ema.iter().all(|c| c.len() == n));
        assert_eq!(frame.bollinger().squeeze.len(), n);
        assert_eq!(frame.donchian().breakout.len(), n);
        assert_eq!(frame.rsi().zone.len(), n);
        assert_eq!(frame.macd().hist_direction.len(), n);
        assert_eq!(frame.stochastic().zone.len(), n);
        assert_eq!(frame.volume().price_signal.len(), n);
    }
}
