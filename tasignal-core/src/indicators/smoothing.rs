//! Smoothing primitives shared by every indicator.
//!
//! Each recurrence is a small `Copy` state with a pure step function
//! `(state, input) -> (state, output)`. The series forms are left-to-right
//! scans over that step, so output `i` only ever sees inputs `0..=i`.
//!
//! Not-computable values are `f64::NAN` on both sides.
//!
//! - [`WilderSum`]: Wilder's cumulative smoothing, used for TR and DM.
//! - [`WilderMean`]: Wilder's averaging smoothing, used for DX -> ADX.
//! - [`Ema`]: exponential moving average with a configurable alpha and
//!   minimum observation count (span EMA and RSI's `alpha = 1/p` average).
//! - Window helpers: [`sma`], [`rolling_std`], [`rolling_max`], [`rolling_min`], [`lag`].

/// A single-input recurrence evaluated as a fold.
pub trait Recurrence: Copy {
    /// Advance by one input. Returns the next state and the output at this index.
    fn step(self, value: f64) -> (Self, f64);
}

/// Run a recurrence over a whole series.
pub fn scan<R: Recurrence>(values: &[f64], init: R) -> Vec<f64> {
    values
        .iter()
        .scan(init, |state, &value| {
            let (next, out) = state.step(value);
            *state = next;
            Some(out)
        })
        .collect()
}

// ── Wilder cumulative smoothing ──────────────────────────────────────

/// Wilder's cumulative smoother.
///
/// `out[p-1]` is the sum of the first `p` inputs (NaN inputs contribute
/// nothing); afterwards `out[i] = out[i-1] - out[i-1]/p + in[i]`. The result
/// is not normalized by `p`; the normalization cancels in ratios such as DI.
#[derive(Debug, Clone, Copy)]
pub struct WilderSum {
    period: usize,
    seen: usize,
    total: f64,
}

impl WilderSum {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "Wilder period must be >= 1");
        Self {
            period,
            seen: 0,
            total: 0.0,
        }
    }
}

impl Recurrence for WilderSum {
    fn step(self, value: f64) -> (Self, f64) {
        let seen = self.seen.saturating_add(1);
        if seen <= self.period {
            let total = if value.is_nan() {
                self.total
            } else {
                self.total + value
            };
            let out = if seen == self.period { total } else { f64::NAN };
            return (Self { seen, total, ..self }, out);
        }
        let total = self.total - self.total / self.period as f64 + value;
        (Self { seen, total, ..self }, total)
    }
}

/// Cumulative Wilder smoothing of a series. Shorter than `period` -> all NaN.
pub fn wilder_sum(values: &[f64], period: usize) -> Vec<f64> {
    scan(values, WilderSum::new(period))
}

// ── Wilder averaging smoothing ───────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum MeanPhase {
    /// No computable input seen yet.
    Waiting,
    /// Inside the seed window that starts at the first computable input.
    Seeding { filled: usize, sum: f64, count: usize },
    Running { prev: f64 },
}

/// Wilder's averaging smoother.
///
/// Leading NaN inputs are skipped. With `s` the first computable index,
/// `out[s+p-1]` is the mean of the computable inputs in `s..s+p`; afterwards
/// `out[i] = (out[i-1]*(p-1) + in[i]) / p`. A NaN input yields NaN at that
/// index, and since the next step reads `out[i-1]`, NaN persists from there.
#[derive(Debug, Clone, Copy)]
pub struct WilderMean {
    period: usize,
    phase: MeanPhase,
}

impl WilderMean {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "Wilder period must be >= 1");
        Self {
            period,
            phase: MeanPhase::Waiting,
        }
    }

    fn with(self, phase: MeanPhase) -> Self {
        Self { phase, ..self }
    }
}

impl Recurrence for WilderMean {
    fn step(self, value: f64) -> (Self, f64) {
        let p = self.period;
        match self.phase {
            MeanPhase::Waiting if value.is_nan() => (self, f64::NAN),
            MeanPhase::Waiting => {
                if p == 1 {
                    (self.with(MeanPhase::Running { prev: value }), value)
                } else {
                    let phase = MeanPhase::Seeding {
                        filled: 1,
                        sum: value,
                        count: 1,
                    };
                    (self.with(phase), f64::NAN)
                }
            }
            MeanPhase::Seeding { filled, sum, count } => {
                let (sum, count) = if value.is_nan() {
                    (sum, count)
                } else {
                    (sum + value, count + 1)
                };
                let filled = filled + 1;
                if filled == p {
                    let seed = sum / count as f64;
                    (self.with(MeanPhase::Running { prev: seed }), seed)
                } else {
                    (self.with(MeanPhase::Seeding { filled, sum, count }), f64::NAN)
                }
            }
            MeanPhase::Running { .. } if value.is_nan() => {
                (self.with(MeanPhase::Running { prev: f64::NAN }), f64::NAN)
            }
            MeanPhase::Running { prev } => {
                let next = (prev * (p - 1) as f64 + value) / p as f64;
                (self.with(MeanPhase::Running { prev: next }), next)
            }
        }
    }
}

/// Averaging Wilder smoothing of a series.
pub fn wilder_mean(values: &[f64], period: usize) -> Vec<f64> {
    scan(values, WilderMean::new(period))
}

// ── Exponential moving average ───────────────────────────────────────

/// Exponential moving average seeded with the first computable value.
///
/// `level[i] = level[i-1] + alpha * (in[i] - level[i-1])`, which equals
/// `alpha*in + (1-alpha)*level` and keeps a constant input exactly constant.
/// NaN inputs produce NaN at that index and leave the level untouched.
/// Output stays NaN until `min_periods` computable inputs have been seen.
#[derive(Debug, Clone, Copy)]
pub struct Ema {
    alpha: f64,
    min_periods: usize,
    observed: usize,
    level: Option<f64>,
}

impl Ema {
    /// Span EMA: `alpha = 2 / (period + 1)`, computable from the first value.
    pub fn span(period: usize) -> Self {
        assert!(period >= 1, "EMA period must be >= 1");
        Self::with_alpha(2.0 / (period as f64 + 1.0), 1)
    }

    /// Wilder-style exponential average: `alpha = 1 / period`, computable once
    /// `period` values have been observed.
    pub fn wilder(period: usize) -> Self {
        assert!(period >= 1, "Wilder period must be >= 1");
        Self::with_alpha(1.0 / period as f64, period)
    }

    pub fn with_alpha(alpha: f64, min_periods: usize) -> Self {
        assert!(alpha > 0.0 && alpha <= 1.0, "EMA alpha must be in (0, 1]");
        Self {
            alpha,
            min_periods,
            observed: 0,
            level: None,
        }
    }
}

impl Recurrence for Ema {
    fn step(self, value: f64) -> (Self, f64) {
        if value.is_nan() {
            return (self, f64::NAN);
        }
        let level = match self.level {
            None => value,
            Some(prev) => prev + self.alpha * (value - prev),
        };
        let observed = self.observed.saturating_add(1);
        let out = if observed >= self.min_periods {
            level
        } else {
            f64::NAN
        };
        (
            Self {
                observed,
                level: Some(level),
                ..self
            },
            out,
        )
    }
}

/// Span EMA of a series (`ema[0] = value[0]`).
pub fn ema(values: &[f64], period: usize) -> Vec<f64> {
    scan(values, Ema::span(period))
}

// ── Window helpers ───────────────────────────────────────────────────

/// Simple moving average. NaN until a full window of computable values exists.
pub fn sma(values: &[f64], window: usize) -> Vec<f64> {
    assert!(window >= 1, "SMA window must be >= 1");
    window_map(values, window, |w| {
        if w.iter().any(|v| v.is_nan()) {
            return f64::NAN;
        }
        w.iter().sum::<f64>() / window as f64
    })
}

/// Rolling sample standard deviation (Bessel-corrected, `ddof = 1`).
///
/// Values are shifted by the window's first element before the two-pass
/// sum, so a constant window gives exactly 0 whatever its level.
pub fn rolling_std(values: &[f64], window: usize) -> Vec<f64> {
    assert!(window >= 1, "std window must be >= 1");
    window_map(values, window, |w| {
        if window < 2 || w.iter().any(|v| v.is_nan()) {
            return f64::NAN;
        }
        let origin = w[0];
        let mean = w.iter().map(|v| v - origin).sum::<f64>() / window as f64;
        let ss: f64 = w
            .iter()
            .map(|v| {
                let d = (v - origin) - mean;
                d * d
            })
            .sum();
        (ss / (window - 1) as f64).sqrt()
    })
}

/// Rolling maximum over the trailing `window` positions, ignoring NaN and
/// requiring at least `min_periods` computable values. Partial windows at the
/// start of the series count once they hold `min_periods` values.
pub fn rolling_max(values: &[f64], window: usize, min_periods: usize) -> Vec<f64> {
    rolling_extreme(values, window, min_periods, f64::max)
}

/// Rolling minimum; see [`rolling_max`].
pub fn rolling_min(values: &[f64], window: usize, min_periods: usize) -> Vec<f64> {
    rolling_extreme(values, window, min_periods, f64::min)
}

/// Shift a series forward by one position: `out[i] = in[i-1]`, `out[0] = NaN`.
pub fn lag(values: &[f64]) -> Vec<f64> {
    std::iter::once(f64::NAN)
        .chain(values.iter().copied())
        .take(values.len())
        .collect()
}

fn rolling_extreme(
    values: &[f64],
    window: usize,
    min_periods: usize,
    pick: fn(f64, f64) -> f64,
) -> Vec<f64> {
    assert!(window >= 1, "rolling window must be >= 1");
    let min_periods = min_periods.max(1);
    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            let mut count = 0;
            let mut acc = f64::NAN;
            for &v in values[start..=i].iter().filter(|v| !v.is_nan()) {
                count += 1;
                acc = if acc.is_nan() { v } else { pick(acc, v) };
            }
            if count >= min_periods {
                acc
            } else {
                f64::NAN
            }
        })
        .collect()
}

/// Apply `f` to every full trailing window; NaN before the first full window.
fn window_map(values: &[f64], window: usize, f: impl Fn(&[f64]) -> f64) -> Vec<f64> {
    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                f64::NAN
            } else {
                f(&values[i + 1 - window..=i])
            }
        })
        .collect()
}
