//! Single-period seasonal-trend decomposition by loess (STL).
//!
//! Non-robust inner loop of Cleveland et al. (1990). Each pass:
//! 1. detrend with the current trend estimate (zero on the first pass);
//! 2. loess-smooth every cycle-subseries (values sharing a phase position),
//!    extrapolating one cycle before and after;
//! 3. low-pass the result (moving averages of length p, p, 3, then loess) and
//!    subtract it, so the seasonal component carries no trend;
//! 4. loess-smooth the deseasonalized series into the next trend estimate.
//!
//! Spans scale with the period: the low-pass span is the smallest odd integer
//! above `p` and the trend span is the smallest odd integer at or above
//! `1.5p / (1 - 1.5/n_s)`.

use super::loess::{estimate, loess, moving_average, next_odd};

/// Spans and iteration count for one STL fit.
#[derive(Debug, Clone, PartialEq)]
pub struct StlParams {
    pub period: usize,
    /// Cycle-subseries span (odd, >= 3).
    pub seasonal_span: usize,
    pub trend_span: usize,
    pub low_pass_span: usize,
    pub inner_iterations: usize,
}

impl StlParams {
    pub fn new(period: usize, seasonal_span: usize, inner_iterations: usize) -> Self {
        Self {
            period,
            seasonal_span,
            trend_span: trend_span(period, seasonal_span),
            low_pass_span: next_odd(period as f64 + 1.0),
            inner_iterations,
        }
    }
}

/// Default trend span for a period and seasonal span.
pub fn trend_span(period: usize, seasonal_span: usize) -> usize {
    next_odd(1.5 * period as f64 / (1.0 - 1.5 / seasonal_span as f64))
}

#[derive(Debug, Clone, PartialEq)]
pub struct StlFit {
    pub seasonal: Vec<f64>,
    pub trend: Vec<f64>,
}

/// Decompose `y` (dense, evenly spaced) into seasonal and trend parts.
///
/// Callers guarantee `y.len() >= 2 * params.period`.
pub fn stl(y: &[f64], params: &StlParams) -> StlFit {
    let n = y.len();
    let p = params.period;
    let mut trend = vec![0.0; n];
    let mut seasonal = vec![0.0; n];

    for _ in 0..params.inner_iterations {
        let detrended: Vec<f64> = y.iter().zip(&trend).map(|(v, t)| v - t).collect();
        let cycle = cycle_subseries(&detrended, p, params.seasonal_span);
        let low = low_pass(&cycle, p, params.low_pass_span);

        seasonal = cycle[p..p + n]
            .iter()
            .zip(&low)
            .map(|(c, l)| c - l)
            .collect();

        let deseasonalized: Vec<f64> = y.iter().zip(&seasonal).map(|(v, s)| v - s).collect();
        trend = loess(&deseasonalized, params.trend_span);
    }

    StlFit { seasonal, trend }
}

/// Smooth each phase position across cycles.
///
/// Output has `n + 2p` values: one extrapolated cycle, the `n` smoothed
/// values, one more extrapolated cycle.
fn cycle_subseries(x: &[f64], p: usize, span: usize) -> Vec<f64> {
    let n = x.len();
    let mut out = vec![0.0; n + 2 * p];
    let mut scratch = Vec::with_capacity(span);

    for phase in 0..p.min(n) {
        let sub: Vec<f64> = x.iter().skip(phase).step_by(p).copied().collect();
        let k = sub.len();
        let smoothed = loess(&sub, span);

        let right = span.min(k) - 1;
        let before = estimate(&sub, span, -1.0, 0, right, &mut scratch).unwrap_or(smoothed[0]);
        let left = k.saturating_sub(span);
        let after = estimate(&sub, span, k as f64, left, k - 1, &mut scratch)
            .unwrap_or(smoothed[k - 1]);

        out[phase] = before;
        for (m, v) in smoothed.iter().enumerate() {
            out[(m + 1) * p + phase] = *v;
        }
        out[(k + 1) * p + phase] = after;
    }

    out
}

/// Low-pass filter of the `n + 2p` cycle-subseries back down to `n` values.
fn low_pass(cycle: &[f64], p: usize, span: usize) -> Vec<f64> {
    let first = moving_average(cycle, p);
    let second = moving_average(&first, p);
    let third = moving_average(&second, 3);
    loess(&third, span)
}
