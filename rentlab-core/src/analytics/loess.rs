//! Locally weighted linear regression (loess) on an evenly spaced index.
//!
//! Tricube weights over the `span` nearest observations, with the bandwidth
//! widened past the data range when `span` exceeds the series length. This is
//! the smoother used by every pass of the seasonal-trend decomposition.

/// Loess estimate at position `xs` from observations `y[left..=right]`.
///
/// `xs` may lie outside `[0, y.len() - 1]` for one-step extrapolation.
/// Returns `None` when every weight vanishes.
pub fn estimate(
    y: &[f64],
    span: usize,
    xs: f64,
    left: usize,
    right: usize,
    scratch: &mut Vec<f64>,
) -> Option<f64> {
    let n = y.len();
    let range = n as f64 - 1.0;
    let mut h = (xs - left as f64).max(right as f64 - xs);
    if span > n {
        h += ((span - n) / 2) as f64;
    }
    let h9 = 0.999 * h;
    let h1 = 0.001 * h;

    scratch.clear();
    let mut total = 0.0;
    for j in left..=right {
        let r = (j as f64 - xs).abs();
        let w = if r > h9 {
            0.0
        } else if r <= h1 {
            1.0
        } else {
            (1.0 - (r / h).powi(3)).powi(3)
        };
        scratch.push(w);
        total += w;
    }
    if total <= 0.0 {
        return None;
    }
    for w in scratch.iter_mut() {
        *w /= total;
    }

    if h > 0.0 {
        let center: f64 = (left..=right).zip(scratch.iter()).map(|(j, w)| w * j as f64).sum();
        let spread: f64 = (left..=right)
            .zip(scratch.iter())
            .map(|(j, w)| w * (j as f64 - center).powi(2))
            .sum();
        if spread.sqrt() > 0.001 * range {
            let slope = (xs - center) / spread;
            for (j, w) in (left..=right).zip(scratch.iter_mut()) {
                *w *= slope * (j as f64 - center) + 1.0;
            }
        }
    }

    Some((left..=right).zip(scratch.iter()).map(|(j, w)| w * y[j]).sum())
}

/// Loess-smooth a whole series with a centered window of `span` points.
///
/// Windows are clamped at the ends so each estimate uses exactly
/// `min(span, n)` observations.
pub fn loess(y: &[f64], span: usize) -> Vec<f64> {
    let n = y.len();
    if n < 2 {
        return y.to_vec();
    }
    let mut scratch = Vec::with_capacity(span.min(n));
    (0..n)
        .map(|i| {
            let (left, right) = window_bounds(i, span, n);
            estimate(y, span, i as f64, left, right, &mut scratch).unwrap_or(y[i])
        })
        .collect()
}

fn window_bounds(i: usize, span: usize, n: usize) -> (usize, usize) {
    if span >= n {
        return (0, n - 1);
    }
    let left = i.saturating_sub(span / 2).min(n - span);
    (left, left + span - 1)
}

/// Trailing moving average; the output has `x.len() - len + 1` values.
pub fn moving_average(x: &[f64], len: usize) -> Vec<f64> {
    if len == 0 || x.len() < len {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(x.len() - len + 1);
    let mut sum: f64 = x[..len].iter().sum();
    out.push(sum / len as f64);
    for i in len..x.len() {
        sum += x[i] - x[i - len];
        out.push(sum / len as f64);
    }
    out
}

/// Smallest odd integer >= `x`.
pub fn next_odd(x: f64) -> usize {
    let n = x.ceil().max(1.0) as usize;
    if n % 2 == 0 {
        n + 1
    } else {
        n
    }
}
