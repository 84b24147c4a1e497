//! Calendar-window rolling means over irregular daily series.
//!
//! The window for a point at date `d` with size `W` is the half-open calendar
//! interval `(d - W days, d]`. Bounds are found by binary search on the sorted
//! date axis, so the mean covers exactly the observed days inside the interval
//! however many or few there are. Missing days are not filled and there is no
//! minimum observation count.

use crate::domain::{DailyPoint, SmoothedPoint, SmoothedSeries};
use crate::error::AnalyticsError;
use chrono::Duration;

/// Smooth `points` with every window in `windows`.
///
/// The input is copied and sorted ascending by date. Empty input yields an
/// empty series.
pub fn smooth(points: &[DailyPoint], windows: &[u32]) -> Result<SmoothedSeries, AnalyticsError> {
    if let Some(w) = windows.iter().find(|w| **w == 0) {
        return Err(AnalyticsError::InvalidWindow(*w));
    }

    let mut sorted = points.to_vec();
    sorted.sort_by_key(|p| p.date);

    let columns: Vec<Vec<f64>> = windows.iter().map(|w| rolling_mean(&sorted, *w)).collect();

    let points = sorted
        .iter()
        .enumerate()
        .map(|(i, p)| SmoothedPoint {
            date: p.date,
            raw: p.value,
            means: columns.iter().map(|col| col[i]).collect(),
        })
        .collect();

    log::debug!("smooth: {} points, windows {:?}", sorted.len(), windows);

    Ok(SmoothedSeries {
        windows: windows.to_vec(),
        points,
    })
}

/// Rolling calendar mean for one window over points already sorted by date.
pub fn rolling_mean(sorted: &[DailyPoint], window: u32) -> Vec<f64> {
    let span = Duration::days(i64::from(window));
    sorted
        .iter()
        .map(|p| {
            // A window reaching past the calendar's start covers every earlier point.
            let lo = match p.date.checked_sub_signed(span) {
                Some(start) => sorted.partition_point(|q| q.date <= start),
                None => 0,
            };
            let hi = sorted.partition_point(|q| q.date <= p.date);
            let slice = &sorted[lo..hi];
            slice.iter().map(|q| q.value).sum::<f64>() / slice.len() as f64
        })
        .collect()
}
