//! Daily series and the outputs derived from them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One observed calendar day and its raw metric value.
///
/// Days without records are absent from a series, never zero-valued.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub value: f64,
}

impl DailyPoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// A daily point with its calendar-windowed means.
///
/// `means[i]` belongs to `SmoothedSeries::windows[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmoothedPoint {
    pub date: NaiveDate,
    pub raw: f64,
    pub means: Vec<f64>,
}

/// Multi-resolution smoothed series, sorted ascending by date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SmoothedSeries {
    pub windows: Vec<u32>,
    pub points: Vec<SmoothedPoint>,
}

impl SmoothedSeries {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// All means for one window size, aligned with `points`.
    pub fn column(&self, window: u32) -> Option<Vec<f64>> {
        let idx = self.windows.iter().position(|w| *w == window)?;
        Some(self.points.iter().map(|p| p.means[idx]).collect())
    }

    /// The smoothed value for `window` at `date`, if that date was observed.
    pub fn value_at(&self, date: NaiveDate, window: u32) -> Option<f64> {
        let idx = self.windows.iter().position(|w| *w == window)?;
        let pos = self.points.binary_search_by_key(&date, |p| p.date).ok()?;
        Some(self.points[pos].means[idx])
    }
}

/// One calendar day of a decomposition.
///
/// `observed` is the value that was decomposed: the raw metric, or the linear
/// interpolation between neighbours when `imputed` is set.
/// `seasonal[i]` belongs to `DecompositionResult::periods[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecompositionPoint {
    pub date: NaiveDate,
    pub observed: f64,
    pub trend: f64,
    pub seasonal: Vec<f64>,
    pub residual: f64,
    pub imputed: bool,
}

impl DecompositionPoint {
    /// trend + every seasonal component + residual.
    pub fn reconstructed(&self) -> f64 {
        self.trend + self.seasonal.iter().sum::<f64>() + self.residual
    }
}

/// Trend, per-period seasonal components and residual over a dense daily grid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecompositionResult {
    /// Seasonal periods in ascending order.
    pub periods: Vec<usize>,
    pub points: Vec<DecompositionPoint>,
}

impl DecompositionResult {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn trend(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.trend).collect()
    }

    pub fn residual(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.residual).collect()
    }

    /// The seasonal component for one configured period.
    pub fn seasonal(&self, period: usize) -> Option<Vec<f64>> {
        let idx = self.periods.iter().position(|p| *p == period)?;
        Some(self.points.iter().map(|p| p.seasonal[idx]).collect())
    }

    /// Number of calendar days filled by interpolation.
    pub fn imputed_count(&self) -> usize {
        self.points.iter().filter(|p| p.imputed).count()
    }

    /// Points for dates present in the input series only.
    pub fn observed_points(&self) -> impl Iterator<Item = &DecompositionPoint> {
        self.points.iter().filter(|p| !p.imputed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn smoothed_column_and_lookup() {
        let series = SmoothedSeries {
            windows: vec![7, 30],
            points: vec![
                SmoothedPoint { date: day(1), raw: 2.0, means: vec![2.0, 2.0] },
                SmoothedPoint { date: day(3), raw: 4.0, means: vec![3.0, 3.0] },
            ],
        };
        assert_eq!(series.column(7), Some(vec![2.0, 3.0]));
        assert_eq!(series.column(90), None);
        assert_eq!(series.value_at(day(3), 30), Some(3.0));
        assert_eq!(series.value_at(day(2), 30), None);
    }

    #[test]
    fn reconstruction_sums_components() {
        let p = DecompositionPoint {
            date: day(1),
            observed: 10.0,
            trend: 8.0,
            seasonal: vec![1.5, -0.5],
            residual: 1.0,
            imputed: false,
        };
        assert_eq!(p.reconstructed(), 10.0);
    }

    #[test]
    fn seasonal_lookup_by_period() {
        let result = DecompositionResult {
            periods: vec![182, 365],
            points: vec![DecompositionPoint {
                date: day(1),
                observed: 1.0,
                trend: 1.0,
                seasonal: vec![0.25, -0.25],
                residual: 0.0,
                imputed: true,
            }],
        };
        assert_eq!(result.seasonal(365), Some(vec![-0.25]));
        assert_eq!(result.seasonal(7), None);
        assert_eq!(result.imputed_count(), 1);
        assert_eq!(result.observed_points().count(), 0);
    }
}
