//! Multi-seasonal-trend decomposition (MSTL) of a daily series.
//!
//! Periods are processed in ascending order. Each outer iteration re-adds a
//! period's previous seasonal estimate to the running deseasonalized series,
//! re-extracts it with a single-period STL fit, and subtracts it again. After
//! the last iteration a final loess trend is fitted to the series with every
//! seasonal component removed; the residual is what remains.
//!
//! The STL fits need a dense daily grid: days between the first and last
//! observation that have no value are filled by linear interpolation and
//! flagged as imputed in the result.
//!
//! At the minimum history of two cycles of the longest period, each of its
//! cycle-subseries holds two points, which a degree-1 loess fits exactly. The
//! seasonal components then absorb the short-term variation, noise included,
//! and the residual is close to zero. Seasonal output at that length is not
//! evidence of a seasonal pattern; it needs a few more cycles of history.

use super::loess::loess;
use super::stl::{stl, trend_span, StlParams};
use crate::config::DecompositionConfig;
use crate::domain::{DailyPoint, DecompositionPoint, DecompositionResult};
use crate::error::AnalyticsError;
use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;

/// Default cycle-subseries span for the k-th period (k starts at 1).
pub fn default_seasonal_span(k: usize) -> usize {
    7 + 4 * k
}

/// A configured decomposition: periods with their spans and iteration counts.
#[derive(Debug, Clone, PartialEq)]
pub struct Decomposer {
    /// (period, seasonal span), ascending by period.
    seasons: Vec<(usize, usize)>,
    iterations: usize,
    inner_iterations: usize,
}

impl Decomposer {
    /// Default settings for the given periods.
    pub fn new(periods: &[usize]) -> Result<Self, AnalyticsError> {
        Self::with_config(periods, &DecompositionConfig::default())
    }

    pub fn with_config(periods: &[usize], config: &DecompositionConfig) -> Result<Self, AnalyticsError> {
        if periods.is_empty() {
            return Err(AnalyticsError::InvalidPeriod(0));
        }
        if let Some(p) = periods.iter().find(|p| **p < 2) {
            return Err(AnalyticsError::InvalidPeriod(*p));
        }
        let spans: Vec<usize> = match &config.seasonal_windows {
            Some(spans) => spans.clone(),
            None => Vec::new(),
        };
        if let Some(s) = spans.iter().find(|s| **s < 3 || **s % 2 == 0) {
            return Err(AnalyticsError::InvalidSpan(*s));
        }

        let mut seasons: Vec<(usize, Option<usize>)> = periods
            .iter()
            .enumerate()
            .map(|(i, p)| (*p, spans.get(i).copied()))
            .collect();
        seasons.sort_by_key(|(p, _)| *p);
        seasons.dedup_by_key(|(p, _)| *p);

        let seasons = seasons
            .into_iter()
            .enumerate()
            .map(|(k, (p, span))| (p, span.unwrap_or_else(|| default_seasonal_span(k + 1))))
            .collect();

        Ok(Self {
            seasons,
            iterations: config.iterations.max(1),
            inner_iterations: config.inner_iterations.max(1),
        })
    }

    /// Seasonal periods in processing order.
    pub fn periods(&self) -> Vec<usize> {
        self.seasons.iter().map(|(p, _)| *p).collect()
    }

    /// Calendar days needed: twice the longest period.
    pub fn required_days(&self) -> usize {
        2 * self.seasons.last().map(|(p, _)| *p).unwrap_or(0)
    }

    pub fn decompose(&self, points: &[DailyPoint]) -> Result<DecompositionResult, AnalyticsError> {
        if points.is_empty() {
            return Err(AnalyticsError::EmptyInput);
        }

        let grid = DailyGrid::from_points(points);
        let required = self.required_days();
        if grid.len() < required {
            return Err(AnalyticsError::InsufficientData {
                required,
                available: grid.len(),
            });
        }
        if grid.imputed_count() > 0 {
            log::warn!(
                "decompose: interpolated {} of {} calendar days",
                grid.imputed_count(),
                grid.len()
            );
        }

        let y = &grid.values;
        let n = y.len();
        let mut seasonal: Vec<Vec<f64>> = vec![vec![0.0; n]; self.seasons.len()];
        let mut deseasonalized = y.clone();

        for _ in 0..self.iterations {
            for (i, (period, span)) in self.seasons.iter().enumerate() {
                for (d, s) in deseasonalized.iter_mut().zip(&seasonal[i]) {
                    *d += s;
                }
                let fit = stl(&deseasonalized, &StlParams::new(*period, *span, self.inner_iterations));
                seasonal[i] = fit.seasonal;
                for (d, s) in deseasonalized.iter_mut().zip(&seasonal[i]) {
                    *d -= s;
                }
            }
        }

        let (longest, longest_span) = self.seasons[self.seasons.len() - 1];
        let trend = loess(&deseasonalized, trend_span(longest, longest_span));

        let points = (0..n)
            .map(|t| {
                let components: Vec<f64> = seasonal.iter().map(|s| s[t]).collect();
                let residual = y[t] - trend[t] - components.iter().sum::<f64>();
                DecompositionPoint {
                    date: grid.dates[t],
                    observed: y[t],
                    trend: trend[t],
                    seasonal: components,
                    residual,
                    imputed: grid.imputed[t],
                }
            })
            .collect();

        log::debug!("decompose: {n} days, periods {:?}", self.periods());

        Ok(DecompositionResult {
            periods: self.periods(),
            points,
        })
    }
}

/// Decompose with default settings.
pub fn decompose(points: &[DailyPoint], periods: &[usize]) -> Result<DecompositionResult, AnalyticsError> {
    Decomposer::new(periods)?.decompose(points)
}

/// A dense daily grid spanning the first to the last observed date.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyGrid {
    pub dates: Vec<NaiveDate>,
    pub values: Vec<f64>,
    pub imputed: Vec<bool>,
}

impl DailyGrid {
    /// Build the grid, averaging duplicate dates and interpolating gaps.
    pub fn from_points(points: &[DailyPoint]) -> Self {
        let mut by_date: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
        for p in points {
            let entry = by_date.entry(p.date).or_insert((0.0, 0));
            entry.0 += p.value;
            entry.1 += 1;
        }
        let observed: Vec<(NaiveDate, f64)> = by_date
            .into_iter()
            .map(|(d, (sum, count))| (d, sum / count as f64))
            .collect();

        let mut grid = DailyGrid {
            dates: Vec::new(),
            values: Vec::new(),
            imputed: Vec::new(),
        };
        let Some(&(first, first_value)) = observed.first() else {
            return grid;
        };
        grid.push(first, first_value, false);

        for pair in observed.windows(2) {
            let (d0, v0) = pair[0];
            let (d1, v1) = pair[1];
            let gap = (d1 - d0).num_days();
            for step in 1..gap {
                let frac = step as f64 / gap as f64;
                grid.push(d0 + Duration::days(step), v0 + (v1 - v0) * frac, true);
            }
            grid.push(d1, v1, false);
        }
        grid
    }

    fn push(&mut self, date: NaiveDate, value: f64, imputed: bool) {
        self.dates.push(date);
        self.values.push(value);
        self.imputed.push(imputed);
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn imputed_count(&self) -> usize {
        self.imputed.iter().filter(|i| **i).count()
    }
}
