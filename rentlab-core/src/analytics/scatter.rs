//! Count vs. total amount per group, with an OLS trendline.

use super::aggregate::{SummaryRow, SummaryTable};
use super::labels::Locale;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterPoint {
    pub label: String,
    pub contract_count: usize,
    pub total_value_sum: f64,
}

/// Least-squares line `total = intercept + slope * count`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterFit {
    pub points: Vec<ScatterPoint>,
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

impl ScatterFit {
    /// Fit the group rows of `table`; the Total row is ignored.
    ///
    /// Returns `None` with fewer than two groups or when every group has the
    /// same contract count.
    pub fn from_table(table: &SummaryTable, locale: Locale) -> Option<Self> {
        Self::fit(table.groups(), locale)
    }

    fn fit(rows: &[SummaryRow], locale: Locale) -> Option<Self> {
        if rows.len() < 2 {
            return None;
        }
        let n = rows.len() as f64;
        let xs: Vec<f64> = rows.iter().map(|r| r.contract_count as f64).collect();
        let ys: Vec<f64> = rows.iter().map(|r| r.total_value_sum).collect();
        let mean_x = xs.iter().sum::<f64>() / n;
        let mean_y = ys.iter().sum::<f64>() / n;

        let sxx: f64 = xs.iter().map(|x| (x - mean_x).powi(2)).sum();
        if sxx == 0.0 {
            return None;
        }
        let sxy: f64 = xs
            .iter()
            .zip(&ys)
            .map(|(x, y)| (x - mean_x) * (y - mean_y))
            .sum();
        let syy: f64 = ys.iter().map(|y| (y - mean_y).powi(2)).sum();

        let slope = sxy / sxx;
        let intercept = mean_y - slope * mean_x;
        let r_squared = if syy == 0.0 { 1.0 } else { (sxy * sxy) / (sxx * syy) };

        let points = rows
            .iter()
            .map(|r| ScatterPoint {
                label: r.label.display(locale),
                contract_count: r.contract_count,
                total_value_sum: r.total_value_sum,
            })
            .collect();

        Some(Self {
            points,
            slope,
            intercept,
            r_squared,
        })
    }

    /// Trendline value at a given contract count.
    pub fn predict(&self, count: f64) -> f64 {
        self.intercept + self.slope * count
    }
}
