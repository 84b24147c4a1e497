//! One full dashboard pass: filter, summarize, smooth and decompose.
//!
//! The pass is a pure function of the store, the filter and the config.
//! Sections fail independently: a series too short to decompose is reported
//! as skipped while the tables and smoothed lines are still produced.

use crate::analytics::labels::{seasonal_label, total_label, window_label};
use crate::analytics::{smooth, Decomposer, Locale, ScatterFit, SummaryTable};
use crate::config::AnalyticsConfig;
use crate::data::{daily_mean, DailyMetric, FilterParams, RecordStore};
use crate::domain::{ContractRecord, DailyPoint, DecompositionResult, GroupKey, SmoothedSeries};
use crate::error::AnalyticsError;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Result of one section that may be skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum MetricOutcome<T> {
    Computed(T),
    Skipped { reason: String },
}

impl<T> MetricOutcome<T> {
    fn from_result(metric: DailyMetric, section: &str, result: Result<T, AnalyticsError>) -> Self {
        match result {
            Ok(value) => MetricOutcome::Computed(value),
            Err(e) => {
                warn!("{section} skipped for {metric:?}: {e}");
                MetricOutcome::Skipped {
                    reason: e.to_string(),
                }
            }
        }
    }

    pub fn computed(&self) -> Option<&T> {
        match self {
            MetricOutcome::Computed(v) => Some(v),
            MetricOutcome::Skipped { .. } => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, MetricOutcome::Skipped { .. })
    }
}

/// Daily series of one metric with its derived views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSection {
    pub metric: DailyMetric,
    pub label: String,
    pub daily: Vec<DailyPoint>,
    pub smoothed: MetricOutcome<SmoothedSeries>,
    pub decomposition: MetricOutcome<DecompositionResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardReport {
    /// Set when the filter selected no records; every section is then empty.
    pub no_data: bool,
    pub record_count: usize,
    pub dataset_hash: String,
    pub filter: FilterParams,
    pub locale: Locale,
    pub by_store: SummaryTable,
    pub by_category: SummaryTable,
    pub store_scatter: Option<ScatterFit>,
    pub contracts: MetricSection,
    pub daily_rate: MetricSection,
}

pub struct Dashboard;

impl Dashboard {
    pub fn compute(
        store: &RecordStore,
        filter: &FilterParams,
        config: &AnalyticsConfig,
    ) -> DashboardReport {
        let records = filter.apply(store.records());
        info!(
            "dashboard: {} of {} records selected",
            records.len(),
            store.len()
        );

        let by_store = SummaryTable::build(&records, GroupKey::Store, config.total_mean);
        let by_category = SummaryTable::build(&records, GroupKey::VehicleCategory, config.total_mean);
        let store_scatter = ScatterFit::from_table(&by_store.without_total(), config.locale);

        DashboardReport {
            no_data: records.is_empty(),
            record_count: records.len(),
            dataset_hash: store.dataset_hash().to_string(),
            filter: filter.clone(),
            locale: config.locale,
            by_store,
            by_category,
            store_scatter,
            contracts: Self::metric(&records, DailyMetric::Contracts, config),
            daily_rate: Self::metric(&records, DailyMetric::DailyRate, config),
        }
    }

    /// Build, smooth and decompose the daily series of one metric.
    pub fn metric(
        records: &[ContractRecord],
        metric: DailyMetric,
        config: &AnalyticsConfig,
    ) -> MetricSection {
        let daily = daily_mean(records, metric);
        let smoothed = MetricOutcome::from_result(metric, "smoothing", smooth(&daily, &config.windows));
        let decomposition = MetricOutcome::from_result(
            metric,
            "decomposition",
            Decomposer::with_config(&config.periods, &config.decomposition)
                .and_then(|d| d.decompose(&daily)),
        );
        MetricSection {
            metric,
            label: metric.label(config.locale).to_string(),
            daily,
            smoothed,
            decomposition,
        }
    }
}

impl DashboardReport {
    /// Plain-text rendering for terminals.
    pub fn to_text(&self) -> String {
        let locale = self.locale;
        let mut out = String::new();
        if self.no_data {
            let _ = writeln!(
                out,
                "{}",
                match locale {
                    Locale::Pt => "Nenhum dado para os filtros selecionados.",
                    Locale::En => "No data for the selected filters.",
                }
            );
            return out;
        }

        out.push_str(&self.by_store.to_text(locale));
        out.push('\n');
        out.push_str(&self.by_category.to_text(locale));

        if let Some(fit) = &self.store_scatter {
            let _ = writeln!(
                out,
                "\nOLS: y = {:.2}x + {:.2} (r² = {:.3})",
                fit.slope, fit.intercept, fit.r_squared
            );
        }

        for section in [&self.contracts, &self.daily_rate] {
            out.push('\n');
            section.write_text(&mut out, locale);
        }
        out
    }

    pub fn total_label(&self) -> &'static str {
        total_label(self.locale)
    }
}

impl MetricSection {
    fn write_text(&self, out: &mut String, locale: Locale) {
        let (observed, skipped) = match locale {
            Locale::Pt => ("dias observados", "ignorado"),
            Locale::En => ("observed days", "skipped"),
        };
        let _ = writeln!(out, "{} ({} {observed})", self.label, self.daily.len());
        match &self.smoothed {
            MetricOutcome::Computed(series) => {
                if let Some(last) = series.points.last() {
                    let _ = writeln!(out, "  {}: {:.2}", last.date, last.raw);
                    for (window, mean) in series.windows.iter().zip(&last.means) {
                        let _ = writeln!(out, "  {}: {:.2}", window_label(*window, locale), mean);
                    }
                }
            }
            MetricOutcome::Skipped { reason } => {
                let _ = writeln!(out, "  {}: {skipped} ({reason})", window_label_prefix(locale));
            }
        }
        match &self.decomposition {
            MetricOutcome::Computed(result) => {
                let trend = result.trend();
                if let (Some(first), Some(last)) = (trend.first(), trend.last()) {
                    let _ = writeln!(out, "  trend: {first:.2} -> {last:.2}");
                }
                for period in &result.periods {
                    if let Some(seasonal) = result.seasonal(*period) {
                        let (lo, hi) = seasonal
                            .iter()
                            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                                (lo.min(*v), hi.max(*v))
                            });
                        let _ = writeln!(
                            out,
                            "  {}: [{lo:.2}, {hi:.2}]",
                            seasonal_label(*period, locale)
                        );
                    }
                }
                let _ = writeln!(out, "  imputed days: {}", result.imputed_count());
            }
            MetricOutcome::Skipped { reason } => {
                let _ = writeln!(out, "  STL: {skipped} ({reason})");
            }
        }
    }
}

fn window_label_prefix(locale: Locale) -> &'static str {
    match locale {
        Locale::Pt => "Suavização",
        Locale::En => "Smoothing",
    }
}
