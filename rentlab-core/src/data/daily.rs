//! Per-day series built from contract records.

use crate::analytics::Locale;
use crate::domain::{ContractRecord, DailyPoint};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Quantity tracked per start date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DailyMetric {
    /// Number of contracts starting that day.
    Contracts,
    /// Mean average daily rate of contracts starting that day.
    DailyRate,
    TotalValue,
    Duration,
    AdvanceDays,
}

impl DailyMetric {
    pub fn label(&self, locale: Locale) -> &'static str {
        match (self, locale) {
            (DailyMetric::Contracts, Locale::Pt) => "Contratos",
            (DailyMetric::DailyRate, Locale::Pt) => "Diária Média",
            (DailyMetric::TotalValue, Locale::Pt) => "Valor Total Médio",
            (DailyMetric::Duration, Locale::Pt) => "Duração Média",
            (DailyMetric::AdvanceDays, Locale::Pt) => "Antecedência Média",
            (DailyMetric::Contracts, Locale::En) => "Contracts",
            (DailyMetric::DailyRate, Locale::En) => "Average Daily Rate",
            (DailyMetric::TotalValue, Locale::En) => "Mean Total Value",
            (DailyMetric::Duration, Locale::En) => "Mean Duration",
            (DailyMetric::AdvanceDays, Locale::En) => "Mean Advance Days",
        }
    }

    fn value(&self, record: &ContractRecord) -> f64 {
        match self {
            DailyMetric::Contracts => 1.0,
            DailyMetric::DailyRate => record.average_daily_rate,
            DailyMetric::TotalValue => record.total_rental_value,
            DailyMetric::Duration => record.rental_duration as f64,
            DailyMetric::AdvanceDays => record.advance_booking_days as f64,
        }
    }
}

fn by_day(records: &[ContractRecord], metric: DailyMetric) -> BTreeMap<NaiveDate, (usize, f64)> {
    let mut days: BTreeMap<NaiveDate, (usize, f64)> = BTreeMap::new();
    for r in records {
        let slot = days.entry(r.rental_start_date).or_insert((0, 0.0));
        slot.0 += 1;
        slot.1 += metric.value(r);
    }
    days
}

/// Contract count per observed start date, ascending. Days with no
/// contracts are absent, not zero.
pub fn daily_contract_counts(records: &[ContractRecord]) -> Vec<DailyPoint> {
    by_day(records, DailyMetric::Contracts)
        .into_iter()
        .map(|(date, (n, _))| DailyPoint::new(date, n as f64))
        .collect()
}

/// Mean of `metric` per observed start date, ascending.
/// `DailyMetric::Contracts` yields the daily count.
pub fn daily_mean(records: &[ContractRecord], metric: DailyMetric) -> Vec<DailyPoint> {
    if metric == DailyMetric::Contracts {
        return daily_contract_counts(records);
    }
    by_day(records, metric)
        .into_iter()
        .map(|(date, (n, sum))| DailyPoint::new(date, sum / n as f64))
        .collect()
}
