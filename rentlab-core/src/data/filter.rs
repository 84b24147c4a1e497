//! Record filtering by store, vehicle category and start-date range.

use crate::domain::{Category, ContractRecord};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Selection applied before any analytics.
///
/// Empty `stores` / `categories` select everything. The date range is
/// inclusive and only applies when both `start` and `end` are set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterParams {
    pub stores: BTreeSet<Category>,
    pub categories: BTreeSet<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl FilterParams {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_stores(mut self, stores: impl IntoIterator<Item = Category>) -> Self {
        self.stores.extend(stores);
        self
    }

    pub fn with_categories<S: Into<String>>(mut self, categories: impl IntoIterator<Item = S>) -> Self {
        self.categories.extend(categories.into_iter().map(Into::into));
        self
    }

    pub fn with_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    /// Active date range, if both endpoints are present.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.start.zip(self.end)
    }

    pub fn matches(&self, record: &ContractRecord) -> bool {
        if !self.stores.is_empty() && !self.stores.contains(&record.store_id) {
            return false;
        }
        if !self.categories.is_empty() && !self.categories.contains(&record.vehicle_category) {
            return false;
        }
        match self.date_range() {
            Some((start, end)) => {
                record.rental_start_date >= start && record.rental_start_date <= end
            }
            None => true,
        }
    }

    /// Matching records, copied in input order.
    pub fn apply(&self, records: &[ContractRecord]) -> Vec<ContractRecord> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 3, day).unwrap()
    }

    fn record(id: &str, store: i64, category: &str, day: u32) -> ContractRecord {
        ContractRecord {
            contract_id: id.into(),
            store_id: Category::Int(store),
            vehicle_category: category.into(),
            rental_start_date: d(day),
            average_daily_rate: 100.0,
            total_rental_value: 200.0,
            rental_duration: 2,
            advance_booking_days: 1,
        }
    }

    fn sample() -> Vec<ContractRecord> {
        vec![
            record("a", 1, "SUV", 1),
            record("b", 2, "Hatch", 5),
            record("c", 1, "Hatch", 10),
            record("d", 3, "SUV", 20),
        ]
    }

    fn ids(records: &[ContractRecord]) -> Vec<&str> {
        records.iter().map(|r| r.contract_id.as_str()).collect()
    }

    #[test]
    fn empty_filter_selects_all() {
        assert_eq!(FilterParams::all().apply(&sample()).len(), 4);
    }

    #[test]
    fn store_and_category_intersect() {
        let f = FilterParams::all()
            .with_stores([Category::Int(1)])
            .with_categories(["Hatch"]);
        assert_eq!(ids(&f.apply(&sample())), vec!["c"]);
    }

    #[test]
    fn date_range_is_inclusive() {
        let f = FilterParams::all().with_range(d(5), d(10));
        assert_eq!(ids(&f.apply(&sample())), vec!["b", "c"]);
    }

    #[test]
    fn half_open_range_is_ignored() {
        let f = FilterParams {
            start: Some(d(15)),
            ..FilterParams::default()
        };
        assert_eq!(f.apply(&sample()).len(), 4);
    }

    #[test]
    fn unknown_store_selects_nothing() {
        let f = FilterParams::all().with_stores([Category::Int(99)]);
        assert!(f.apply(&sample()).is_empty());
    }

    #[test]
    fn input_is_untouched() {
        let records = sample();
        let _ = FilterParams::all().with_stores([Category::Int(2)]).apply(&records);
        assert_eq!(records.len(), 4);
    }
}
