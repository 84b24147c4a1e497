//! Immutable, shareable record store.

use super::schema::{validate_record, DataFormatError};
use crate::domain::{Category, ContractRecord};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

/// Validated contract records plus a content fingerprint.
///
/// Cloning is cheap: the records live behind an `Arc`.
#[derive(Debug, Clone)]
pub struct RecordStore {
    records: Arc<[ContractRecord]>,
    dataset_hash: String,
}

/// Outcome of loading: the accepted records and every rejected row.
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub store: RecordStore,
    pub rejected: Vec<DataFormatError>,
}

impl LoadReport {
    pub fn accepted(&self) -> usize {
        self.store.len()
    }
}

/// Date span covered by a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateBounds {
    pub first: NaiveDate,
    pub last: NaiveDate,
}

impl RecordStore {
    /// Validate in-memory records. Rows are numbered from 1 in input order;
    /// later duplicates of a contract id are rejected.
    pub fn from_records(records: Vec<ContractRecord>) -> LoadReport {
        Self::from_numbered(records.into_iter().enumerate().map(|(i, r)| (i + 1, r)))
    }

    /// Build from records already tagged with their source row number.
    pub(crate) fn from_numbered(
        records: impl IntoIterator<Item = (usize, ContractRecord)>,
    ) -> LoadReport {
        let mut seen: HashSet<String> = HashSet::new();
        let mut accepted = Vec::new();
        let mut rejected = Vec::new();

        for (row, record) in records {
            if let Err(e) = validate_record(row, &record) {
                rejected.push(e);
                continue;
            }
            if !seen.insert(record.contract_id.clone()) {
                rejected.push(DataFormatError::DuplicateContractId {
                    row,
                    contract_id: record.contract_id,
                });
                continue;
            }
            accepted.push(record);
        }

        LoadReport {
            store: Self::new_unchecked(accepted),
            rejected,
        }
    }

    fn new_unchecked(records: Vec<ContractRecord>) -> Self {
        let dataset_hash = compute_dataset_hash(&records);
        Self {
            records: records.into(),
            dataset_hash,
        }
    }

    pub fn records(&self) -> &[ContractRecord] {
        &self.records
    }

    pub fn shared(&self) -> Arc<[ContractRecord]> {
        Arc::clone(&self.records)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// BLAKE3 fingerprint over all records in load order.
    pub fn dataset_hash(&self) -> &str {
        &self.dataset_hash
    }

    /// Distinct store ids, sorted.
    pub fn stores(&self) -> Vec<Category> {
        self.records
            .iter()
            .map(|r| r.store_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct vehicle categories, sorted.
    pub fn categories(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|r| r.vehicle_category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn date_bounds(&self) -> Option<DateBounds> {
        let first = self.records.iter().map(|r| r.rental_start_date).min()?;
        let last = self.records.iter().map(|r| r.rental_start_date).max()?;
        Some(DateBounds { first, last })
    }
}

fn compute_dataset_hash(records: &[ContractRecord]) -> String {
    let mut hasher = blake3::Hasher::new();
    for r in records {
        hasher.update(r.contract_id.as_bytes());
        hasher.update(r.store_id.to_string().as_bytes());
        hasher.update(r.vehicle_category.as_bytes());
        hasher.update(r.rental_start_date.to_string().as_bytes());
        hasher.update(&r.average_daily_rate.to_le_bytes());
        hasher.update(&r.total_rental_value.to_le_bytes());
        hasher.update(&r.rental_duration.to_le_bytes());
        hasher.update(&r.advance_booking_days.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, store: i64, category: &str, day: u32) -> ContractRecord {
        ContractRecord {
            contract_id: id.into(),
            store_id: Category::Int(store),
            vehicle_category: category.into(),
            rental_start_date: NaiveDate::from_ymd_opt(2023, 1, day).unwrap(),
            average_daily_rate: 100.0,
            total_rental_value: 300.0,
            rental_duration: 3,
            advance_booking_days: 5,
        }
    }

    #[test]
    fn duplicate_ids_are_rejected_after_first() {
        let report = RecordStore::from_records(vec![
            record("a", 1, "SUV", 1),
            record("b", 2, "SUV", 2),
            record("a", 3, "Hatch", 3),
        ]);
        assert_eq!(report.accepted(), 2);
        assert_eq!(
            report.rejected,
            vec![DataFormatError::DuplicateContractId {
                row: 3,
                contract_id: "a".into()
            }]
        );
    }

    #[test]
    fn negative_value_is_rejected() {
        let mut bad = record("x", 1, "SUV", 1);
        bad.total_rental_value = -5.0;
        let report = RecordStore::from_records(vec![bad, record("y", 1, "SUV", 2)]);
        assert_eq!(report.accepted(), 1);
        assert_eq!(report.rejected[0].row(), 1);
    }

    #[test]
    fn distinct_values_and_bounds() {
        let report = RecordStore::from_records(vec![
            record("a", 10, "SUV", 9),
            record("b", 2, "Hatch", 3),
            record("c", 10, "SUV", 5),
        ]);
        let store = report.store;
        assert_eq!(store.stores(), vec![Category::Int(2), Category::Int(10)]);
        assert_eq!(store.categories(), vec!["Hatch".to_string(), "SUV".to_string()]);
        let bounds = store.date_bounds().unwrap();
        assert_eq!(bounds.first.to_string(), "2023-01-03");
        assert_eq!(bounds.last.to_string(), "2023-01-09");
    }

    #[test]
    fn hash_is_deterministic_and_content_sensitive() {
        let a = RecordStore::from_records(vec![record("a", 1, "SUV", 1)]).store;
        let b = RecordStore::from_records(vec![record("a", 1, "SUV", 1)]).store;
        let c = RecordStore::from_records(vec![record("a", 1, "SUV", 2)]).store;
        assert_eq!(a.dataset_hash(), b.dataset_hash());
        assert_ne!(a.dataset_hash(), c.dataset_hash());
        assert_eq!(a.dataset_hash().len(), 64);
    }

    #[test]
    fn empty_store_has_no_bounds() {
        let store = RecordStore::from_records(Vec::new()).store;
        assert!(store.is_empty());
        assert!(store.date_bounds().is_none());
    }
}
