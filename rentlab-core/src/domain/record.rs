//! ContractRecord: one rental contract as loaded from the dataset.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A categorical key value.
///
/// Store ids arrive as either integers or free text depending on the export.
/// Integer ids sort numerically and ahead of text ids, so store `9` precedes
/// store `10`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Category {
    Int(i64),
    Text(String),
}

impl Category {
    /// Parse a raw cell: canonical integer text becomes `Int`, anything else
    /// `Text`. Ids such as `007` or `+7` stay text so they keep their spelling
    /// and never merge with `7`.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<i64>() {
            Ok(v) if v.to_string() == trimmed => Category::Int(v),
            _ => Category::Text(trimmed.to_string()),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Int(v) => write!(f, "{v}"),
            Category::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Category {
    fn from(raw: &str) -> Self {
        Category::parse(raw)
    }
}

impl From<i64> for Category {
    fn from(v: i64) -> Self {
        Category::Int(v)
    }
}

/// Store identifier alias.
pub type StoreId = Category;

/// A single rental contract.
///
/// Values are validated at the loader boundary: rates, values and durations are
/// non-negative. `advance_booking_days` may be negative and is kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractRecord {
    pub contract_id: String,
    pub store_id: StoreId,
    pub vehicle_category: String,
    pub rental_start_date: NaiveDate,
    pub average_daily_rate: f64,
    pub total_rental_value: f64,
    pub rental_duration: u32,
    pub advance_booking_days: i64,
}

/// The categorical dimension used to partition records for a summary table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
    Store,
    VehicleCategory,
}

impl GroupKey {
    /// Extract this dimension's value from a record.
    pub fn key_of(&self, record: &ContractRecord) -> Category {
        match self {
            GroupKey::Store => record.store_id.clone(),
            GroupKey::VehicleCategory => Category::Text(record.vehicle_category.clone()),
        }
    }
}
