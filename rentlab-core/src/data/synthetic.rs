//! Deterministic synthetic contract data for demos, tests and benchmarks.
//!
//! Daily volume carries a weekly and an annual cycle on a slow upward trend,
//! so the decomposition has something to find. The same spec always yields
//! the same records.

use super::loader::{write_csv, LoadError};
use crate::domain::{Category, ContractRecord};
use chrono::{Datelike, Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticSpec {
    pub start: NaiveDate,
    pub days: u32,
    pub stores: u32,
    pub categories: Vec<String>,
    /// Mean contracts per day across all stores, before seasonality.
    pub base_volume: f64,
    pub seed: u64,
}

impl Default for SyntheticSpec {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap_or(NaiveDate::MIN),
            days: 900,
            stores: 5,
            categories: ["Econômico", "Intermediário", "SUV", "Executivo"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            base_volume: 20.0,
            seed: 42,
        }
    }
}

fn category_rate(index: usize) -> f64 {
    90.0 + 45.0 * index as f64
}

/// Generate contracts for `spec`.
pub fn generate(spec: &SyntheticSpec) -> Vec<ContractRecord> {
    let seed_bytes = blake3::hash(&spec.seed.to_le_bytes());
    let mut rng = StdRng::from_seed(*seed_bytes.as_bytes());

    let stores = spec.stores.max(1) as i64;
    let fallback = ["Padrão".to_string()];
    let categories: &[String] = if spec.categories.is_empty() {
        &fallback
    } else {
        &spec.categories
    };

    let mut records = Vec::new();
    let mut next_id: u64 = 1;

    for offset in 0..spec.days {
        let date = spec.start + Duration::days(offset as i64);
        let annual = (2.0 * PI * date.ordinal0() as f64 / 365.0).sin();
        let weekly = match date.weekday().num_days_from_monday() {
            4 | 5 => 0.25,
            6 => -0.2,
            _ => 0.0,
        };
        let trend = 1.0 + 0.2 * offset as f64 / 365.0;
        let expected = (spec.base_volume * trend * (1.0 + 0.3 * annual + weekly)).max(0.0);
        let count = (expected + rng.gen_range(-0.5..0.5) * expected.sqrt()).round().max(0.0) as usize;

        for _ in 0..count {
            let cat_index = rng.gen_range(0..categories.len());
            let vehicle_category = categories[cat_index].clone();
            let rate = category_rate(cat_index) * (1.0 + 0.1 * annual) * rng.gen_range(0.9..1.1);
            let average_daily_rate = (rate * 100.0).round() / 100.0;
            let rental_duration: u32 = rng.gen_range(1..=14);

            records.push(ContractRecord {
                contract_id: format!("C{next_id:07}"),
                store_id: Category::Int(rng.gen_range(1..=stores)),
                vehicle_category,
                rental_start_date: date,
                average_daily_rate,
                total_rental_value: (average_daily_rate * rental_duration as f64 * 100.0).round()
                    / 100.0,
                rental_duration,
                advance_booking_days: rng.gen_range(0..60),
            });
            next_id += 1;
        }
    }
    records
}

/// Generate and write a CSV file with the canonical header.
pub fn write_synthetic(path: impl AsRef<Path>, spec: &SyntheticSpec) -> Result<usize, LoadError> {
    let path = path.as_ref();
    let records = generate(spec);
    let file = File::create(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write_csv(BufWriter::new(file), &records)?;
    Ok(records.len())
}
