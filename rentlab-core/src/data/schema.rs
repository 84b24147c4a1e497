//! CSV schema contract and per-row validation.
//!
//! Columns use the dataset's Portuguese names; English aliases are accepted.
//! Every check that fails produces a `DataFormatError` naming the 1-based
//! data row, so the loader can drop the row and keep going.

use crate::domain::{Category, ContractRecord};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// (canonical column, English alias) pairs in file order.
pub const COLUMNS: &[(&str, &str)] = &[
    ("id_contrato", "contract_id"),
    ("id_loja", "store_id"),
    ("categoria_veiculo", "vehicle_category"),
    ("data_inicio_locacao", "rental_start_date"),
    ("diaria_media", "average_daily_rate"),
    ("valor_total_locacao", "total_rental_value"),
    ("duracao_locacao", "rental_duration"),
    ("dias_antecedencia", "advance_booking_days"),
];

/// One CSV row before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawContractRow {
    #[serde(rename = "id_contrato", alias = "contract_id")]
    pub contract_id: String,
    #[serde(rename = "id_loja", alias = "store_id")]
    pub store_id: String,
    #[serde(rename = "categoria_veiculo", alias = "vehicle_category")]
    pub vehicle_category: String,
    #[serde(rename = "data_inicio_locacao", alias = "rental_start_date")]
    pub rental_start_date: String,
    #[serde(rename = "diaria_media", alias = "average_daily_rate")]
    pub average_daily_rate: String,
    #[serde(rename = "valor_total_locacao", alias = "total_rental_value")]
    pub total_rental_value: String,
    #[serde(rename = "duracao_locacao", alias = "rental_duration")]
    pub rental_duration: String,
    #[serde(rename = "dias_antecedencia", alias = "advance_booking_days")]
    pub advance_booking_days: String,
}

impl From<&ContractRecord> for RawContractRow {
    fn from(r: &ContractRecord) -> Self {
        Self {
            contract_id: r.contract_id.clone(),
            store_id: r.store_id.to_string(),
            vehicle_category: r.vehicle_category.clone(),
            rental_start_date: r.rental_start_date.format("%Y-%m-%d").to_string(),
            average_daily_rate: r.average_daily_rate.to_string(),
            total_rental_value: r.total_rental_value.to_string(),
            rental_duration: r.rental_duration.to_string(),
            advance_booking_days: r.advance_booking_days.to_string(),
        }
    }
}

/// A record rejected at the load boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataFormatError {
    #[error("row {row}: malformed CSV record: {message}")]
    Malformed { row: usize, message: String },

    #[error("row {row}: missing value in column '{column}'")]
    MissingValue { row: usize, column: &'static str },

    #[error("row {row}: unparsable date '{value}'")]
    InvalidDate { row: usize, value: String },

    #[error("row {row}: column '{column}' is not a number: '{value}'")]
    InvalidNumber {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("row {row}: column '{column}' must be a whole number, got {value}")]
    NotIntegral {
        row: usize,
        column: &'static str,
        value: f64,
    },

    #[error("row {row}: column '{column}' must be non-negative, got {value}")]
    Negative {
        row: usize,
        column: &'static str,
        value: f64,
    },

    #[error("row {row}: column '{column}' is out of range: {value}")]
    OutOfRange {
        row: usize,
        column: &'static str,
        value: f64,
    },

    #[error("row {row}: duplicate contract id '{contract_id}'")]
    DuplicateContractId { row: usize, contract_id: String },
}

impl DataFormatError {
    /// 1-based data row (header excluded).
    pub fn row(&self) -> usize {
        match self {
            DataFormatError::Malformed { row, .. }
            | DataFormatError::MissingValue { row, .. }
            | DataFormatError::InvalidDate { row, .. }
            | DataFormatError::InvalidNumber { row, .. }
            | DataFormatError::NotIntegral { row, .. }
            | DataFormatError::Negative { row, .. }
            | DataFormatError::OutOfRange { row, .. }
            | DataFormatError::DuplicateContractId { row, .. } => *row,
        }
    }
}

/// Parse a date cell, truncating any time-of-day.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
}

/// Parse a decimal cell. A lone comma is read as the decimal separator.
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let s = raw.trim();
    let normalized = if s.contains(',') && !s.contains('.') {
        s.replace(',', ".")
    } else {
        s.to_string()
    };
    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn required<'a>(row: usize, column: &'static str, value: &'a str) -> Result<&'a str, DataFormatError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(DataFormatError::MissingValue { row, column })
    } else {
        Ok(trimmed)
    }
}

fn decimal(row: usize, column: &'static str, value: &str) -> Result<f64, DataFormatError> {
    let v = required(row, column, value)?;
    parse_decimal(v).ok_or_else(|| DataFormatError::InvalidNumber {
        row,
        column,
        value: v.to_string(),
    })
}

fn non_negative(row: usize, column: &'static str, value: f64) -> Result<f64, DataFormatError> {
    if value < 0.0 {
        Err(DataFormatError::Negative { row, column, value })
    } else {
        Ok(value)
    }
}

fn integral(row: usize, column: &'static str, value: f64) -> Result<i64, DataFormatError> {
    if value.fract() != 0.0 {
        return Err(DataFormatError::NotIntegral { row, column, value });
    }
    // `i64::MAX as f64` rounds up to 2^63, which is itself out of range.
    if value < i64::MIN as f64 || value >= i64::MAX as f64 {
        return Err(DataFormatError::OutOfRange { row, column, value });
    }
    Ok(value as i64)
}

/// Validate one raw row into a `ContractRecord`.
pub fn parse_row(row: usize, raw: &RawContractRow) -> Result<ContractRecord, DataFormatError> {
    let contract_id = required(row, "id_contrato", &raw.contract_id)?.to_string();
    let store_id = Category::parse(required(row, "id_loja", &raw.store_id)?);
    let vehicle_category = required(row, "categoria_veiculo", &raw.vehicle_category)?.to_string();

    let date_raw = required(row, "data_inicio_locacao", &raw.rental_start_date)?;
    let rental_start_date = parse_date(date_raw).ok_or_else(|| DataFormatError::InvalidDate {
        row,
        value: date_raw.to_string(),
    })?;

    let average_daily_rate = non_negative(
        row,
        "diaria_media",
        decimal(row, "diaria_media", &raw.average_daily_rate)?,
    )?;
    let total_rental_value = non_negative(
        row,
        "valor_total_locacao",
        decimal(row, "valor_total_locacao", &raw.total_rental_value)?,
    )?;
    let duration = non_negative(
        row,
        "duracao_locacao",
        decimal(row, "duracao_locacao", &raw.rental_duration)?,
    )?;
    let rental_duration = u32::try_from(integral(row, "duracao_locacao", duration)?).map_err(|_| {
        DataFormatError::OutOfRange {
            row,
            column: "duracao_locacao",
            value: duration,
        }
    })?;
    let advance_booking_days = integral(
        row,
        "dias_antecedencia",
        decimal(row, "dias_antecedencia", &raw.advance_booking_days)?,
    )?;

    Ok(ContractRecord {
        contract_id,
        store_id,
        vehicle_category,
        rental_start_date,
        average_daily_rate,
        total_rental_value,
        rental_duration,
        advance_booking_days,
    })
}

/// Field-level checks for a record built in memory.
pub fn validate_record(row: usize, record: &ContractRecord) -> Result<(), DataFormatError> {
    if record.contract_id.trim().is_empty() {
        return Err(DataFormatError::MissingValue {
            row,
            column: "id_contrato",
        });
    }
    non_negative(row, "diaria_media", record.average_daily_rate)?;
    non_negative(row, "valor_total_locacao", record.total_rental_value)?;
    if !record.average_daily_rate.is_finite() || !record.total_rental_value.is_finite() {
        return Err(DataFormatError::InvalidNumber {
            row,
            column: "valor_total_locacao",
            value: format!("{}", record.total_rental_value),
        });
    }
    Ok(())
}
