//! Aggregation engine: grouped summary statistics plus a Total row.
//!
//! Each column is produced by an explicit reducer over one record field
//! (`SummaryColumn::reducer` / `SummaryColumn::field`), so the grouping
//! semantics do not depend on any tabular library's defaults.
//!
//! Mean-valued columns are rounded half away from zero. Counts, minima, maxima
//! and sums keep native precision. The Total row folds the group rows with
//! a per-reducer rule: counts and sums add, minima take the min, maxima take
//! the max, and means take the unweighted mean of the group means (or the
//! record-weighted mean under `TotalMeanPolicy::RecordWeighted`).

use super::labels::{dimension_label, total_label, Locale, SummaryColumn};
use crate::config::TotalMeanPolicy;
use crate::domain::{Category, ContractRecord, GroupKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Reduction applied to a field within one group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reducer {
    Count,
    Sum,
    Min,
    Max,
    Mean,
}

/// Numeric record field feeding a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    ContractId,
    AverageDailyRate,
    TotalRentalValue,
    RentalDuration,
    AdvanceBookingDays,
}

impl Field {
    /// Slot of this field in `GroupStats::FIELDS`.
    fn index(&self) -> usize {
        match self {
            Field::ContractId => 0,
            Field::AverageDailyRate => 1,
            Field::TotalRentalValue => 2,
            Field::RentalDuration => 3,
            Field::AdvanceBookingDays => 4,
        }
    }

    fn value(&self, record: &ContractRecord) -> f64 {
        match self {
            Field::ContractId => 1.0,
            Field::AverageDailyRate => record.average_daily_rate,
            Field::TotalRentalValue => record.total_rental_value,
            Field::RentalDuration => record.rental_duration as f64,
            Field::AdvanceBookingDays => record.advance_booking_days as f64,
        }
    }
}

impl SummaryColumn {
    pub fn field(&self) -> Field {
        match self {
            SummaryColumn::ContractCount => Field::ContractId,
            SummaryColumn::DailyRateMean => Field::AverageDailyRate,
            SummaryColumn::TotalValueMin
            | SummaryColumn::TotalValueMean
            | SummaryColumn::TotalValueMax
            | SummaryColumn::TotalValueSum => Field::TotalRentalValue,
            SummaryColumn::DurationMin | SummaryColumn::DurationMean | SummaryColumn::DurationMax => {
                Field::RentalDuration
            }
            SummaryColumn::AdvanceMin | SummaryColumn::AdvanceMean | SummaryColumn::AdvanceMax => {
                Field::AdvanceBookingDays
            }
        }
    }

    pub fn reducer(&self) -> Reducer {
        match self {
            SummaryColumn::ContractCount => Reducer::Count,
            SummaryColumn::TotalValueSum => Reducer::Sum,
            SummaryColumn::TotalValueMin | SummaryColumn::DurationMin | SummaryColumn::AdvanceMin => {
                Reducer::Min
            }
            SummaryColumn::TotalValueMax | SummaryColumn::DurationMax | SummaryColumn::AdvanceMax => {
                Reducer::Max
            }
            SummaryColumn::DailyRateMean
            | SummaryColumn::TotalValueMean
            | SummaryColumn::DurationMean
            | SummaryColumn::AdvanceMean => Reducer::Mean,
        }
    }
}

/// Running count/sum/min/max of one field.
#[derive(Debug, Clone, Copy)]
struct FieldStats {
    n: usize,
    sum: f64,
    min: f64,
    max: f64,
}

impl FieldStats {
    fn new() -> Self {
        Self {
            n: 0,
            sum: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    fn push(&mut self, v: f64) {
        self.n += 1;
        self.sum += v;
        self.min = self.min.min(v);
        self.max = self.max.max(v);
    }

    fn merge(&mut self, other: &FieldStats) {
        self.n += other.n;
        self.sum += other.sum;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    fn reduce(&self, reducer: Reducer) -> f64 {
        match reducer {
            Reducer::Count => self.n as f64,
            Reducer::Sum => self.sum,
            Reducer::Min => self.min,
            Reducer::Max => self.max,
            Reducer::Mean => self.sum / self.n as f64,
        }
    }
}

/// Per-field statistics of one group.
#[derive(Debug, Clone)]
struct GroupStats {
    fields: [FieldStats; 5],
}

impl GroupStats {
    const FIELDS: [Field; 5] = [
        Field::ContractId,
        Field::AverageDailyRate,
        Field::TotalRentalValue,
        Field::RentalDuration,
        Field::AdvanceBookingDays,
    ];

    fn new() -> Self {
        Self {
            fields: [FieldStats::new(); 5],
        }
    }

    fn push(&mut self, record: &ContractRecord) {
        for (stats, field) in self.fields.iter_mut().zip(Self::FIELDS) {
            stats.push(field.value(record));
        }
    }

    fn merge(&mut self, other: &GroupStats) {
        for (a, b) in self.fields.iter_mut().zip(other.fields.iter()) {
            a.merge(b);
        }
    }

    fn column(&self, column: SummaryColumn) -> f64 {
        let value = self.fields[column.field().index()].reduce(column.reducer());
        if column.reducer() == Reducer::Mean {
            value.round()
        } else {
            value
        }
    }
}

/// Row identity: a group value or the synthetic Total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowLabel {
    Group(Category),
    Total,
}

impl RowLabel {
    pub fn display(&self, locale: Locale) -> String {
        match self {
            RowLabel::Group(c) => c.to_string(),
            RowLabel::Total => total_label(locale).to_string(),
        }
    }
}

/// One summary row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub label: RowLabel,
    pub contract_count: usize,
    pub daily_rate_mean: f64,
    pub total_value_min: f64,
    pub total_value_mean: f64,
    pub total_value_max: f64,
    pub total_value_sum: f64,
    pub duration_min: u32,
    pub duration_mean: f64,
    pub duration_max: u32,
    pub advance_min: i64,
    pub advance_mean: f64,
    pub advance_max: i64,
}

impl SummaryRow {
    pub fn is_total(&self) -> bool {
        self.label == RowLabel::Total
    }

    /// Column value as f64 (lossless for every column).
    pub fn value(&self, column: SummaryColumn) -> f64 {
        match column {
            SummaryColumn::ContractCount => self.contract_count as f64,
            SummaryColumn::DailyRateMean => self.daily_rate_mean,
            SummaryColumn::TotalValueMin => self.total_value_min,
            SummaryColumn::TotalValueMean => self.total_value_mean,
            SummaryColumn::TotalValueMax => self.total_value_max,
            SummaryColumn::TotalValueSum => self.total_value_sum,
            SummaryColumn::DurationMin => self.duration_min as f64,
            SummaryColumn::DurationMean => self.duration_mean,
            SummaryColumn::DurationMax => self.duration_max as f64,
            SummaryColumn::AdvanceMin => self.advance_min as f64,
            SummaryColumn::AdvanceMean => self.advance_mean,
            SummaryColumn::AdvanceMax => self.advance_max as f64,
        }
    }

    fn from_columns(label: RowLabel, column: impl Fn(SummaryColumn) -> f64) -> Self {
        Self {
            label,
            contract_count: column(SummaryColumn::ContractCount) as usize,
            daily_rate_mean: column(SummaryColumn::DailyRateMean),
            total_value_min: column(SummaryColumn::TotalValueMin),
            total_value_mean: column(SummaryColumn::TotalValueMean),
            total_value_max: column(SummaryColumn::TotalValueMax),
            total_value_sum: column(SummaryColumn::TotalValueSum),
            duration_min: column(SummaryColumn::DurationMin) as u32,
            duration_mean: column(SummaryColumn::DurationMean),
            duration_max: column(SummaryColumn::DurationMax) as u32,
            advance_min: column(SummaryColumn::AdvanceMin) as i64,
            advance_mean: column(SummaryColumn::AdvanceMean),
            advance_max: column(SummaryColumn::AdvanceMax) as i64,
        }
    }
}

/// Group rows in sorted key order followed by one Total row.
///
/// Empty input yields an empty vector with no Total row.
pub fn aggregate(records: &[ContractRecord], key: GroupKey) -> Vec<SummaryRow> {
    aggregate_with(records, key, TotalMeanPolicy::GroupMeans)
}

/// `aggregate` with an explicit Total-row mean policy.
pub fn aggregate_with(
    records: &[ContractRecord],
    key: GroupKey,
    policy: TotalMeanPolicy,
) -> Vec<SummaryRow> {
    if records.is_empty() {
        log::debug!("aggregate({key:?}): empty input");
        return Vec::new();
    }

    let mut groups: BTreeMap<Category, GroupStats> = BTreeMap::new();
    for record in records {
        groups
            .entry(key.key_of(record))
            .or_insert_with(GroupStats::new)
            .push(record);
    }

    let mut rows: Vec<SummaryRow> = groups
        .iter()
        .map(|(k, stats)| SummaryRow::from_columns(RowLabel::Group(k.clone()), |c| stats.column(c)))
        .collect();

    let mut merged = GroupStats::new();
    for stats in groups.values() {
        merged.merge(stats);
    }
    let total = total_row(&rows, &merged, policy);
    rows.push(total);

    log::debug!(
        "aggregate({key:?}): {} records into {} groups",
        records.len(),
        groups.len()
    );
    rows
}

fn total_row(groups: &[SummaryRow], merged: &GroupStats, policy: TotalMeanPolicy) -> SummaryRow {
    SummaryRow::from_columns(RowLabel::Total, |column| {
        let values = groups.iter().map(|r| r.value(column));
        match column.reducer() {
            Reducer::Count | Reducer::Sum => values.sum(),
            Reducer::Min => values.fold(f64::INFINITY, f64::min),
            Reducer::Max => values.fold(f64::NEG_INFINITY, f64::max),
            Reducer::Mean => match policy {
                TotalMeanPolicy::GroupMeans => {
                    (values.sum::<f64>() / groups.len() as f64).round()
                }
                TotalMeanPolicy::RecordWeighted => merged.column(column),
            },
        }
    })
}

/// A summary table for one grouping dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryTable {
    pub dimension: GroupKey,
    pub rows: Vec<SummaryRow>,
}

impl SummaryTable {
    pub fn build(records: &[ContractRecord], dimension: GroupKey, policy: TotalMeanPolicy) -> Self {
        Self {
            dimension,
            rows: aggregate_with(records, dimension, policy),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn groups(&self) -> &[SummaryRow] {
        match self.rows.last() {
            Some(last) if last.is_total() => &self.rows[..self.rows.len() - 1],
            _ => &self.rows,
        }
    }

    pub fn total(&self) -> Option<&SummaryRow> {
        self.rows.last().filter(|r| r.is_total())
    }

    /// The same table with the Total row dropped, for scatter plotting.
    pub fn without_total(&self) -> SummaryTable {
        SummaryTable {
            dimension: self.dimension,
            rows: self.groups().to_vec(),
        }
    }

    /// Column headers, group column first.
    pub fn headers(&self, locale: Locale) -> Vec<String> {
        std::iter::once(dimension_label(self.dimension, locale).to_string())
            .chain(SummaryColumn::ALL.iter().map(|c| c.label(locale).to_string()))
            .collect()
    }

    /// Render as an aligned plain-text table.
    pub fn to_text(&self, locale: Locale) -> String {
        let headers = self.headers(locale);
        let body: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| {
                std::iter::once(row.label.display(locale))
                    .chain(SummaryColumn::ALL.iter().map(|c| format_cell(row.value(*c))))
                    .collect()
            })
            .collect();

        let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
        for cells in &body {
            for (w, cell) in widths.iter_mut().zip(cells) {
                *w = (*w).max(cell.chars().count());
            }
        }

        let mut out = String::new();
        let render = |out: &mut String, cells: &[String]| {
            let line: Vec<String> = cells
                .iter()
                .zip(&widths)
                .enumerate()
                .map(|(i, (cell, w))| {
                    let pad = w.saturating_sub(cell.chars().count());
                    if i == 0 {
                        format!("{cell}{}", " ".repeat(pad))
                    } else {
                        format!("{}{cell}", " ".repeat(pad))
                    }
                })
                .collect();
            let _ = writeln!(out, "{}", line.join("  "));
        };
        render(&mut out, headers.as_slice());
        for cells in &body {
            render(&mut out, cells.as_slice());
        }
        out
    }
}

fn format_cell(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(id: &str, store: i64, category: &str, total: f64) -> ContractRecord {
        ContractRecord {
            contract_id: id.into(),
            store_id: Category::Int(store),
            vehicle_category: category.into(),
            rental_start_date: NaiveDate::from_ymd_opt(2023, 5, 1).unwrap(),
            average_daily_rate: total / 4.0,
            total_rental_value: total,
            rental_duration: 4,
            advance_booking_days: 7,
        }
    }

    #[test]
    fn field_slots_match_stats_layout() {
        for (i, field) in GroupStats::FIELDS.iter().enumerate() {
            assert_eq!(field.index(), i);
        }
        for column in SummaryColumn::ALL {
            assert_eq!(GroupStats::FIELDS[column.field().index()], column.field());
        }
    }

    #[test]
    fn single_group_scenario() {
        let records = vec![
            record("a", 1, "SUV", 100.0),
            record("b", 1, "SUV", 200.0),
            record("c", 1, "SUV", 300.0),
        ];
        let rows = aggregate(&records, GroupKey::Store);
        assert_eq!(rows.len(), 2);

        let group = &rows[0];
        assert_eq!(group.label, RowLabel::Group(Category::Int(1)));
        assert_eq!(group.contract_count, 3);
        assert_eq!(group.total_value_sum, 600.0);
        assert_eq!(group.total_value_mean, 200.0);
        assert_eq!(group.total_value_min, 100.0);
        assert_eq!(group.total_value_max, 300.0);

        let total = &rows[1];
        assert!(total.is_total());
        assert_eq!(total.contract_count, 3);
        assert_eq!(total.total_value_sum, 600.0);
        assert_eq!(total.total_value_min, 100.0);
        assert_eq!(total.total_value_max, 300.0);
    }

    #[test]
    fn groups_are_sorted_by_key() {
        let records = vec![
            record("a", 10, "SUV", 100.0),
            record("b", 2, "Hatch", 100.0),
            record("c", 9, "Sedan", 100.0),
        ];
        let rows = aggregate(&records, GroupKey::Store);
        let labels: Vec<_> = rows.iter().map(|r| r.label.clone()).collect();
        assert_eq!(
            labels,
            vec![
                RowLabel::Group(Category::Int(2)),
                RowLabel::Group(Category::Int(9)),
                RowLabel::Group(Category::Int(10)),
                RowLabel::Total,
            ]
        );

        let by_category = aggregate(&records, GroupKey::VehicleCategory);
        assert_eq!(by_category[0].label, RowLabel::Group(Category::Text("Hatch".into())));
        assert_eq!(by_category[2].label, RowLabel::Group(Category::Text("SUV".into())));
    }

    #[test]
    fn total_mean_is_unweighted_mean_of_group_means() {
        // Store 1: one contract of 100. Store 2: three contracts of 400.
        let records = vec![
            record("a", 1, "SUV", 100.0),
            record("b", 2, "SUV", 400.0),
            record("c", 2, "SUV", 400.0),
            record("d", 2, "SUV", 400.0),
        ];
        let rows = aggregate(&records, GroupKey::Store);
        let total = rows.last().unwrap();
        // (100 + 400) / 2, not (100 + 3*400) / 4
        assert_eq!(total.total_value_mean, 250.0);

        let weighted = aggregate_with(&records, GroupKey::Store, TotalMeanPolicy::RecordWeighted);
        assert_eq!(weighted.last().unwrap().total_value_mean, 325.0);
        // Only mean fields change with the policy.
        assert_eq!(weighted.last().unwrap().total_value_sum, 1300.0);
    }

    #[test]
    fn means_round_half_away_from_zero() {
        let mut a = record("a", 1, "SUV", 100.0);
        let mut b = record("b", 1, "SUV", 101.0);
        a.advance_booking_days = -2;
        b.advance_booking_days = -1;
        let rows = aggregate(&[a, b], GroupKey::Store);
        assert_eq!(rows[0].total_value_mean, 101.0); // 100.5
        assert_eq!(rows[0].advance_mean, -2.0); // -1.5
        assert_eq!(rows[0].advance_min, -2);
        assert_eq!(rows[0].advance_max, -1);
    }

    #[test]
    fn min_and_max_keep_native_precision() {
        let records = vec![record("a", 1, "SUV", 100.25), record("b", 1, "SUV", 99.75)];
        let rows = aggregate(&records, GroupKey::Store);
        assert_eq!(rows[0].total_value_min, 99.75);
        assert_eq!(rows[0].total_value_max, 100.25);
        assert_eq!(rows[0].total_value_sum, 200.0);
    }

    #[test]
    fn empty_input_has_no_total_row() {
        assert!(aggregate(&[], GroupKey::Store).is_empty());
        let table = SummaryTable::build(&[], GroupKey::Store, TotalMeanPolicy::GroupMeans);
        assert!(table.is_empty());
        assert!(table.total().is_none());
    }

    #[test]
    fn without_total_drops_only_the_total() {
        let records = vec![record("a", 1, "SUV", 100.0), record("b", 2, "SUV", 300.0)];
        let table = SummaryTable::build(&records, GroupKey::Store, TotalMeanPolicy::GroupMeans);
        assert_eq!(table.rows.len(), 3);
        let scatter = table.without_total();
        assert_eq!(scatter.rows.len(), 2);
        assert!(scatter.rows.iter().all(|r| !r.is_total()));
        assert!(scatter.total().is_none());
    }

    #[test]
    fn text_rendering_includes_localized_headers() {
        let records = vec![record("a", 1, "SUV", 100.0)];
        let table = SummaryTable::build(&records, GroupKey::Store, TotalMeanPolicy::GroupMeans);
        let text = table.to_text(Locale::Pt);
        assert!(text.starts_with("Lojas"));
        assert!(text.contains("Montante Total"));
        assert!(text.contains("Total Geral"));
        assert_eq!(text.lines().count(), 3);
    }
}
