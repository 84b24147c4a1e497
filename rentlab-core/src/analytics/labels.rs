//! Localized labels for tables and chart series.

use crate::domain::GroupKey;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locale {
    /// Brazilian Portuguese, the dashboard's native language.
    #[default]
    Pt,
    En,
}

/// Columns of a summary table, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryColumn {
    ContractCount,
    DailyRateMean,
    TotalValueMin,
    TotalValueMean,
    TotalValueMax,
    TotalValueSum,
    DurationMin,
    DurationMean,
    DurationMax,
    AdvanceMin,
    AdvanceMean,
    AdvanceMax,
}

impl SummaryColumn {
    pub const ALL: [SummaryColumn; 12] = [
        SummaryColumn::ContractCount,
        SummaryColumn::DailyRateMean,
        SummaryColumn::TotalValueMin,
        SummaryColumn::TotalValueMean,
        SummaryColumn::TotalValueMax,
        SummaryColumn::TotalValueSum,
        SummaryColumn::DurationMin,
        SummaryColumn::DurationMean,
        SummaryColumn::DurationMax,
        SummaryColumn::AdvanceMin,
        SummaryColumn::AdvanceMean,
        SummaryColumn::AdvanceMax,
    ];

    pub fn label(&self, locale: Locale) -> &'static str {
        match (self, locale) {
            (SummaryColumn::ContractCount, Locale::Pt) => "Quantidade de Contratos",
            (SummaryColumn::DailyRateMean, Locale::Pt) => "Diária Média",
            (SummaryColumn::TotalValueMin, Locale::Pt) => "Valor Total Mínimo",
            (SummaryColumn::TotalValueMean, Locale::Pt) => "Valor Total Médio",
            (SummaryColumn::TotalValueMax, Locale::Pt) => "Valor Total Máximo",
            (SummaryColumn::TotalValueSum, Locale::Pt) => "Montante Total",
            (SummaryColumn::DurationMin, Locale::Pt) => "Duração Mínima",
            (SummaryColumn::DurationMean, Locale::Pt) => "Duração Média",
            (SummaryColumn::DurationMax, Locale::Pt) => "Duração Máxima",
            (SummaryColumn::AdvanceMin, Locale::Pt) => "Antecedência Mínima",
            (SummaryColumn::AdvanceMean, Locale::Pt) => "Antecedência Média",
            (SummaryColumn::AdvanceMax, Locale::Pt) => "Antecedência Máxima",
            (SummaryColumn::ContractCount, Locale::En) => "Contract Count",
            (SummaryColumn::DailyRateMean, Locale::En) => "Mean Daily Rate",
            (SummaryColumn::TotalValueMin, Locale::En) => "Min Total Value",
            (SummaryColumn::TotalValueMean, Locale::En) => "Mean Total Value",
            (SummaryColumn::TotalValueMax, Locale::En) => "Max Total Value",
            (SummaryColumn::TotalValueSum, Locale::En) => "Total Amount",
            (SummaryColumn::DurationMin, Locale::En) => "Min Duration",
            (SummaryColumn::DurationMean, Locale::En) => "Mean Duration",
            (SummaryColumn::DurationMax, Locale::En) => "Max Duration",
            (SummaryColumn::AdvanceMin, Locale::En) => "Min Advance Days",
            (SummaryColumn::AdvanceMean, Locale::En) => "Mean Advance Days",
            (SummaryColumn::AdvanceMax, Locale::En) => "Max Advance Days",
        }
    }
}

/// Label of the synthetic Total row.
pub fn total_label(locale: Locale) -> &'static str {
    match locale {
        Locale::Pt => "Total Geral",
        Locale::En => "Grand Total",
    }
}

/// Header of the group column for a dimension.
pub fn dimension_label(key: GroupKey, locale: Locale) -> &'static str {
    match (key, locale) {
        (GroupKey::Store, Locale::Pt) => "Lojas",
        (GroupKey::VehicleCategory, Locale::Pt) => "Categoria de Veículo",
        (GroupKey::Store, Locale::En) => "Stores",
        (GroupKey::VehicleCategory, Locale::En) => "Vehicle Category",
    }
}

/// Series name for a smoothing window, e.g. "Suavização 7 dias".
pub fn window_label(window: u32, locale: Locale) -> String {
    match locale {
        Locale::Pt => format!("Suavização {window} dias"),
        Locale::En => format!("{window}-day smoothing"),
    }
}

/// Series name for a seasonal component.
pub fn seasonal_label(period: usize, locale: Locale) -> String {
    match locale {
        Locale::Pt => format!("Sazonalidade {period} dias"),
        Locale::En => format!("{period}-day seasonal"),
    }
}
