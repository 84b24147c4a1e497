//! Rentlab core: analytics over vehicle rental contracts.
//!
//! - Data layer: CSV ingestion with per-row validation, memoized loading,
//!   filtering and per-day series
//! - Grouped summaries with a Total row
//! - Calendar-window rolling smoothing
//! - Multi-seasonal trend decomposition
//! - The dashboard pass tying them together

pub mod analytics;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod domain;
pub mod error;

pub use config::{AnalyticsConfig, TotalMeanPolicy};
pub use dashboard::{Dashboard, DashboardReport, MetricOutcome};
pub use error::AnalyticsError;
