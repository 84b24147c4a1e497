//! Domain types for rental-contract analytics.

pub mod record;
pub mod series;

pub use record::{Category, ContractRecord, GroupKey, StoreId};
pub use series::{DailyPoint, DecompositionPoint, DecompositionResult, SmoothedPoint, SmoothedSeries};
