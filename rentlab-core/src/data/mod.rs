//! Data layer: CSV ingestion, validation, caching, filtering and daily series.

pub mod cache;
pub mod daily;
pub mod filter;
pub mod loader;
pub mod schema;
pub mod store;
pub mod synthetic;

pub use cache::{SourceSignature, StoreCache};
pub use daily::{daily_contract_counts, daily_mean, DailyMetric};
pub use filter::FilterParams;
pub use loader::{load_csv, read_csv, write_csv, LoadError};
pub use schema::{DataFormatError, RawContractRow};
pub use store::{DateBounds, LoadReport, RecordStore};
pub use synthetic::{generate, write_synthetic, SyntheticSpec};
