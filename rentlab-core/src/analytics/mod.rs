//! The three core computations over a filtered record set.
//!
//! - `aggregate`: grouped summary statistics with a Total row
//! - `rolling`: calendar-window rolling means
//! - `decompose`: multi-seasonal trend decomposition, built on `stl` and `loess`
//!
//! All functions are pure: inputs are borrowed, never mutated, and every call
//! keeps its working data local.

pub mod aggregate;
pub mod decompose;
pub mod labels;
pub mod loess;
pub mod rolling;
pub mod scatter;
pub mod stl;

pub use aggregate::{aggregate, aggregate_with, Reducer, RowLabel, SummaryRow, SummaryTable};
pub use decompose::{decompose, DailyGrid, Decomposer};
pub use labels::{Locale, SummaryColumn};
pub use rolling::{rolling_mean, smooth};
pub use scatter::{ScatterFit, ScatterPoint};
pub use stl::{stl, StlFit, StlParams};
