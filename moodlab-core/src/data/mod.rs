//! Data ingestion, normalization, and the join/filter pipeline stages.

pub mod cache;
pub mod filter;
pub mod join;
pub mod normalize;
pub mod provider;
pub mod schema;
pub mod sentiment;

pub use cache::SourceCache;
pub use filter::{filter_trades, FilteredView, SizeRange};
pub use join::{join_trades_sentiment, JoinedDataset};
pub use normalize::normalize_trades;
pub use provider::{DataError, TableProvider};
pub use schema::{SchemaError, SchemaMap};
pub use sentiment::map_sentiment;

use chrono::NaiveDate;
use polars::prelude::*;

/// Build a polars Date column from calendar days.
pub(crate) fn date_column(name: &str, dates: &[NaiveDate]) -> PolarsResult<Column> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
    let days: Vec<i32> = dates
        .iter()
        .map(|d| (*d - epoch).num_days() as i32)
        .collect();
    Column::new(name.into(), days).cast(&DataType::Date)
}
