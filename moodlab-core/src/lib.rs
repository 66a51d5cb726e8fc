//! MoodLab Core — data layer for the market-mood trade analytics pipeline.
//!
//! This crate owns everything between a raw CSV source and the joined,
//! analysis-ready dataset:
//! - Table providers (HTTP and local CSV) behind a common trait
//! - An explicit, caller-owned source cache (memoized loads)
//! - Schema mapping (raw headers → canonical column names, fail-fast)
//! - Trade normalization (day-first timestamp parsing, numeric casts)
//! - Sentiment mapping (5-level classification → Fear/Neutral/Greed)
//! - The date inner-join and the Neutral cut
//! - Mood + size-range filtering
//!
//! Every stage is a pure function over immutable tabular values; the
//! analytical consumers live in `moodlab-analysis`.

pub mod data;
pub mod domain;
pub mod pipeline;

pub use data::cache::SourceCache;
pub use data::filter::{filter_trades, FilterError, FilteredView, SizeRange};
pub use data::join::{join_trades_sentiment, JoinedDataset};
pub use data::normalize::normalize_trades;
pub use data::provider::{AutoCsvProvider, DataError, HttpCsvProvider, LocalCsvProvider, TableProvider};
pub use data::schema::{SchemaError, SchemaMap};
pub use data::sentiment::map_sentiment;
pub use domain::{Classification, JoinedTrade, Mood, ParseMoodError, Sentiment};
pub use pipeline::load_and_join;
