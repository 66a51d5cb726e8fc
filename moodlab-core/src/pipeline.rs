//! The load pipeline: fetch → normalize → map → join.

use crate::data::cache::SourceCache;
use crate::data::join::{join_trades_sentiment, JoinedDataset};
use crate::data::normalize::normalize_trades;
use crate::data::provider::{DataError, TableProvider};
use crate::data::sentiment::map_sentiment;

/// Load both sources (through the cache), normalize, map, and join.
///
/// This is the entry point the dashboard consumer calls on every data load.
/// Parse and category errors abort here; nothing partial reaches the
/// analytical consumers.
pub fn load_and_join(
    provider: &dyn TableProvider,
    cache: &mut SourceCache,
    trade_source: &str,
    sentiment_source: &str,
) -> Result<JoinedDataset, DataError> {
    let trades_raw = cache.get_or_fetch(provider, trade_source)?;
    let sentiment_raw = cache.get_or_fetch(provider, sentiment_source)?;

    let trades = normalize_trades(trades_raw)?;
    let sentiment = map_sentiment(sentiment_raw)?;
    join_trades_sentiment(trades, sentiment)
}
