//! Filter engine: mood + inclusive size-range selection over the joined set.
//!
//! An empty result is a valid outcome, not an error — every downstream
//! consumer defines its own empty-input behavior (metrics return NoData,
//! models and tests are fit on the full joined set and never see the
//! filtered view).

use super::join::JoinedDataset;
use crate::domain::{JoinedTrade, Mood};
use serde::{Deserialize, Serialize};

/// Inclusive trade-size range in USD, `0 <= lo <= hi`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeRange {
    lo: f64,
    hi: f64,
}

impl SizeRange {
    pub fn new(lo: f64, hi: f64) -> Result<Self, FilterError> {
        if !lo.is_finite() || !hi.is_finite() || lo < 0.0 || lo > hi {
            return Err(FilterError::InvalidRange { lo, hi });
        }
        Ok(Self { lo, hi })
    }

    pub fn lo(&self) -> f64 {
        self.lo
    }

    pub fn hi(&self) -> f64 {
        self.hi
    }

    /// Midpoint of the range — the size the loss model is queried at.
    pub fn midpoint(&self) -> f64 {
        (self.lo + self.hi) / 2.0
    }

    /// Inclusive on both ends.
    pub fn contains(&self, size_usd: f64) -> bool {
        self.lo <= size_usd && size_usd <= self.hi
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FilterError {
    #[error("invalid size range [{lo}, {hi}] (need 0 <= lo <= hi, finite)")]
    InvalidRange { lo: f64, hi: f64 },
}

/// The user-selected subset of the joined dataset.
#[derive(Debug, Clone)]
pub struct FilteredView {
    mood: Mood,
    range: SizeRange,
    trades: Vec<JoinedTrade>,
}

impl FilteredView {
    pub fn mood(&self) -> Mood {
        self.mood
    }

    pub fn range(&self) -> SizeRange {
        self.range
    }

    pub fn trades(&self) -> &[JoinedTrade] {
        &self.trades
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }
}

/// Select rows with the given mood and `lo <= size_usd <= hi`.
pub fn filter_trades(joined: &JoinedDataset, mood: Mood, range: SizeRange) -> FilteredView {
    let trades = joined
        .rows()
        .iter()
        .filter(|t| t.mood == mood && range.contains(t.size_usd))
        .copied()
        .collect();
    FilteredView {
        mood,
        range,
        trades,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::join::join_trades_sentiment;
    use crate::data::normalize::normalize_trades;
    use crate::data::sentiment::map_sentiment;
    use polars::prelude::*;

    fn sample_joined() -> JoinedDataset {
        let trades = normalize_trades(
            df!(
                "Timestamp IST" => &[
                    "01-01-2023 10:00",
                    "01-01-2023 11:00",
                    "02-01-2023 10:00",
                    "02-01-2023 11:00",
                ],
                "Size USD" => &[1000.0, 3000.0, 500.0, 8000.0],
                "Closed PnL" => &[-50.0, 200.0, 0.0, -10.0],
            )
            .unwrap(),
        )
        .unwrap();
        let sentiment = map_sentiment(
            df!(
                "date" => &["2023-01-01", "2023-01-02"],
                "classification" => &["Fear", "Greed"],
            )
            .unwrap(),
        )
        .unwrap();
        join_trades_sentiment(trades, sentiment).unwrap()
    }

    #[test]
    fn selects_mood_and_inclusive_range() {
        let joined = sample_joined();
        let view = filter_trades(&joined, Mood::Fear, SizeRange::new(1000.0, 3000.0).unwrap());
        assert_eq!(view.len(), 2);
        assert!(view.trades().iter().all(|t| t.mood == Mood::Fear));
        // Both endpoints are included
        assert!(view.trades().iter().any(|t| t.size_usd == 1000.0));
        assert!(view.trades().iter().any(|t| t.size_usd == 3000.0));
    }

    #[test]
    fn empty_match_is_a_valid_result() {
        let joined = sample_joined();
        let view = filter_trades(&joined, Mood::Greed, SizeRange::new(0.0, 100.0).unwrap());
        assert!(view.is_empty());
    }

    #[test]
    fn rejects_inverted_or_negative_ranges() {
        assert!(SizeRange::new(500.0, 100.0).is_err());
        assert!(SizeRange::new(-1.0, 100.0).is_err());
        assert!(SizeRange::new(f64::NAN, 100.0).is_err());
        assert!(SizeRange::new(0.0, 0.0).is_ok());
    }

    #[test]
    fn midpoint_is_center_of_range() {
        let range = SizeRange::new(1000.0, 5000.0).unwrap();
        assert_eq!(range.midpoint(), 3000.0);
    }
}
