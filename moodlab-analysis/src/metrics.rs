//! Metrics calculator — pure functions over joined trade rows.
//!
//! The filtered-view metrics return an explicit `NoData` outcome for an
//! empty subset; the mean is never computed over zero rows, so no NaN can
//! masquerade as a real number downstream.

use moodlab_core::{JoinedDataset, JoinedTrade, Mood};
use serde::{Deserialize, Serialize};

/// Descriptive statistics for a non-empty filtered view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterMetrics {
    /// Fraction of trades with closed_pnl <= 0 (break-even counts as a loss).
    pub loss_probability: f64,
    /// Arithmetic mean of closed_pnl.
    pub avg_pnl: f64,
    pub trade_count: usize,
}

/// Outcome of the metrics calculator. `NoData` is a sentinel result, not an
/// error: an empty filter match is an expected state the UI must render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MetricsOutcome {
    NoData,
    Metrics(FilterMetrics),
}

/// Compute loss probability, mean PnL, and trade count for a filtered view.
pub fn compute_metrics(trades: &[JoinedTrade]) -> MetricsOutcome {
    if trades.is_empty() {
        return MetricsOutcome::NoData;
    }
    let n = trades.len();
    let losses = trades.iter().filter(|t| t.is_loss()).count();
    let pnl_sum: f64 = trades.iter().map(|t| t.closed_pnl).sum();

    MetricsOutcome::Metrics(FilterMetrics {
        loss_probability: losses as f64 / n as f64,
        avg_pnl: pnl_sum / n as f64,
        trade_count: n,
    })
}

/// Per-mood behavior aggregate over the full joined dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodSummary {
    pub mood: Mood,
    pub trade_count: usize,
    pub avg_trade_size: f64,
}

/// Aggregate trade count and average trade size by mood, over the full
/// joined set (not the size-filtered view). Moods with no rows are omitted.
pub fn mood_summary(joined: &JoinedDataset) -> Vec<MoodSummary> {
    [Mood::Fear, Mood::Greed]
        .into_iter()
        .filter_map(|mood| {
            let sizes: Vec<f64> = joined
                .rows()
                .iter()
                .filter(|t| t.mood == mood)
                .map(|t| t.size_usd)
                .collect();
            if sizes.is_empty() {
                return None;
            }
            Some(MoodSummary {
                mood,
                trade_count: sizes.len(),
                avg_trade_size: sizes.iter().sum::<f64>() / sizes.len() as f64,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn trade(mood: Mood, size_usd: f64, closed_pnl: f64) -> JoinedTrade {
        JoinedTrade {
            date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            mood,
            size_usd,
            closed_pnl,
        }
    }

    #[test]
    fn spec_scenario_two_fear_trades() {
        let trades = vec![
            trade(Mood::Fear, 1000.0, -50.0),
            trade(Mood::Fear, 3000.0, 200.0),
        ];
        match compute_metrics(&trades) {
            MetricsOutcome::Metrics(m) => {
                assert_eq!(m.loss_probability, 0.5);
                assert_eq!(m.avg_pnl, 75.0);
                assert_eq!(m.trade_count, 2);
            }
            MetricsOutcome::NoData => panic!("expected metrics"),
        }
    }

    #[test]
    fn empty_subset_returns_no_data() {
        assert_eq!(compute_metrics(&[]), MetricsOutcome::NoData);
    }

    #[test]
    fn all_losses_gives_probability_one() {
        let trades = vec![
            trade(Mood::Greed, 100.0, -1.0),
            trade(Mood::Greed, 200.0, 0.0), // break-even is a loss
        ];
        match compute_metrics(&trades) {
            MetricsOutcome::Metrics(m) => assert_eq!(m.loss_probability, 1.0),
            MetricsOutcome::NoData => panic!("expected metrics"),
        }
    }

    #[test]
    fn all_wins_gives_probability_zero() {
        let trades = vec![trade(Mood::Fear, 100.0, 0.01), trade(Mood::Fear, 200.0, 5.0)];
        match compute_metrics(&trades) {
            MetricsOutcome::Metrics(m) => assert_eq!(m.loss_probability, 0.0),
            MetricsOutcome::NoData => panic!("expected metrics"),
        }
    }

    #[test]
    fn mood_summary_groups_over_the_full_joined_set() {
        use moodlab_core::{join_trades_sentiment, map_sentiment, normalize_trades};
        use polars::prelude::*;

        let trades = normalize_trades(
            df!(
                "Timestamp IST" => &["01-01-2023 10:00", "01-01-2023 11:00", "02-01-2023 10:00"],
                "Size USD" => &[1000.0, 3000.0, 500.0],
                "Closed PnL" => &[-50.0, 200.0, 10.0],
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
        let joined = join_trades_sentiment(trades, sentiment).unwrap();

        let summary = mood_summary(&joined);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].mood, Mood::Fear);
        assert_eq!(summary[0].trade_count, 2);
        assert_eq!(summary[0].avg_trade_size, 2000.0);
        assert_eq!(summary[1].mood, Mood::Greed);
        assert_eq!(summary[1].trade_count, 1);
        assert_eq!(summary[1].avg_trade_size, 500.0);
    }

    #[test]
    fn mood_summary_omits_absent_moods() {
        use moodlab_core::{join_trades_sentiment, map_sentiment, normalize_trades};
        use polars::prelude::*;

        let trades = normalize_trades(
            df!(
                "Timestamp IST" => &["01-01-2023 10:00"],
                "Size USD" => &[1000.0],
                "Closed PnL" => &[-50.0],
            )
            .unwrap(),
        )
        .unwrap();
        let sentiment = map_sentiment(
            df!("date" => &["2023-01-01"], "classification" => &["Fear"]).unwrap(),
        )
        .unwrap();
        let joined = join_trades_sentiment(trades, sentiment).unwrap();

        let summary = mood_summary(&joined);
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].mood, Mood::Fear);
    }

    proptest! {
        /// loss_probability is always a valid probability and trade_count
        /// matches the input length.
        #[test]
        fn loss_probability_is_bounded(
            pnls in proptest::collection::vec(-1000.0..1000.0f64, 1..100)
        ) {
            let trades: Vec<JoinedTrade> = pnls
                .iter()
                .map(|&p| trade(Mood::Fear, 100.0, p))
                .collect();
            match compute_metrics(&trades) {
                MetricsOutcome::Metrics(m) => {
                    prop_assert!((0.0..=1.0).contains(&m.loss_probability));
                    prop_assert_eq!(m.trade_count, trades.len());
                    prop_assert!(m.avg_pnl.is_finite());
                }
                MetricsOutcome::NoData => prop_assert!(false, "non-empty input gave NoData"),
            }
        }
    }
}
