//! Join engine: trades × daily sentiment, inner-joined on calendar date.
//!
//! Trades on dates without sentiment coverage are dropped (expected, not an
//! error). Neutral days are removed right after the join, so everything
//! downstream only ever sees Fear/Greed rows. The output is sorted on
//! (date, size_usd, closed_pnl) to make the joined set invariant to the row
//! order of either input.

use super::provider::DataError;
use crate::domain::{JoinedTrade, Mood, Sentiment};
use chrono::NaiveDate;
use polars::prelude::*;

/// The joined, analysis-ready dataset.
///
/// Holds the full joined frame (pass-through trade columns preserved), the
/// extracted typed rows the analytical consumers work on, and a blake3
/// fingerprint so a fitted model handle can be tied to the exact dataset it
/// was fit on.
#[derive(Debug, Clone)]
pub struct JoinedDataset {
    frame: DataFrame,
    rows: Vec<JoinedTrade>,
    fingerprint: String,
}

impl JoinedDataset {
    /// Full joined frame, including pass-through columns.
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Typed rows: (date, mood, size_usd, closed_pnl).
    pub fn rows(&self) -> &[JoinedTrade] {
        &self.rows
    }

    /// blake3 hash over the typed rows. Identical input tables produce the
    /// same fingerprint regardless of their row order.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Inner-join normalized trades to mapped sentiment on `date`, cut Neutral.
pub fn join_trades_sentiment(
    trades: DataFrame,
    sentiment: DataFrame,
) -> Result<JoinedDataset, DataError> {
    let frame = trades
        .lazy()
        .join(
            sentiment.lazy(),
            [col("date")],
            [col("date")],
            JoinArgs::new(JoinType::Inner),
        )
        .filter(col("market_sentiment").neq(lit(Sentiment::Neutral.as_str())))
        .sort(
            ["date", "size_usd", "closed_pnl"],
            SortMultipleOptions::default(),
        )
        .collect()?;

    let rows = extract_rows(&frame)?;
    let fingerprint = fingerprint_rows(&rows);
    Ok(JoinedDataset {
        frame,
        rows,
        fingerprint,
    })
}

fn extract_rows(frame: &DataFrame) -> Result<Vec<JoinedTrade>, DataError> {
    let dates = frame.column("date")?.date().map_err(|e| {
        DataError::Frame(format!("date column type after join: {e}"))
    })?;
    let moods = frame.column("market_sentiment")?.str().map_err(|e| {
        DataError::Frame(format!("market_sentiment column type after join: {e}"))
    })?;
    let sizes = frame.column("size_usd")?.f64().map_err(|e| {
        DataError::Frame(format!("size_usd column type after join: {e}"))
    })?;
    let pnls = frame.column("closed_pnl")?.f64().map_err(|e| {
        DataError::Frame(format!("closed_pnl column type after join: {e}"))
    })?;

    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
    let mut rows = Vec::with_capacity(frame.height());

    for i in 0..frame.height() {
        let days = dates
            .get(i)
            .ok_or_else(|| DataError::Frame(format!("null date at joined row {i}")))?;
        let mood = match moods.get(i) {
            Some("Fear") => Mood::Fear,
            Some("Greed") => Mood::Greed,
            other => {
                // Neutral was filtered above; anything else means the mapper
                // let a category through it shouldn't have.
                return Err(DataError::Frame(format!(
                    "unexpected market_sentiment {other:?} at joined row {i}"
                )));
            }
        };
        rows.push(JoinedTrade {
            date: epoch + chrono::Duration::days(days as i64),
            mood,
            size_usd: sizes
                .get(i)
                .ok_or_else(|| DataError::Frame(format!("null size_usd at joined row {i}")))?,
            closed_pnl: pnls
                .get(i)
                .ok_or_else(|| DataError::Frame(format!("null closed_pnl at joined row {i}")))?,
        });
    }
    Ok(rows)
}

fn fingerprint_rows(rows: &[JoinedTrade]) -> String {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
    let mut hasher = blake3::Hasher::new();
    for row in rows {
        let days = (row.date - epoch).num_days() as i32;
        hasher.update(&days.to_le_bytes());
        hasher.update(&[row.mood.is_greed() as u8]);
        hasher.update(&row.size_usd.to_le_bytes());
        hasher.update(&row.closed_pnl.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}
