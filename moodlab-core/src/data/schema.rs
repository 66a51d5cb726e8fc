//! Schema mapping: raw CSV headers → canonical column names.
//!
//! The source exports arrive with arbitrary-cased, space-separated headers
//! ("Timestamp IST", "Size USD"). Canonicalization is an explicit mapping
//! built once at ingestion and validated against the expected column set —
//! a header that doesn't cover the required set fails the load immediately
//! instead of surfacing later as a missing-column panic mid-pipeline.

use polars::prelude::*;

/// Canonical form of a raw header: trimmed, lower-cased, spaces joined
/// with underscores.
pub fn canonical_name(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// Required canonical columns for the trade export.
pub const TRADE_COLUMNS: [&str; 3] = ["timestamp_ist", "size_usd", "closed_pnl"];

/// Required canonical columns for the sentiment export.
pub const SENTIMENT_COLUMNS: [&str; 2] = ["date", "classification"];

/// Explicit `{raw_name -> canonical_name}` mapping for one table.
#[derive(Debug, Clone)]
pub struct SchemaMap {
    // (raw, canonical), in header order
    renames: Vec<(String, String)>,
}

impl SchemaMap {
    /// Build the mapping from a table's raw headers.
    pub fn from_headers<S: AsRef<str>>(headers: &[S]) -> Self {
        let renames = headers
            .iter()
            .map(|h| (h.as_ref().to_string(), canonical_name(h.as_ref())))
            .collect();
        Self { renames }
    }

    /// Canonical column names, in header order.
    pub fn canonical(&self) -> impl Iterator<Item = &str> {
        self.renames.iter().map(|(_, c)| c.as_str())
    }

    /// Validate the mapping against an expected canonical column set.
    ///
    /// Fails on the first missing required column, and on two raw headers
    /// collapsing to the same canonical name (the rename would be ambiguous).
    pub fn validate(&self, required: &[&str]) -> Result<(), SchemaError> {
        for (i, (_, canon)) in self.renames.iter().enumerate() {
            if self.renames[..i].iter().any(|(_, c)| c == canon) {
                return Err(SchemaError::AmbiguousColumn {
                    column: canon.clone(),
                });
            }
        }
        for req in required {
            if !self.renames.iter().any(|(_, c)| c == req) {
                return Err(SchemaError::MissingColumn {
                    column: req.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Apply the mapping: rename every column of `df` to its canonical name.
    pub fn apply(&self, df: &mut DataFrame) -> Result<(), SchemaError> {
        let names: Vec<String> = self.canonical().map(str::to_string).collect();
        df.set_column_names(names)
            .map_err(|e| SchemaError::RenameFailed {
                reason: e.to_string(),
            })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("missing required column '{column}' after canonicalization")]
    MissingColumn { column: String },

    #[error("two raw headers canonicalize to the same column '{column}'")]
    AmbiguousColumn { column: String },

    #[error("column rename failed: {reason}")]
    RenameFailed { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_name_lowercases_and_joins_spaces() {
        assert_eq!(canonical_name("Timestamp IST"), "timestamp_ist");
        assert_eq!(canonical_name("  Size USD "), "size_usd");
        assert_eq!(canonical_name("Closed  PnL"), "closed_pnl");
        assert_eq!(canonical_name("date"), "date");
    }

    #[test]
    fn validate_accepts_covering_headers() {
        let map = SchemaMap::from_headers(&["Timestamp IST", "Size USD", "Closed PnL", "Coin"]);
        assert!(map.validate(&TRADE_COLUMNS).is_ok());
    }

    #[test]
    fn validate_rejects_missing_required_column() {
        let map = SchemaMap::from_headers(&["Timestamp IST", "Coin"]);
        let err = map.validate(&TRADE_COLUMNS).unwrap_err();
        assert!(matches!(err, SchemaError::MissingColumn { column } if column == "size_usd"));
    }

    #[test]
    fn validate_rejects_ambiguous_headers() {
        let map = SchemaMap::from_headers(&["Size USD", "size usd"]);
        let err = map.validate(&[]).unwrap_err();
        assert!(matches!(err, SchemaError::AmbiguousColumn { column } if column == "size_usd"));
    }

    #[test]
    fn apply_renames_all_columns() {
        let mut df = df!(
            "Timestamp IST" => &["01-12-2024 14:00"],
            "Size USD" => &[100.0],
            "Closed PnL" => &[1.5],
        )
        .unwrap();
        let headers: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        let map = SchemaMap::from_headers(&headers);
        map.apply(&mut df).unwrap();
        assert!(df.column("timestamp_ist").is_ok());
        assert!(df.column("size_usd").is_ok());
        assert!(df.column("closed_pnl").is_ok());
    }
}
