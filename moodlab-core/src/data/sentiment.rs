//! Sentiment mapper: 5-level daily classification → Fear/Neutral/Greed.
//!
//! The output frame carries exactly the two columns the join needs
//! (`date`, `market_sentiment`). An unknown classification value aborts the
//! load — passing it through would leak an unmodeled category into every
//! downstream grouping.

use super::provider::DataError;
use super::schema::{SchemaMap, SENTIMENT_COLUMNS};
use crate::domain::Classification;
use chrono::NaiveDate;
use polars::prelude::*;

/// Map a raw sentiment table to `(date, market_sentiment)`.
///
/// Dates are parsed ISO-first with a day-first fallback. Duplicate dates are
/// deduped keeping the first occurrence — the daily index must be unique
/// before it can drive an inner join against trades.
pub fn map_sentiment(raw: DataFrame) -> Result<DataFrame, DataError> {
    let headers: Vec<String> = raw
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();
    let map = SchemaMap::from_headers(&headers);
    map.validate(&SENTIMENT_COLUMNS)?;

    let mut df = raw;
    map.apply(&mut df)?;

    let dates = parse_date_column(&df)?;
    let moods = map_classification_column(&df)?;

    let out = DataFrame::new(vec![
        super::date_column("date", &dates)?,
        Column::new("market_sentiment".into(), moods),
    ])?;

    Ok(out
        .lazy()
        .unique_stable(Some(vec!["date".into()]), UniqueKeepStrategy::First)
        .collect()?)
}

fn parse_date_column(df: &DataFrame) -> Result<Vec<NaiveDate>, DataError> {
    let raw = df
        .column("date")?
        .str()
        .map_err(|_| DataError::Frame("date is not a string column".to_string()))?;

    let mut dates = Vec::with_capacity(df.height());
    for (row, value) in raw.into_iter().enumerate() {
        let value = value.ok_or_else(|| DataError::Parse {
            column: "date".to_string(),
            value: "<null>".to_string(),
            row,
        })?;
        let date = parse_date(value).ok_or_else(|| DataError::Parse {
            column: "date".to_string(),
            value: value.to_string(),
            row,
        })?;
        dates.push(date);
    }
    Ok(dates)
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%d-%m-%Y"))
        .or_else(|_| NaiveDate::parse_from_str(value, "%d/%m/%Y"))
        .ok()
}

fn map_classification_column(df: &DataFrame) -> Result<Vec<&'static str>, DataError> {
    let raw = df
        .column("classification")?
        .str()
        .map_err(|_| DataError::Frame("classification is not a string column".to_string()))?;

    let mut moods = Vec::with_capacity(df.height());
    for (row, value) in raw.into_iter().enumerate() {
        let value = value.ok_or_else(|| DataError::UnknownCategory {
            value: "<null>".to_string(),
            row,
        })?;
        let classification: Classification =
            value.parse().map_err(|_| DataError::UnknownCategory {
                value: value.to_string(),
                row,
            })?;
        moods.push(classification.sentiment().as_str());
    }
    Ok(moods)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_sentiment() -> DataFrame {
        df!(
            "date" => &["2023-01-01", "2023-01-02", "2023-01-03", "2023-01-04", "2023-01-05"],
            "classification" => &["Extreme Fear", "Fear", "Neutral", "Greed", "Extreme Greed"],
        )
        .unwrap()
    }

    #[test]
    fn collapses_five_levels_to_three() {
        let df = map_sentiment(raw_sentiment()).unwrap();
        let moods: Vec<&str> = df
            .column("market_sentiment")
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .map(|v| v.unwrap())
            .collect();
        assert_eq!(moods, vec!["Fear", "Fear", "Neutral", "Greed", "Greed"]);
    }

    #[test]
    fn output_has_only_join_columns() {
        let df = map_sentiment(raw_sentiment()).unwrap();
        assert_eq!(df.width(), 2);
        assert!(df.column("date").is_ok());
        assert!(df.column("market_sentiment").is_ok());
    }

    #[test]
    fn unknown_classification_aborts_the_load() {
        let df = df!(
            "date" => &["2023-01-01", "2023-01-02"],
            "classification" => &["Fear", "Panic"],
        )
        .unwrap();
        let err = map_sentiment(df).unwrap_err();
        assert!(
            matches!(err, DataError::UnknownCategory { ref value, row: 1 } if value == "Panic")
        );
    }

    #[test]
    fn unparseable_date_aborts_the_load() {
        let df = df!(
            "date" => &["sometime in march"],
            "classification" => &["Fear"],
        )
        .unwrap();
        let err = map_sentiment(df).unwrap_err();
        assert!(matches!(err, DataError::Parse { .. }));
    }

    #[test]
    fn day_first_dates_are_accepted() {
        let df = df!(
            "date" => &["02-01-2023"],
            "classification" => &["Greed"],
        )
        .unwrap();
        let out = map_sentiment(df).unwrap();
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        let days = out.column("date").unwrap().date().unwrap().get(0).unwrap();
        assert_eq!(
            epoch + chrono::Duration::days(days as i64),
            NaiveDate::from_ymd_opt(2023, 1, 2).unwrap()
        );
    }

    #[test]
    fn duplicate_dates_keep_first_classification() {
        let df = df!(
            "date" => &["2023-01-01", "2023-01-01"],
            "classification" => &["Fear", "Greed"],
        )
        .unwrap();
        let out = map_sentiment(df).unwrap();
        assert_eq!(out.height(), 1);
        let mood = out
            .column("market_sentiment")
            .unwrap()
            .str()
            .unwrap()
            .get(0)
            .unwrap();
        assert_eq!(mood, "Fear");
    }

    #[test]
    fn uppercase_headers_are_canonicalized() {
        let df = df!(
            "Date" => &["2023-01-01"],
            "Classification" => &["Fear"],
        )
        .unwrap();
        assert!(map_sentiment(df).is_ok());
    }
}
