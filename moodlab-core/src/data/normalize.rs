//! Trade normalizer: canonical headers, day-first timestamp parsing,
//! numeric casts.
//!
//! Failure policy is whole-batch: one unparseable timestamp or non-numeric
//! size/pnl aborts the load with the offending row. Silently dropping rows
//! would shift every downstream statistic.

use super::provider::DataError;
use super::schema::{SchemaMap, TRADE_COLUMNS};
use chrono::NaiveDate;
use polars::prelude::*;

/// Normalize a raw trade table.
///
/// - Renames every column to its canonical (lowercase, underscore) name
/// - Parses the date portion of `timestamp_ist` day-first into a `date` column
/// - Casts `size_usd` and `closed_pnl` to f64, rejecting nulls and negatives
///
/// All other trade columns pass through untouched.
pub fn normalize_trades(raw: DataFrame) -> Result<DataFrame, DataError> {
    let headers: Vec<String> = raw
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();
    let map = SchemaMap::from_headers(&headers);
    map.validate(&TRADE_COLUMNS)?;

    let mut df = raw;
    map.apply(&mut df)?;

    let dates = parse_timestamp_column(&df)?;
    df.with_column(super::date_column("date", &dates)?)?;

    let df = df
        .lazy()
        .with_columns([
            col("size_usd").cast(DataType::Float64),
            col("closed_pnl").cast(DataType::Float64),
        ])
        .collect()?;

    validate_numeric(&df, "size_usd", true)?;
    validate_numeric(&df, "closed_pnl", false)?;
    Ok(df)
}

/// Parse the date portion of every `timestamp_ist` value.
///
/// Source format is "DD-MM-YYYY HH:MM" (day-first); a slash-separated
/// variant shows up in some exports and is accepted too.
fn parse_timestamp_column(df: &DataFrame) -> Result<Vec<NaiveDate>, DataError> {
    let ts = df
        .column("timestamp_ist")?
        .str()
        .map_err(|_| DataError::Frame("timestamp_ist is not a string column".to_string()))?;

    let mut dates = Vec::with_capacity(df.height());
    for (row, value) in ts.into_iter().enumerate() {
        let value = value.ok_or_else(|| DataError::Parse {
            column: "timestamp_ist".to_string(),
            value: "<null>".to_string(),
            row,
        })?;
        let date = parse_day_first(value).ok_or_else(|| DataError::Parse {
            column: "timestamp_ist".to_string(),
            value: value.to_string(),
            row,
        })?;
        dates.push(date);
    }
    Ok(dates)
}

fn parse_day_first(value: &str) -> Option<NaiveDate> {
    let date_part = value.split_whitespace().next()?;
    NaiveDate::parse_from_str(date_part, "%d-%m-%Y")
        .or_else(|_| NaiveDate::parse_from_str(date_part, "%d/%m/%Y"))
        .ok()
}

/// Reject nulls (failed casts included), non-finite values, and, when
/// `non_negative`, values < 0. A NaN or infinity that slipped through here
/// would poison every downstream statistic without ever erroring.
fn validate_numeric(df: &DataFrame, column: &str, non_negative: bool) -> Result<(), DataError> {
    let values = df
        .column(column)?
        .f64()
        .map_err(|_| DataError::Frame(format!("{column} did not cast to f64")))?;

    for (row, value) in values.into_iter().enumerate() {
        let value = value.ok_or_else(|| DataError::InvalidValue {
            column: column.to_string(),
            value: "<null>".to_string(),
            row,
            reason: "not numeric".to_string(),
        })?;
        if !value.is_finite() {
            return Err(DataError::InvalidValue {
                column: column.to_string(),
                value: value.to_string(),
                row,
                reason: "not finite".to_string(),
            });
        }
        if non_negative && value < 0.0 {
            return Err(DataError::InvalidValue {
                column: column.to_string(),
                value: value.to_string(),
                row,
                reason: "must be non-negative".to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_trades() -> DataFrame {
        df!(
            "Timestamp IST" => &["01-12-2024 14:30", "02-12-2024 09:15"],
            "Size USD" => &[1000.0, 3000.0],
            "Closed PnL" => &[-50.0, 200.0],
            "Coin" => &["BTC", "ETH"],
        )
        .unwrap()
    }

    #[test]
    fn normalizes_headers_and_derives_date() {
        let df = normalize_trades(raw_trades()).unwrap();
        assert!(df.column("timestamp_ist").is_ok());
        assert!(df.column("size_usd").is_ok());
        assert!(df.column("closed_pnl").is_ok());

        let dates = df.column("date").unwrap().date().unwrap();
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        let first = epoch + chrono::Duration::days(dates.get(0).unwrap() as i64);
        assert_eq!(first, NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());
    }

    #[test]
    fn passes_through_extra_columns() {
        let df = normalize_trades(raw_trades()).unwrap();
        assert!(df.column("coin").is_ok());
    }

    #[test]
    fn day_first_parsing_is_not_month_first() {
        // 03-04-2023 must be April 3rd, not March 4th
        let df = df!(
            "Timestamp IST" => &["03-04-2023 00:00"],
            "Size USD" => &[10.0],
            "Closed PnL" => &[0.0],
        )
        .unwrap();
        let out = normalize_trades(df).unwrap();
        let dates = out.column("date").unwrap().date().unwrap();
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        let d = epoch + chrono::Duration::days(dates.get(0).unwrap() as i64);
        assert_eq!(d, NaiveDate::from_ymd_opt(2023, 4, 3).unwrap());
    }

    #[test]
    fn slash_separated_dates_are_accepted() {
        let df = df!(
            "Timestamp IST" => &["25/12/2024 10:00"],
            "Size USD" => &[10.0],
            "Closed PnL" => &[1.0],
        )
        .unwrap();
        assert!(normalize_trades(df).is_ok());
    }

    #[test]
    fn one_bad_timestamp_fails_the_whole_batch() {
        let df = df!(
            "Timestamp IST" => &["01-12-2024 14:30", "not a date"],
            "Size USD" => &[1000.0, 2000.0],
            "Closed PnL" => &[-50.0, 10.0],
        )
        .unwrap();
        let err = normalize_trades(df).unwrap_err();
        assert!(matches!(err, DataError::Parse { row: 1, .. }));
    }

    #[test]
    fn missing_required_column_fails_fast() {
        let df = df!(
            "Timestamp IST" => &["01-12-2024 14:30"],
            "Closed PnL" => &[-50.0],
        )
        .unwrap();
        let err = normalize_trades(df).unwrap_err();
        assert!(matches!(err, DataError::Schema(_)));
    }

    #[test]
    fn negative_trade_size_is_rejected() {
        let df = df!(
            "Timestamp IST" => &["01-12-2024 14:30"],
            "Size USD" => &[-5.0],
            "Closed PnL" => &[1.0],
        )
        .unwrap();
        let err = normalize_trades(df).unwrap_err();
        assert!(matches!(err, DataError::InvalidValue { .. }));
    }

    #[test]
    fn nan_trade_size_is_rejected() {
        let df = df!(
            "Timestamp IST" => &["01-12-2024 14:30", "02-12-2024 14:30"],
            "Size USD" => &[1000.0, f64::NAN],
            "Closed PnL" => &[-50.0, 10.0],
        )
        .unwrap();
        let err = normalize_trades(df).unwrap_err();
        assert!(
            matches!(err, DataError::InvalidValue { row: 1, ref reason, .. } if reason == "not finite")
        );
    }

    #[test]
    fn infinite_pnl_is_rejected() {
        let df = df!(
            "Timestamp IST" => &["01-12-2024 14:30"],
            "Size USD" => &[1000.0],
            "Closed PnL" => &[f64::INFINITY],
        )
        .unwrap();
        let err = normalize_trades(df).unwrap_err();
        assert!(matches!(err, DataError::InvalidValue { .. }));
    }

    #[test]
    fn integer_sizes_cast_to_f64() {
        let df = df!(
            "Timestamp IST" => &["01-12-2024 14:30"],
            "Size USD" => &[1000i64],
            "Closed PnL" => &[-50i64],
        )
        .unwrap();
        let out = normalize_trades(df).unwrap();
        assert_eq!(
            out.column("size_usd").unwrap().f64().unwrap().get(0),
            Some(1000.0)
        );
    }
}
