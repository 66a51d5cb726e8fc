//! Table provider trait and structured error types.
//!
//! The TableProvider trait abstracts over CSV sources (remote URL, local
//! file) so the pipeline can swap implementations and mock for tests. The
//! source cache sits above this trait — providers don't know about caching.

use super::schema::SchemaError;
use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;
use std::time::Duration;

/// Structured error types for the data layer.
///
/// Parse and category errors abort the entire load: a partially-parsed
/// dataset would silently change every downstream statistic.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("fetch failed for '{uri}': {reason}")]
    Fetch { uri: String, reason: String },

    #[error("csv ingest failed for '{uri}': {reason}")]
    Ingest { uri: String, reason: String },

    #[error("source '{uri}' contains no rows")]
    EmptySource { uri: String },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("row {row}: cannot parse '{value}' in column '{column}' as a day-first date")]
    Parse {
        column: String,
        value: String,
        row: usize,
    },

    #[error("row {row}: unknown sentiment classification '{value}'")]
    UnknownCategory { value: String, row: usize },

    #[error("row {row}: invalid value '{value}' in column '{column}': {reason}")]
    InvalidValue {
        column: String,
        value: String,
        row: usize,
        reason: String,
    },

    #[error("dataframe error: {0}")]
    Frame(String),
}

impl From<PolarsError> for DataError {
    fn from(e: PolarsError) -> Self {
        DataError::Frame(e.to_string())
    }
}

/// Trait for tabular data sources.
///
/// `fetch` must be a pure function of the source identifier: same source,
/// same table. That property is what makes the memoizing cache sound.
pub trait TableProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch the table behind a source identifier (URL or path).
    fn fetch(&self, source: &str) -> Result<DataFrame, DataError>;
}

/// Remote CSV provider over blocking HTTP.
pub struct HttpCsvProvider {
    client: reqwest::blocking::Client,
}

impl HttpCsvProvider {
    pub fn new() -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| DataError::Fetch {
                uri: "<client>".to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self { client })
    }
}

impl TableProvider for HttpCsvProvider {
    fn name(&self) -> &str {
        "http-csv"
    }

    fn fetch(&self, source: &str) -> Result<DataFrame, DataError> {
        let response = self
            .client
            .get(source)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| DataError::Fetch {
                uri: source.to_string(),
                reason: e.to_string(),
            })?;
        let bytes = response.bytes().map_err(|e| DataError::Fetch {
            uri: source.to_string(),
            reason: e.to_string(),
        })?;
        read_csv_bytes(&bytes, source)
    }
}

/// Local CSV file provider.
pub struct LocalCsvProvider;

impl TableProvider for LocalCsvProvider {
    fn name(&self) -> &str {
        "local-csv"
    }

    fn fetch(&self, source: &str) -> Result<DataFrame, DataError> {
        let path = Path::new(source);
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .map_err(|e| DataError::Ingest {
                uri: source.to_string(),
                reason: e.to_string(),
            })?
            .finish()
            .map_err(|e| DataError::Ingest {
                uri: source.to_string(),
                reason: e.to_string(),
            })?;
        require_rows(df, source)
    }
}

/// Dispatching provider: picks HTTP or local by the source's scheme.
///
/// This is the provider the CLI hands to the pipeline, so a caller can mix
/// a remote trade export with a local sentiment file in one invocation.
pub struct AutoCsvProvider {
    http: HttpCsvProvider,
    local: LocalCsvProvider,
}

impl AutoCsvProvider {
    pub fn new() -> Result<Self, DataError> {
        Ok(Self {
            http: HttpCsvProvider::new()?,
            local: LocalCsvProvider,
        })
    }
}

impl TableProvider for AutoCsvProvider {
    fn name(&self) -> &str {
        "auto-csv"
    }

    fn fetch(&self, source: &str) -> Result<DataFrame, DataError> {
        if source.starts_with("http://") || source.starts_with("https://") {
            self.http.fetch(source)
        } else {
            self.local.fetch(source)
        }
    }
}

/// Parse a CSV body already held in memory.
fn read_csv_bytes(bytes: &[u8], source: &str) -> Result<DataFrame, DataError> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()
        .map_err(|e| DataError::Ingest {
            uri: source.to_string(),
            reason: e.to_string(),
        })?;
    require_rows(df, source)
}

fn require_rows(df: DataFrame, source: &str) -> Result<DataFrame, DataError> {
    if df.height() == 0 {
        return Err(DataError::EmptySource {
            uri: source.to_string(),
        });
    }
    Ok(df)
}
