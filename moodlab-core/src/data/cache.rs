//! Explicit source cache: memoized table loads keyed by source identifier.
//!
//! The original dashboard memoized its two remote loads process-wide behind
//! a decorator. Here the cache is an ordinary value the caller owns —
//! invalidation is a method call, not a process restart, and two analyses
//! can hold independent caches.

use super::provider::{DataError, TableProvider};
use polars::prelude::DataFrame;
use std::collections::HashMap;

/// In-memory memo of fetched tables, keyed by source identifier.
#[derive(Debug, Default)]
pub struct SourceCache {
    entries: HashMap<String, DataFrame>,
}

impl SourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached table for `source`, fetching through `provider` on
    /// a miss. Repeated calls with the same source never re-fetch.
    ///
    /// DataFrame clones are cheap (column buffers are shared), so hits hand
    /// out an owned frame rather than a borrow.
    pub fn get_or_fetch(
        &mut self,
        provider: &dyn TableProvider,
        source: &str,
    ) -> Result<DataFrame, DataError> {
        if let Some(df) = self.entries.get(source) {
            return Ok(df.clone());
        }
        let df = provider.fetch(source)?;
        self.entries.insert(source.to_string(), df.clone());
        Ok(df)
    }

    /// Drop one entry. Returns whether it was present.
    pub fn invalidate(&mut self, source: &str) -> bool {
        self.entries.remove(source).is_some()
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn contains(&self, source: &str) -> bool {
        self.entries.contains_key(source)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
