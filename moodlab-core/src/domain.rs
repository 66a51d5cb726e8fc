//! Domain types: sentiment classifications, moods, and joined trade rows.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Raw 5-level daily sentiment classification as it appears in the source data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Classification {
    ExtremeFear,
    Fear,
    Neutral,
    Greed,
    ExtremeGreed,
}

impl Classification {
    /// Collapse to the 3-level sentiment used downstream.
    ///
    /// Fixed table: Extreme Fear → Fear, Fear → Fear, Neutral → Neutral,
    /// Greed → Greed, Extreme Greed → Greed.
    pub fn sentiment(self) -> Sentiment {
        match self {
            Classification::ExtremeFear | Classification::Fear => Sentiment::Fear,
            Classification::Neutral => Sentiment::Neutral,
            Classification::Greed | Classification::ExtremeGreed => Sentiment::Greed,
        }
    }
}

impl FromStr for Classification {
    type Err = UnknownClassification;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Extreme Fear" => Ok(Classification::ExtremeFear),
            "Fear" => Ok(Classification::Fear),
            "Neutral" => Ok(Classification::Neutral),
            "Greed" => Ok(Classification::Greed),
            "Extreme Greed" => Ok(Classification::ExtremeGreed),
            other => Err(UnknownClassification(other.to_string())),
        }
    }
}

/// A classification string outside the 5 known values. Never passed through
/// silently — the whole load aborts on the first occurrence.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sentiment classification '{0}'")]
pub struct UnknownClassification(pub String);

/// 3-level market sentiment after collapsing the raw classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sentiment {
    Fear,
    Neutral,
    Greed,
}

impl Sentiment {
    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Fear => "Fear",
            Sentiment::Neutral => "Neutral",
            Sentiment::Greed => "Greed",
        }
    }
}

/// Analysis mood: the two sentiment groups that survive the Neutral cut.
///
/// Every computation past the join operates only on Fear/Greed rows, so the
/// type system excludes Neutral here rather than re-checking at each stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mood {
    Fear,
    Greed,
}

impl Mood {
    pub fn as_str(self) -> &'static str {
        match self {
            Mood::Fear => "Fear",
            Mood::Greed => "Greed",
        }
    }

    /// The 0/1 indicator feature used by the risk models.
    pub fn is_greed(self) -> bool {
        matches!(self, Mood::Greed)
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mood {
    type Err = ParseMoodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fear" => Ok(Mood::Fear),
            "greed" => Ok(Mood::Greed),
            other => Err(ParseMoodError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown mood '{0}' (expected 'fear' or 'greed')")]
pub struct ParseMoodError(pub String);

/// One trade row after the sentiment join, reduced to the columns the
/// analytical consumers need. The full joined frame (with pass-through
/// columns) stays available on `JoinedDataset`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JoinedTrade {
    pub date: NaiveDate,
    pub mood: Mood,
    pub size_usd: f64,
    pub closed_pnl: f64,
}

impl JoinedTrade {
    /// Break-even trades (closed_pnl == 0) count as losses. This is the
    /// literal behavior of the source metric and is reproduced everywhere a
    /// loss label is derived.
    pub fn is_loss(&self) -> bool {
        self.closed_pnl <= 0.0
    }
}
