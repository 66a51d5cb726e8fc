//! MoodLab Analysis — the three independent consumers of the joined dataset.
//!
//! This crate builds on `moodlab-core` to provide:
//! - Metrics calculator: loss probability, mean PnL, trade count over the
//!   filtered view, plus per-mood behavior aggregates over the full set
//! - Risk models: two binary logistic regressions (loss probability and
//!   high-risk-trade probability) fit on the full joined dataset
//! - Distribution tests: Mann–Whitney U on PnL by mood, Chi-square
//!   independence on the mood × loss contingency table
//!
//! Every function here is pure: joined rows in, report out. Model and test
//! failures are scoped to their own computation — a degenerate label never
//! blocks the metrics.

pub mod logit;
pub mod metrics;
pub mod risk;
pub mod stats;

pub use logit::{Logit, ModelError};
pub use metrics::{compute_metrics, mood_summary, FilterMetrics, MetricsOutcome, MoodSummary};
pub use risk::{percentile, RiskModels};
pub use stats::{
    chi_square_independence, mann_whitney_u, run_distribution_tests, DistributionTests,
    StatTestError, TestResult, SIGNIFICANCE_LEVEL,
};
