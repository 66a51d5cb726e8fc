//! Risk models: two logistic regressions fit on the full joined dataset.
//!
//! - Loss model: P(closed_pnl <= 0) from [is_greed, size_usd]
//! - High-risk model: P(size_usd >= p75) from [is_greed], where p75 is the
//!   75th percentile of trade size over the current dataset
//!
//! Both are refit whenever the joined dataset changes; the handle carries
//! the dataset fingerprint so a caller can detect staleness instead of
//! serving predictions from a superseded fit.

use crate::logit::{Logit, ModelError};
use moodlab_core::{JoinedDataset, Mood};
use ndarray::{Array1, Array2};

/// Fitted pair of risk models plus the preprocessing state needed to score
/// new queries (size standardization, high-risk threshold).
#[derive(Debug, Clone)]
pub struct RiskModels {
    loss: Logit,
    high_risk: Logit,
    size_mean: f64,
    size_std: f64,
    high_risk_threshold: f64,
    fingerprint: String,
}

impl RiskModels {
    /// Fit both models on the full joined dataset (never the filtered view).
    pub fn fit(joined: &JoinedDataset) -> Result<Self, ModelError> {
        let rows = joined.rows();
        if rows.is_empty() {
            return Err(ModelError::EmptyDataset);
        }

        let sizes: Vec<f64> = rows.iter().map(|t| t.size_usd).collect();
        let greed_flags: Vec<f64> = rows
            .iter()
            .map(|t| t.mood.is_greed() as u8 as f64)
            .collect();

        // Gradient descent needs the size feature on a unit-ish scale;
        // raw USD sizes in the thousands would blow up the step size.
        let (size_mean, size_std) = standardization(&sizes);

        let loss_labels =
            Array1::from_iter(rows.iter().map(|t| if t.is_loss() { 1.0 } else { 0.0 }));
        let mut loss_x = Array2::<f64>::zeros((rows.len(), 2));
        for (i, row) in rows.iter().enumerate() {
            loss_x[[i, 0]] = greed_flags[i];
            loss_x[[i, 1]] = (row.size_usd - size_mean) / size_std;
        }
        let loss = Logit::fit(&loss_x, &loss_labels)?;

        // Threshold is recomputed from the current dataset, never fixed.
        let high_risk_threshold = percentile(&sizes, 0.75);
        let high_risk_labels = Array1::from_iter(
            sizes
                .iter()
                .map(|&s| if s >= high_risk_threshold { 1.0 } else { 0.0 }),
        );
        let mut high_risk_x = Array2::<f64>::zeros((rows.len(), 1));
        for (i, flag) in greed_flags.iter().enumerate() {
            high_risk_x[[i, 0]] = *flag;
        }
        let high_risk = Logit::fit(&high_risk_x, &high_risk_labels)?;

        Ok(Self {
            loss,
            high_risk,
            size_mean,
            size_std,
            high_risk_threshold,
            fingerprint: joined.fingerprint().to_string(),
        })
    }

    /// Predicted probability of a losing trade for the given mood and size.
    pub fn predict_loss_probability(&self, mood: Mood, size_usd: f64) -> Result<f64, ModelError> {
        let z_size = (size_usd - self.size_mean) / self.size_std;
        self.loss
            .predict_proba(&[mood.is_greed() as u8 as f64, z_size])
    }

    /// Predicted probability that a trade under this mood is high-risk
    /// (size at or above the dataset's 75th size percentile).
    pub fn predict_high_risk_probability(&self, mood: Mood) -> Result<f64, ModelError> {
        self.high_risk
            .predict_proba(&[mood.is_greed() as u8 as f64])
    }

    /// The size threshold (USD) that defined the high-risk label.
    pub fn high_risk_threshold(&self) -> f64 {
        self.high_risk_threshold
    }

    /// Fingerprint of the dataset these models were fit on.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// True when `joined` is not the dataset this handle was fit on.
    pub fn is_stale(&self, joined: &JoinedDataset) -> bool {
        self.fingerprint != joined.fingerprint()
    }
}

fn standardization(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std = var.sqrt();
    // A constant column standardizes to zeros rather than NaNs
    (mean, if std > 0.0 { std } else { 1.0 })
}

/// Linearly-interpolated percentile, `q` in [0, 1].
///
/// Matches the conventional definition: p75 of [100, 100, 100, 1000]
/// is 325.
pub fn percentile(values: &[f64], q: f64) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    if sorted.is_empty() {
        return f64::NAN;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }
    let h = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}
