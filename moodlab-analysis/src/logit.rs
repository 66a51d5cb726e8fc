//! Binary logistic regression, fit by batch gradient descent on the
//! log-loss.
//!
//! Deliberately small: two or three parameters, zero-initialized weights, a
//! fixed learning rate, and a convergence check on the cost delta. With no
//! stochastic subsampling the fit is fully deterministic — refitting on
//! identical input reproduces the same coefficients bit for bit.
//!
//! Callers are expected to standardize wide-ranged features (trade sizes in
//! the thousands) before fitting; see `risk::RiskModels`.

use ndarray::{Array1, Array2};

const LEARNING_RATE: f64 = 0.3;
const MAX_ITER: usize = 5_000;
const TOLERANCE: f64 = 1e-10;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("empty dataset: nothing to fit")]
    EmptyDataset,

    #[error("feature/label shape mismatch: {rows} rows vs {labels} labels")]
    ShapeMismatch { rows: usize, labels: usize },

    #[error("label column is constant ({value}); a classifier cannot be fit")]
    DegenerateLabel { value: f64 },

    #[error("prediction input has {got} features, model expects {expected}")]
    FeatureCount { expected: usize, got: usize },
}

/// A fitted binary logistic-regression model.
#[derive(Debug, Clone)]
pub struct Logit {
    weights: Array1<f64>,
    bias: f64,
}

impl Logit {
    /// Fit by maximum likelihood (gradient descent on the log-loss).
    ///
    /// `y` must contain 0.0/1.0 labels with at least one of each; a constant
    /// label column is reported as `DegenerateLabel` rather than producing a
    /// spurious always-p probability.
    pub fn fit(x: &Array2<f64>, y: &Array1<f64>) -> Result<Self, ModelError> {
        let n = x.nrows();
        if n == 0 {
            return Err(ModelError::EmptyDataset);
        }
        if y.len() != n {
            return Err(ModelError::ShapeMismatch {
                rows: n,
                labels: y.len(),
            });
        }
        let first = y[0];
        if y.iter().all(|&v| v == first) {
            return Err(ModelError::DegenerateLabel { value: first });
        }

        let n_f = n as f64;
        let mut weights = Array1::<f64>::zeros(x.ncols());
        let mut bias = 0.0;
        let mut prev_cost = f64::INFINITY;

        for _ in 0..MAX_ITER {
            let linear = x.dot(&weights) + bias;
            let predictions = linear.mapv(sigmoid);

            let errors = &predictions - y;
            let dw = x.t().dot(&errors) / n_f;
            let db = errors.sum() / n_f;

            weights = &weights - &(&dw * LEARNING_RATE);
            bias -= LEARNING_RATE * db;

            let cost = log_loss(y, &predictions);
            if (prev_cost - cost).abs() < TOLERANCE {
                break;
            }
            prev_cost = cost;
        }

        Ok(Self { weights, bias })
    }

    /// Predicted probability of the positive class for one observation.
    pub fn predict_proba(&self, features: &[f64]) -> Result<f64, ModelError> {
        if features.len() != self.weights.len() {
            return Err(ModelError::FeatureCount {
                expected: self.weights.len(),
                got: features.len(),
            });
        }
        let z = self
            .weights
            .iter()
            .zip(features)
            .map(|(w, f)| w * f)
            .sum::<f64>()
            + self.bias;
        Ok(sigmoid(z))
    }

    pub fn weights(&self) -> &Array1<f64> {
        &self.weights
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }
}

/// Numerically stable sigmoid.
fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Binary cross-entropy with clipped probabilities.
fn log_loss(y: &Array1<f64>, p: &Array1<f64>) -> f64 {
    let eps = 1e-15;
    let n = y.len() as f64;
    -y.iter()
        .zip(p.iter())
        .map(|(&y, &p)| {
            let p = p.clamp(eps, 1.0 - eps);
            y * p.ln() + (1.0 - y) * (1.0 - p).ln()
        })
        .sum::<f64>()
        / n
}
