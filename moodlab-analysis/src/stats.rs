//! Distribution tests over the full joined dataset.
//!
//! - Mann–Whitney U (two-sided, rank-sum): does the PnL distribution shift
//!   between Fear and Greed days? Large-sample normal approximation with
//!   tie and continuity corrections; trade datasets here run to thousands
//!   of rows, where the exact small-sample distribution is irrelevant.
//! - Chi-square independence on the 2×2 mood × loss table, with Yates
//!   continuity correction (the reference implementation's default for
//!   2×2 tables).
//!
//! Both report a raw p-value; the 0.05 threshold is applied here once to
//! produce the boolean verdict the caller displays.

use moodlab_core::{JoinedDataset, Mood};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ChiSquared, ContinuousCDF, Normal};

/// Fixed significance threshold for both verdicts.
pub const SIGNIFICANCE_LEVEL: f64 = 0.05;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StatTestError {
    #[error("need two non-empty groups for a two-sample test ({n_x} vs {n_y} observations)")]
    InsufficientData { n_x: usize, n_y: usize },

    #[error("contingency table has an empty margin; independence is undefined")]
    EmptyMargin,
}

/// One hypothesis-test outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub statistic: f64,
    pub p_value: f64,
    /// p_value < 0.05
    pub significant: bool,
}

impl TestResult {
    fn from_p(statistic: f64, p_value: f64) -> Self {
        let p_value = p_value.clamp(0.0, 1.0);
        Self {
            statistic,
            p_value,
            significant: p_value < SIGNIFICANCE_LEVEL,
        }
    }
}

/// Both tests over one joined dataset. Each slot carries its own outcome:
/// an undefined contingency table (all losses, say) must not suppress a
/// perfectly valid rank-sum result.
#[derive(Debug, Clone, PartialEq)]
pub struct DistributionTests {
    /// Mann–Whitney U on closed_pnl, Fear vs Greed.
    pub rank_sum: Result<TestResult, StatTestError>,
    /// Chi-square independence on mood × loss.
    pub independence: Result<TestResult, StatTestError>,
}

/// Split PnL by mood and run both tests.
pub fn run_distribution_tests(joined: &JoinedDataset) -> DistributionTests {
    let fear_pnl: Vec<f64> = joined
        .rows()
        .iter()
        .filter(|t| t.mood == Mood::Fear)
        .map(|t| t.closed_pnl)
        .collect();
    let greed_pnl: Vec<f64> = joined
        .rows()
        .iter()
        .filter(|t| t.mood == Mood::Greed)
        .map(|t| t.closed_pnl)
        .collect();

    let rank_sum = mann_whitney_u(&fear_pnl, &greed_pnl);

    let count = |pnls: &[f64], loss: bool| {
        pnls.iter().filter(|&&p| (p <= 0.0) == loss).count() as f64
    };
    let table = [
        [count(&fear_pnl, true), count(&fear_pnl, false)],
        [count(&greed_pnl, true), count(&greed_pnl, false)],
    ];
    let independence = chi_square_independence(table);

    DistributionTests {
        rank_sum,
        independence,
    }
}

/// Two-sided Mann–Whitney U test.
///
/// Statistic is U for the first sample. P-value via the tie-corrected
/// normal approximation with continuity correction; returns p = 1.0 when
/// every observation is tied (zero variance).
pub fn mann_whitney_u(xs: &[f64], ys: &[f64]) -> Result<TestResult, StatTestError> {
    let (n_x, n_y) = (xs.len(), ys.len());
    if n_x == 0 || n_y == 0 {
        return Err(StatTestError::InsufficientData { n_x, n_y });
    }

    let ranks = average_ranks(xs, ys);
    let r_x: f64 = ranks[..n_x].iter().sum();
    let u = r_x - (n_x * (n_x + 1)) as f64 / 2.0;

    let n = (n_x + n_y) as f64;
    let mu = (n_x * n_y) as f64 / 2.0;
    let tie_sum = tie_correction(xs, ys);
    let variance = (n_x * n_y) as f64 / 12.0 * ((n + 1.0) - tie_sum / (n * (n - 1.0)));

    if variance <= 0.0 {
        return Ok(TestResult::from_p(u, 1.0));
    }

    // Continuity correction shrinks |U - mu| by half a rank, never past zero
    let z = ((u - mu).abs() - 0.5).max(0.0) / variance.sqrt();
    let p = match Normal::new(0.0, 1.0) {
        Ok(normal) => 2.0 * (1.0 - normal.cdf(z)),
        Err(_) => 1.0,
    };
    Ok(TestResult::from_p(u, p))
}

/// Chi-square test of independence on a 2×2 contingency table
/// (rows: mood, columns: loss yes/no), with Yates continuity correction.
pub fn chi_square_independence(observed: [[f64; 2]; 2]) -> Result<TestResult, StatTestError> {
    let row_totals = [observed[0][0] + observed[0][1], observed[1][0] + observed[1][1]];
    let col_totals = [observed[0][0] + observed[1][0], observed[0][1] + observed[1][1]];
    let total = row_totals[0] + row_totals[1];

    if row_totals.contains(&0.0) || col_totals.contains(&0.0) {
        return Err(StatTestError::EmptyMargin);
    }

    let mut statistic = 0.0;
    for r in 0..2 {
        for c in 0..2 {
            let expected = row_totals[r] * col_totals[c] / total;
            let corrected = (observed[r][c] - expected).abs() - 0.5;
            let corrected = corrected.max(0.0);
            statistic += corrected * corrected / expected;
        }
    }

    let p = match ChiSquared::new(1.0) {
        Ok(chi2) => 1.0 - chi2.cdf(statistic),
        Err(_) => 1.0,
    };
    Ok(TestResult::from_p(statistic, p))
}

/// Ranks (1-based, ties averaged) of the concatenation xs ++ ys, returned
/// in the concatenation's order.
fn average_ranks(xs: &[f64], ys: &[f64]) -> Vec<f64> {
    let combined: Vec<f64> = xs.iter().chain(ys.iter()).copied().collect();
    let mut order: Vec<usize> = (0..combined.len()).collect();
    order.sort_by(|&a, &b| {
        combined[a]
            .partial_cmp(&combined[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut ranks = vec![0.0; combined.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && combined[order[j + 1]] == combined[order[i]] {
            j += 1;
        }
        // Average rank for the tie group [i, j]
        let avg = (i + j + 2) as f64 / 2.0;
        for &idx in &order[i..=j] {
            ranks[idx] = avg;
        }
        i = j + 1;
    }
    ranks
}

/// Σ (t³ − t) over tie groups of the pooled sample.
fn tie_correction(xs: &[f64], ys: &[f64]) -> f64 {
    let mut combined: Vec<f64> = xs.iter().chain(ys.iter()).copied().collect();
    combined.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mut sum = 0.0;
    let mut i = 0;
    while i < combined.len() {
        let mut j = i;
        while j + 1 < combined.len() && combined[j + 1] == combined[i] {
            j += 1;
        }
        let t = (j - i + 1) as f64;
        sum += t * t * t - t;
        i = j + 1;
    }
    sum
}
