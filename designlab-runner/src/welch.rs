//! Welch's unequal-variance t-test and multiple-comparison adjustment.
//!
//! Implements from first principles:
//! - Lanczos approximation for ln(Gamma)
//! - Regularized incomplete beta function
//! - Student's t-distribution CDF
//! - Welch two-sample t-test (two-sided, Welch–Satterthwaite df)
//! - Benjamini–Hochberg adjustment over the family of condition pairs
//!
//! Statistical caveat: with a dozen subjects per condition the normality
//! assumption is shaky; treat the pairwise p-values as ranking scores with a
//! principled adjustment, not literal false-positive probabilities.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use designlab_core::domain::Condition;

// ─── Math primitives ─────────────────────────────────────────────────

/// Lanczos approximation for ln(Gamma(x)), g=7, n=9.
fn ln_gamma(x: f64) -> f64 {
    #[allow(clippy::excessive_precision)]
    const COEFFICIENTS: [f64; 9] = [
        0.99999999999980993,
        676.5203681218851,
        -1259.1392167224028,
        771.32342877765313,
        -176.61502916214059,
        12.507343278686905,
        -0.13857109526572012,
        9.9843695780195716e-6,
        1.5056327351493116e-7,
    ];
    const G: f64 = 7.0;

    if x < 0.5 {
        // Reflection formula: Gamma(x) * Gamma(1-x) = pi / sin(pi*x)
        let log_pi = std::f64::consts::PI.ln();
        let sin_val = (std::f64::consts::PI * x).sin();
        if sin_val.abs() < 1e-300 {
            return f64::INFINITY;
        }
        return log_pi - sin_val.abs().ln() - ln_gamma(1.0 - x);
    }

    let x = x - 1.0;
    let mut sum = COEFFICIENTS[0];
    for (i, &c) in COEFFICIENTS.iter().enumerate().skip(1) {
        sum += c / (x + i as f64);
    }

    let t = x + G + 0.5;
    let log_sqrt_2pi = (2.0 * std::f64::consts::PI).sqrt().ln();

    log_sqrt_2pi + (t.ln() * (x + 0.5)) - t + sum.ln()
}

/// Regularized incomplete beta function I_x(a, b) via the Lentz continued
/// fraction.
fn regularized_incomplete_beta(a: f64, b: f64, x: f64) -> f64 {
    if !(0.0..=1.0).contains(&x) {
        return f64::NAN;
    }
    if x == 0.0 {
        return 0.0;
    }
    if x == 1.0 {
        return 1.0;
    }

    // Symmetry relation for better convergence
    if x > (a + 1.0) / (a + b + 2.0) {
        return 1.0 - regularized_incomplete_beta(b, a, 1.0 - x);
    }

    let ln_prefix =
        a * x.ln() + b * (1.0 - x).ln() - ln_gamma(a) - ln_gamma(b) + ln_gamma(a + b) - a.ln();
    let prefix = ln_prefix.exp();

    let max_iter = 200;
    let epsilon = 1e-14;
    let tiny = 1e-30;

    let mut c = 1.0_f64;
    let mut d = 1.0 - (a + b) * x / (a + 1.0);
    if d.abs() < tiny {
        d = tiny;
    }
    d = 1.0 / d;
    let mut f = d;

    for m in 1..=max_iter {
        let m_f64 = m as f64;

        let numerator_even =
            m_f64 * (b - m_f64) * x / ((a + 2.0 * m_f64 - 1.0) * (a + 2.0 * m_f64));
        d = 1.0 + numerator_even * d;
        if d.abs() < tiny {
            d = tiny;
        }
        c = 1.0 + numerator_even / c;
        if c.abs() < tiny {
            c = tiny;
        }
        d = 1.0 / d;
        f *= c * d;

        let numerator_odd =
            -((a + m_f64) * (a + b + m_f64) * x) / ((a + 2.0 * m_f64) * (a + 2.0 * m_f64 + 1.0));
        d = 1.0 + numerator_odd * d;
        if d.abs() < tiny {
            d = tiny;
        }
        c = 1.0 + numerator_odd / c;
        if c.abs() < tiny {
            c = tiny;
        }
        d = 1.0 / d;
        let delta = c * d;
        f *= delta;

        if (delta - 1.0).abs() < epsilon {
            break;
        }
    }

    prefix * f
}

/// Student's t-distribution CDF: P(T <= t) for df degrees of freedom.
pub fn t_cdf(t: f64, df: f64) -> f64 {
    if df <= 0.0 {
        return f64::NAN;
    }
    if t == 0.0 {
        return 0.5;
    }

    let x = df / (df + t * t);
    let ib = regularized_incomplete_beta(df / 2.0, 0.5, x);

    if t > 0.0 {
        1.0 - 0.5 * ib
    } else {
        0.5 * ib
    }
}

// ─── Welch's t-test ──────────────────────────────────────────────────

/// Invalid input to a statistical routine. Statistics operate on
/// already-validated collections, so these raise instead of being absorbed.
#[derive(Debug, Error, PartialEq)]
pub enum StatsError {
    #[error("sample has {0} values; at least 2 required")]
    TooFewSamples(usize),
    #[error("sample contains a non-finite value: {0}")]
    NonFinite(f64),
}

/// Result of a two-sided Welch t-test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WelchTest {
    pub t_statistic: f64,
    /// Two-sided p-value.
    pub p_value: f64,
    /// Welch–Satterthwaite degrees of freedom.
    pub df: f64,
    pub mean_left: f64,
    pub mean_right: f64,
}

/// Welch two-sample t-test: H0: means equal, unequal variances allowed.
pub fn welch_t_test(left: &[f64], right: &[f64]) -> Result<WelchTest, StatsError> {
    for sample in [left, right] {
        if sample.len() < 2 {
            return Err(StatsError::TooFewSamples(sample.len()));
        }
        if let Some(&bad) = sample.iter().find(|v| !v.is_finite()) {
            return Err(StatsError::NonFinite(bad));
        }
    }

    let (n_l, n_r) = (left.len() as f64, right.len() as f64);
    let mean_left = left.iter().sum::<f64>() / n_l;
    let mean_right = right.iter().sum::<f64>() / n_r;
    let var_left = left.iter().map(|&x| (x - mean_left).powi(2)).sum::<f64>() / (n_l - 1.0);
    let var_right = right.iter().map(|&x| (x - mean_right).powi(2)).sum::<f64>() / (n_r - 1.0);

    let se_sq = var_left / n_l + var_right / n_r;

    if se_sq < 1e-30 {
        // Both samples constant: the test degenerates
        let (t_statistic, p_value) = if (mean_left - mean_right).abs() < 1e-15 {
            (0.0, 1.0)
        } else if mean_left > mean_right {
            (f64::INFINITY, 0.0)
        } else {
            (f64::NEG_INFINITY, 0.0)
        };
        return Ok(WelchTest {
            t_statistic,
            p_value,
            df: n_l + n_r - 2.0,
            mean_left,
            mean_right,
        });
    }

    let t_statistic = (mean_left - mean_right) / se_sq.sqrt();

    // Welch–Satterthwaite degrees of freedom
    let df = se_sq.powi(2)
        / ((var_left / n_l).powi(2) / (n_l - 1.0) + (var_right / n_r).powi(2) / (n_r - 1.0));

    let p_value = 2.0 * (1.0 - t_cdf(t_statistic.abs(), df));

    Ok(WelchTest {
        t_statistic,
        p_value,
        df,
        mean_left,
        mean_right,
    })
}

// ─── Pairwise comparison with BH adjustment ──────────────────────────

/// One condition pair's test, with its family-adjusted p-value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairwiseComparison {
    pub left: Condition,
    pub right: Condition,
    pub test: WelchTest,
    pub adjusted_p: f64,
    pub significant: bool,
}

/// Welch tests over all condition pairs, Benjamini–Hochberg adjusted at
/// `alpha`. Conditions with fewer than two subjects are skipped.
pub fn pairwise_welch(
    samples: &BTreeMap<Condition, Vec<f64>>,
    alpha: f64,
) -> Result<Vec<PairwiseComparison>, StatsError> {
    let conditions: Vec<Condition> = Condition::ALL
        .into_iter()
        .filter(|c| samples.get(c).is_some_and(|s| s.len() >= 2))
        .collect();

    let mut tests = Vec::new();
    for (i, &left) in conditions.iter().enumerate() {
        for &right in &conditions[i + 1..] {
            let test = welch_t_test(&samples[&left], &samples[&right])?;
            tests.push((left, right, test));
        }
    }

    // Benjamini–Hochberg step-up over the pair family
    let m = tests.len();
    let mut order: Vec<usize> = (0..m).collect();
    order.sort_by(|&a, &b| {
        tests[a]
            .2
            .p_value
            .partial_cmp(&tests[b].2.p_value)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut adjusted = vec![0.0_f64; m];
    let mut running = 1.0_f64;
    for rank in (0..m).rev() {
        let idx = order[rank];
        let corrected = tests[idx].2.p_value * m as f64 / (rank + 1) as f64;
        running = running.min(corrected).min(1.0);
        adjusted[idx] = running;
    }

    Ok(tests
        .into_iter()
        .enumerate()
        .map(|(i, (left, right, test))| PairwiseComparison {
            left,
            right,
            test,
            adjusted_p: adjusted[i],
            significant: adjusted[i] <= alpha,
        })
        .collect())
}
