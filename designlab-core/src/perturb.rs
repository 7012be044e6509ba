//! Perturbation sampling for the robustness sweep.
//!
//! Each probabilistic variable draws a multiplicative factor from a truncated
//! normal: mean 1, standard deviation `tolerance_pct / 300`, support clipped
//! to ±3 standard deviations. With that spread, the declared tolerance
//! percentage is the half-width of the factor's support around 1.

use rand::Rng;

/// Normal distribution with hard-clipped support, sampled by rejection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TruncatedNormal {
    mean: f64,
    std_dev: f64,
    max_sigmas: f64,
}

impl TruncatedNormal {
    /// Clip at ±3σ.
    pub fn new(mean: f64, std_dev: f64) -> Self {
        Self {
            mean,
            std_dev,
            max_sigmas: 3.0,
        }
    }

    /// The sweep's multiplicative-factor distribution for a declared
    /// tolerance percentage: mean 1, σ = tolerance_pct / 300.
    pub fn for_tolerance(tolerance_pct: f64) -> Self {
        Self::new(1.0, tolerance_pct / 300.0)
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn std_dev(&self) -> f64 {
        self.std_dev
    }

    /// Draw one value. Standard normals come from a Box–Muller transform;
    /// draws beyond the clip are rejected and retried, which preserves the
    /// normal shape inside the support (unlike clamping, which would pile
    /// mass at the edges).
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.std_dev == 0.0 {
            return self.mean;
        }
        loop {
            let u1: f64 = rng.gen_range(f64::MIN_POSITIVE..1.0);
            let u2: f64 = rng.gen();
            let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
            if z.abs() <= self.max_sigmas {
                return self.mean + self.std_dev * z;
            }
        }
    }
}
