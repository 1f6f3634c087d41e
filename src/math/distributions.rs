// Statistical distributions for fantasy score sampling
//
// Implements:
// - Four-sigma heuristic mapping floor/ceiling projections to a std dev
// - Truncated normal sampling (rejection) for low-variance players
// - Beta-like sampling via two gamma draws for high-variance players

use rand::Rng;
use rand_distr::{Distribution, Gamma, Normal};

/// Shape parameters below this are floored to keep `Gamma::new` valid.
const MIN_GAMMA_SHAPE: f64 = 1e-3;

/// Rejection attempts before falling back to a clamped mean.
const MAX_REJECTION_ATTEMPTS: usize = 100;

/// Estimate a standard deviation from floor and ceiling projections
///
/// Uses the four-sigma heuristic: the floor and ceiling approximate the
/// 5th and 95th percentiles, so the span covers roughly four standard
/// deviations.
///
/// # Arguments
/// * `floor` - Floor projection (~5th percentile)
/// * `ceiling` - Ceiling projection (~95th percentile)
///
/// # Returns
/// Estimated standard deviation, never negative
///
/// # Example
/// ```
/// use dfs_contest_simulator::math::distributions::four_sigma_std_dev;
/// let sigma = four_sigma_std_dev(10.0, 30.0);
/// assert_eq!(sigma, 5.0);
/// ```
pub fn four_sigma_std_dev(floor: f64, ceiling: f64) -> f64 {
    ((ceiling - floor) / 4.0).max(0.0)
}

/// Sample from a normal distribution truncated to [lo, hi]
///
/// Rejection sampling: draw from N(mean, std_dev²) until the sample lands
/// inside the bounds. If the bounds reject every attempt (pathological
/// inputs), the mean clamped into [lo, hi] is returned.
///
/// # Arguments
/// * `rng` - Random number generator
/// * `mean` - The mean (μ) of the distribution
/// * `std_dev` - The standard deviation (σ) of the distribution
/// * `lo` - Lower truncation bound
/// * `hi` - Upper truncation bound
pub fn truncated_normal<R: Rng + ?Sized>(
    rng: &mut R,
    mean: f64,
    std_dev: f64,
    lo: f64,
    hi: f64,
) -> f64 {
    if hi <= lo {
        return mean.clamp(lo.min(hi), hi.max(lo));
    }

    let normal = Normal::new(mean, std_dev).unwrap();
    for _ in 0..MAX_REJECTION_ATTEMPTS {
        let sample = normal.sample(rng);
        if sample >= lo && sample <= hi {
            return sample;
        }
    }

    mean.clamp(lo, hi)
}

/// Sample from a beta-like distribution scaled to [0, scale]
///
/// Uses the gamma-ratio construction: with X ~ Gamma(α, 1) and
/// Y ~ Gamma(β, 1), X / (X + Y) ~ Beta(α, β). The gamma sampler is
/// Marsaglia-Tsang squeeze with the shape<1 boost.
///
/// # Arguments
/// * `rng` - Random number generator
/// * `alpha` - First shape parameter (floored at 1e-3)
/// * `beta` - Second shape parameter (floored at 1e-3)
/// * `scale` - Upper bound of the support
///
/// # Returns
/// A sample in [0, scale]
pub fn beta_scaled<R: Rng + ?Sized>(rng: &mut R, alpha: f64, beta: f64, scale: f64) -> f64 {
    let alpha = alpha.max(MIN_GAMMA_SHAPE);
    let beta = beta.max(MIN_GAMMA_SHAPE);

    let x = Gamma::new(alpha, 1.0).unwrap().sample(rng);
    let y = Gamma::new(beta, 1.0).unwrap().sample(rng);

    let denom = x + y;
    if denom <= 0.0 {
        return 0.0;
    }

    (x / denom) * scale
}
