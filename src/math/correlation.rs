// Pairwise player correlation
//
// Stores symmetric correlation coefficients keyed on the pool's native
// player identifiers and applies a first-order linear perturbation to a
// map of independently drawn scores. The matrix is treated as a
// perturbation weight, not a Gaussian covariance, so it does not need to
// be positive semi-definite.

use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Fraction of a player's mean moved per unit of correlated deviation.
const PERTURBATION_WEIGHT: f64 = 0.1;

/// One configured correlation coefficient between two players
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationEntry {
    pub player_a: String,
    pub player_b: String,
    pub rho: f64,
}

/// Per-player clamp data for the perturbation pass
///
/// `cap` is 1.2x the ceiling when a ceiling is known, else 1.8x the mean.
#[derive(Debug, Clone, Copy)]
pub struct ScoreBounds {
    pub mean: f64,
    pub cap: f64,
}

impl ScoreBounds {
    pub fn new(mean: f64, ceiling: f64) -> Self {
        let cap = if ceiling > 0.0 {
            1.2 * ceiling
        } else {
            1.8 * mean
        };
        ScoreBounds { mean, cap }
    }
}

/// Symmetric sparse correlation matrix keyed by player identifier
///
/// Lookup returns 1.0 on the diagonal and 0.0 for unconfigured pairs.
#[derive(Debug, Clone, Default)]
pub struct CorrelationMatrix {
    pairs: HashMap<(String, String), f64>,
    neighbors: HashMap<String, Vec<(String, f64)>>,
}

impl CorrelationMatrix {
    /// Build a matrix from a flat list of coefficient triples
    ///
    /// Coefficients outside [-1, 1] are clamped with a warning. Self-pairs
    /// are ignored (the diagonal is implicitly 1). When the same pair is
    /// supplied twice, the last entry wins.
    pub fn from_entries(entries: &[CorrelationEntry]) -> Self {
        let mut matrix = CorrelationMatrix::default();
        for entry in entries {
            if entry.player_a == entry.player_b {
                continue;
            }
            let mut rho = entry.rho;
            if !(-1.0..=1.0).contains(&rho) {
                warn!(
                    "correlation rho {} for ({}, {}) out of [-1, 1], clamping",
                    rho, entry.player_a, entry.player_b
                );
                rho = rho.clamp(-1.0, 1.0);
            }
            matrix.insert(&entry.player_a, &entry.player_b, rho);
        }
        matrix
    }

    fn insert(&mut self, a: &str, b: &str, rho: f64) {
        let key = Self::pair_key(a, b);
        if self.pairs.insert(key, rho).is_some() {
            // Re-supplied pair: rebuild that edge in both adjacency lists
            for (id, other) in [(a, b), (b, a)] {
                if let Some(list) = self.neighbors.get_mut(id) {
                    list.retain(|(n, _)| n != other);
                }
            }
        }
        self.neighbors
            .entry(a.to_string())
            .or_default()
            .push((b.to_string(), rho));
        self.neighbors
            .entry(b.to_string())
            .or_default()
            .push((a.to_string(), rho));
    }

    fn pair_key(a: &str, b: &str) -> (String, String) {
        if a <= b {
            (a.to_string(), b.to_string())
        } else {
            (b.to_string(), a.to_string())
        }
    }

    /// Correlation coefficient between two players
    pub fn get(&self, a: &str, b: &str) -> f64 {
        if a == b {
            return 1.0;
        }
        let key = Self::pair_key(a, b);
        self.pairs.get(&key).copied().unwrap_or(0.0)
    }

    /// Number of configured (off-diagonal) pairs
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Configured partners of a player, with coefficients
    pub fn neighbors(&self, id: &str) -> &[(String, f64)] {
        self.neighbors.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Apply the first-order linear perturbation to a base score map
    ///
    /// For each player i:
    ///   adjusted_i = base_i + sum_j rho_ij * ((base_j - mu_j) / mu_j) * mu_i * 0.1
    /// then clamped to [0, cap_i]. Players with mu_j = 0 contribute
    /// nothing (no correlation propagation from a zeroed-out player).
    ///
    /// Each adjustment reads only base scores, so the output is
    /// independent of iteration order.
    pub fn perturb(
        &self,
        base: &HashMap<String, f64>,
        bounds: &HashMap<String, ScoreBounds>,
    ) -> HashMap<String, f64> {
        let mut adjusted = HashMap::with_capacity(base.len());
        for (id, &score) in base {
            let Some(own) = bounds.get(id) else {
                adjusted.insert(id.clone(), score);
                continue;
            };

            let mut delta = 0.0;
            for (other, rho) in self.neighbors(id) {
                let (Some(&other_score), Some(other_bounds)) =
                    (base.get(other), bounds.get(other))
                else {
                    continue;
                };
                if other_bounds.mean <= 0.0 {
                    continue;
                }
                let deviation = (other_score - other_bounds.mean) / other_bounds.mean;
                delta += rho * deviation * own.mean * PERTURBATION_WEIGHT;
            }

            adjusted.insert(id.clone(), (score + delta).clamp(0.0, own.cap));
        }
        adjusted
    }
}
