// Player model and per-player score distribution
//
// Each player carries a projection triple (floor, mean, ceiling) that is
// wrapped into a ScoreDistribution at simulation setup. Shape selection
// uses the coefficient of variation: low-variance players draw from a
// truncated normal, high-variance players from a beta-like distribution
// with a realistic right tail.

use crate::math::distributions::{beta_scaled, four_sigma_std_dev, truncated_normal};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Coefficient-of-variation threshold between the normal and beta shapes.
const SHAPE_CV_THRESHOLD: f64 = 0.5;

/// DNP probability for a player flagged as injured.
const INJURY_PROB_FLAGGED: f64 = 0.25;
/// DNP probability for a player with a non-empty injury status string.
const INJURY_PROB_STATUS: f64 = 0.10;
/// Baseline DNP probability for every player.
const INJURY_PROB_BASELINE: f64 = 0.01;

/// A player available in the contest pool
///
/// Immutable for the duration of a simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Unique player identifier
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Salary in contest dollars
    pub salary: u32,
    /// Roster position (sport-specific, e.g. "QB", "G", "P")
    pub position: String,
    /// Projected fantasy points (mean)
    pub projected_points: f64,
    /// Floor projection (~5th percentile)
    pub floor: f64,
    /// Ceiling projection (~95th percentile)
    pub ceiling: f64,
    /// Public ownership hint; 0 means absent, values above 1 are percents
    #[serde(default)]
    pub ownership_hint: f64,
    /// Whether the player is flagged injured
    #[serde(default)]
    pub injured: bool,
    /// Injury status string ("Q", "GTD", ...), empty when healthy
    #[serde(default)]
    pub injury_status: String,
    /// Sport tag ("nfl", "nba", ...)
    #[serde(default)]
    pub sport: String,
}

impl Player {
    /// Projected points per salary dollar
    pub fn value_density(&self) -> f64 {
        if self.salary == 0 {
            return 0.0;
        }
        self.projected_points / self.salary as f64
    }

    /// Ownership hint as a fraction in [0, 1]
    ///
    /// Hints above 1 are treated as percents and divided by 100.
    pub fn ownership_hint_fraction(&self) -> f64 {
        if self.ownership_hint > 1.0 {
            self.ownership_hint / 100.0
        } else {
            self.ownership_hint
        }
    }
}

/// Hook for sport-specific score adjustments
///
/// Applied after the base sample; the result is clamped to >= 0 by the
/// caller. The shipped default is the identity.
pub trait SportAdjuster: Send + Sync {
    fn adjust(&self, player: &Player, score: f64) -> f64;
}

/// The identity adjustment: scores pass through unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityAdjuster;

impl SportAdjuster for IdentityAdjuster {
    fn adjust(&self, _player: &Player, score: f64) -> f64 {
        score
    }
}

/// Sampler producing one fantasy score per call for a single player
///
/// Constructed once at simulation setup and shared read-only across
/// workers; `sample` takes the caller's RNG so draws stay deterministic
/// under a seeded stream.
#[derive(Debug, Clone)]
pub struct ScoreDistribution {
    pub mean: f64,
    pub std_dev: f64,
    pub floor: f64,
    pub ceiling: f64,
    /// Probability the player scores exactly 0 (did not play)
    pub injury_probability: f64,
}

impl ScoreDistribution {
    /// Build the distribution for a player
    ///
    /// # Example
    /// ```
    /// use dfs_contest_simulator::models::player::{Player, ScoreDistribution};
    ///
    /// let player = Player {
    ///     id: "p1".to_string(),
    ///     name: String::new(),
    ///     salary: 5000,
    ///     position: "G".to_string(),
    ///     projected_points: 20.0,
    ///     floor: 10.0,
    ///     ceiling: 30.0,
    ///     ownership_hint: 0.0,
    ///     injured: false,
    ///     injury_status: String::new(),
    ///     sport: "nba".to_string(),
    /// };
    /// let dist = ScoreDistribution::for_player(&player);
    /// assert_eq!(dist.std_dev, 5.0);
    /// assert_eq!(dist.injury_probability, 0.01);
    /// ```
    pub fn for_player(player: &Player) -> Self {
        ScoreDistribution {
            mean: player.projected_points,
            std_dev: four_sigma_std_dev(player.floor, player.ceiling),
            floor: player.floor,
            ceiling: player.ceiling,
            injury_probability: Self::injury_probability_for(player),
        }
    }

    /// DNP probability from the player's injury markers
    pub fn injury_probability_for(player: &Player) -> f64 {
        if player.injured {
            INJURY_PROB_FLAGGED
        } else if !player.injury_status.is_empty() {
            INJURY_PROB_STATUS
        } else {
            INJURY_PROB_BASELINE
        }
    }

    /// Coefficient of variation used for shape selection
    pub fn coefficient_of_variation(&self) -> f64 {
        if self.mean <= 0.0 {
            return 0.0;
        }
        self.std_dev / self.mean
    }

    /// Draw one fantasy score
    ///
    /// The injury gate fires first: with probability `injury_probability`
    /// the sample is 0. Otherwise the score comes from a truncated normal
    /// (CV <= 0.5) on [0.8*floor, 1.2*ceiling] or a beta-like shape
    /// (CV > 0.5) on [0, 1.2*ceiling]. The result is never negative.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if rng.gen::<f64>() < self.injury_probability {
            return 0.0;
        }
        if self.mean <= 0.0 {
            return 0.0;
        }
        if self.std_dev <= f64::EPSILON {
            return self.mean;
        }

        let raw = if self.coefficient_of_variation() <= SHAPE_CV_THRESHOLD {
            truncated_normal(
                rng,
                self.mean,
                self.std_dev,
                0.8 * self.floor,
                1.2 * self.ceiling,
            )
        } else {
            let alpha = (self.mean * self.mean) / (self.std_dev * self.std_dev);
            let beta = alpha * (self.ceiling / self.mean - 1.0);
            beta_scaled(rng, alpha, beta, 1.2 * self.ceiling)
        };

        raw.max(0.0)
    }
}
