//! Ownership Model
//!
//! Generates a per-player ownership fraction used to weight field roster
//! construction. The model is heuristic: within each position, players
//! are ranked by value density (projected points per salary dollar) and
//! assigned tiered base ownership skewed by contest type, plus uniform
//! noise. A public ownership hint on a player always wins.

use crate::models::contest::ContestType;
use crate::models::player::Player;
use rand::Rng;
use std::collections::{BTreeMap, HashMap};

/// Lower bound of generated ownership.
pub const MIN_OWNERSHIP: f64 = 0.01;
/// Upper bound of generated ownership.
pub const MAX_OWNERSHIP: f64 = 0.50;

/// Base ownership for a rank percentile within a position group
///
/// `percentile` is rank / group size with rank starting at 0, so the
/// top-ranked player in a group sits at 0.0.
fn base_ownership(contest_type: ContestType, percentile: f64) -> f64 {
    match contest_type {
        ContestType::Tournament => {
            if percentile < 0.1 {
                0.30 - 0.8 * percentile
            } else if percentile < 0.3 {
                0.20 - 0.4 * percentile
            } else if percentile < 0.6 {
                0.10 - 0.1 * percentile
            } else {
                0.02
            }
        }
        ContestType::Cash => {
            if percentile < 0.2 {
                0.40 - 0.5 * percentile
            } else if percentile < 0.5 {
                0.20 - 0.2 * percentile
            } else {
                0.05
            }
        }
    }
}

/// Generate ownership fractions for a player pool
///
/// Outputs are fractions in [0.01, 0.50] unless a player carries a public
/// ownership hint, which is used verbatim (converted from percent when
/// above 1). The sum within a position may exceed 1: each roster slot is
/// drawn independently.
///
/// # Arguments
/// * `pool` - The player pool
/// * `contest_type` - Cash or tournament skew
/// * `rng` - Seeded noise stream
///
/// # Returns
/// Map of player id -> ownership fraction
pub fn generate_ownership<R: Rng + ?Sized>(
    pool: &[Player],
    contest_type: ContestType,
    rng: &mut R,
) -> HashMap<String, f64> {
    // Group by position; BTreeMap keeps the noise-draw order stable
    let mut by_position: BTreeMap<&str, Vec<&Player>> = BTreeMap::new();
    for player in pool {
        by_position.entry(&player.position).or_default().push(player);
    }

    let mut ownership = HashMap::with_capacity(pool.len());
    for group in by_position.values_mut() {
        // Sort by value density descending; stable sort keeps ties in
        // input order
        group.sort_by(|a, b| {
            b.value_density()
                .partial_cmp(&a.value_density())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let size = group.len() as f64;
        for (rank, player) in group.iter().enumerate() {
            let percentile = rank as f64 / size;
            let base = base_ownership(contest_type, percentile);
            let noise = rng.gen_range(-0.05..0.05);
            let mut fraction = (base + noise).clamp(MIN_OWNERSHIP, MAX_OWNERSHIP);

            if player.ownership_hint > 0.0 {
                fraction = player.ownership_hint_fraction();
            }
            ownership.insert(player.id.clone(), fraction);
        }
    }

    ownership
}
