//! Field Constructor
//!
//! Synthesizes the opponent field: K rosters built by ownership-weighted
//! selection, position slot by position slot, under the salary cap. Each
//! roster retries up to a fixed limit; rosters that never fill are
//! skipped, so the field may come up short of K (the caller proceeds with
//! the smaller field). Construction runs once per simulation, before any
//! trial, and each roster draws from its own seeded stream so the field
//! is identical for a given master seed.

use crate::math::seeding;
use crate::models::contest::Contest;
use crate::models::lineup::{Lineup, LineupKind};
use crate::models::player::Player;
use log::warn;
use rand::Rng;
use rayon::prelude::*;
use std::collections::HashMap;

/// Whole-roster retry budget before a field roster is skipped.
const ROSTER_RETRY_LIMIT: usize = 100;

/// Candidates for one position: (pool index, ownership weight)
type PositionIndex = HashMap<String, Vec<(usize, f64)>>;

/// Build up to `target` field rosters
///
/// # Arguments
/// * `pool` - The player pool
/// * `ownership` - Ownership fractions keyed by player id
/// * `contest` - Cap and position requirements
/// * `target` - Desired field size
/// * `master_seed` - Seed for the per-roster streams
///
/// # Returns
/// The constructed rosters, possibly fewer than `target`
pub fn build_field(
    pool: &[Player],
    ownership: &HashMap<String, f64>,
    contest: &Contest,
    target: usize,
    master_seed: u64,
) -> Vec<Lineup> {
    let mut by_position: PositionIndex = HashMap::new();
    for (idx, player) in pool.iter().enumerate() {
        let weight = ownership.get(&player.id).copied().unwrap_or(0.0);
        by_position
            .entry(player.position.clone())
            .or_default()
            .push((idx, weight));
    }

    let rosters: Vec<Lineup> = (0..target)
        .into_par_iter()
        .filter_map(|index| {
            let mut rng = seeding::field_rng(master_seed, index);
            build_roster(pool, &by_position, contest, &mut rng)
        })
        .collect();

    if rosters.len() < target {
        warn!(
            "field constructor produced {} of {} rosters; continuing with a smaller field",
            rosters.len(),
            target
        );
    }
    rosters
}

/// Attempt one roster, retrying from scratch on any unfillable slot
fn build_roster<R: Rng + ?Sized>(
    pool: &[Player],
    by_position: &PositionIndex,
    contest: &Contest,
    rng: &mut R,
) -> Option<Lineup> {
    'attempt: for _ in 0..ROSTER_RETRY_LIMIT {
        let mut used = vec![false; pool.len()];
        let mut remaining_cap = contest.salary_cap;
        let mut picks = Vec::with_capacity(contest.roster_size());

        // BTreeMap iteration gives a deterministic slot-fill order
        for (position, &count) in &contest.roster_requirements {
            let candidates = match by_position.get(position.as_str()) {
                Some(c) => c,
                None => continue 'attempt,
            };
            for _ in 0..count {
                let Some(idx) = weighted_pick(candidates, &used, remaining_cap, pool, rng)
                else {
                    continue 'attempt;
                };
                used[idx] = true;
                remaining_cap -= pool[idx].salary;
                picks.push(pool[idx].clone());
            }
        }

        return Some(Lineup::new(picks, LineupKind::Field));
    }
    None
}

/// Weighted random selection over unused players that fit the cap
///
/// Ties in weight resolve by first appearance; if the draw lands beyond
/// the cumulative sum (or every weight is zero), the last eligible player
/// is taken.
fn weighted_pick<R: Rng + ?Sized>(
    candidates: &[(usize, f64)],
    used: &[bool],
    remaining_cap: u32,
    pool: &[Player],
    rng: &mut R,
) -> Option<usize> {
    let eligible: Vec<(usize, f64)> = candidates
        .iter()
        .filter(|(idx, _)| !used[*idx] && pool[*idx].salary <= remaining_cap)
        .copied()
        .collect();
    if eligible.is_empty() {
        return None;
    }

    let total: f64 = eligible.iter().map(|(_, w)| w).sum();
    let draw = rng.gen::<f64>() * total;

    let mut cumulative = 0.0;
    for &(idx, weight) in &eligible {
        cumulative += weight;
        if draw < cumulative {
            return Some(idx);
        }
    }
    eligible.last().map(|&(idx, _)| idx)
}
