// Contest configuration and payout schedules
//
// A contest is either a cash game (flat double-up payout to roughly the
// top half) or a tournament (top-heavy tiered payouts). The payout
// schedule is precomputed before trials begin; lookup is rank -> prize.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Contest format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContestType {
    /// Double-up style: top ~50% win a flat multiple of the entry fee
    Cash,
    /// Guaranteed prize pool: tiered, top-heavy payouts
    Tournament,
}

/// Contest parameters
///
/// Position requirements use a BTreeMap so slot-fill order is
/// deterministic across runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contest {
    /// Entry fee in dollars
    pub entry_fee: f64,
    /// Total entries in the contest
    pub total_entries: usize,
    /// Salary cap per roster
    pub salary_cap: u32,
    /// Position -> required slot count; the sum is the roster size
    pub roster_requirements: BTreeMap<String, usize>,
    /// Contest format
    pub contest_type: ContestType,
    /// Total prize pool in dollars
    #[serde(default)]
    pub prize_pool: f64,
}

impl Contest {
    /// Roster size implied by the position requirements
    pub fn roster_size(&self) -> usize {
        self.roster_requirements.values().sum()
    }

    /// The worst rank that still earns a prize, for `entrants` rosters
    ///
    /// Top 20% in tournaments, top half in cash games, never below rank 1
    /// so degenerate single-entry contests still cash.
    pub fn cash_line(&self, entrants: usize) -> f64 {
        let n = entrants as f64;
        match self.contest_type {
            ContestType::Cash => (n / 2.0).max(1.0),
            ContestType::Tournament => (0.2 * n).max(1.0),
        }
    }
}

/// One payout tier: every rank in [min_rank, max_rank] earns `payout`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoutTier {
    pub min_rank: usize,
    pub max_rank: usize,
    pub payout: f64,
}

/// Rank-indexed payout schedule
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PayoutSchedule {
    pub tiers: Vec<PayoutTier>,
}

impl PayoutSchedule {
    pub fn from_tiers(tiers: Vec<PayoutTier>) -> Self {
        PayoutSchedule { tiers }
    }

    /// Default schedule for a contest
    ///
    /// Cash: one tier {1, max(1, N/2)} paying 1.8x the entry fee.
    /// Tournament: top-heavy tiers as fractions of the prize pool -
    /// 1st ~20%, 2-3 ~5% each, 4-10 ~2% each, 11-50 ~0.4% each, the rest
    /// of the top 20% ~0.1% each.
    pub fn default_for(contest: &Contest) -> Self {
        match contest.contest_type {
            ContestType::Cash => {
                let cash_rank = (contest.total_entries / 2).max(1);
                PayoutSchedule::from_tiers(vec![PayoutTier {
                    min_rank: 1,
                    max_rank: cash_rank,
                    payout: 1.8 * contest.entry_fee,
                }])
            }
            ContestType::Tournament => {
                let pool = contest.prize_pool;
                let cash_rank =
                    ((0.2 * contest.total_entries as f64).floor() as usize).max(1);
                let breakdown: [(usize, usize, f64); 5] = [
                    (1, 1, 0.20),
                    (2, 3, 0.05),
                    (4, 10, 0.02),
                    (11, 50, 0.004),
                    (51, cash_rank, 0.001),
                ];

                // Tiers are cut off once the pool is spent so the total
                // allocation never exceeds the prize pool.
                let mut tiers = Vec::new();
                let mut remaining = pool;
                for (lo, hi, fraction) in breakdown {
                    let hi = hi.min(cash_rank);
                    let payout = fraction * pool;
                    if lo > hi || payout <= 0.0 {
                        continue;
                    }
                    let affordable = (remaining / payout).floor() as usize;
                    if affordable == 0 {
                        break;
                    }
                    let span = (hi - lo + 1).min(affordable);
                    remaining -= payout * span as f64;
                    tiers.push(PayoutTier {
                        min_rank: lo,
                        max_rank: lo + span - 1,
                        payout,
                    });
                }
                PayoutSchedule::from_tiers(tiers)
            }
        }
    }

    /// Prize for a finishing rank
    ///
    /// Returns the payout of the first tier containing the rank, else 0.
    pub fn payout_for_rank(&self, rank: usize) -> f64 {
        for tier in &self.tiers {
            if rank >= tier.min_rank && rank <= tier.max_rank {
                return tier.payout;
            }
        }
        0.0
    }

    /// Total dollars the schedule would pay if every tier filled
    pub fn total_allocated(&self) -> f64 {
        self.tiers
            .iter()
            .map(|t| t.payout * (t.max_rank - t.min_rank + 1) as f64)
            .sum()
    }
}
