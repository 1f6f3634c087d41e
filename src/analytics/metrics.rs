// Result aggregation
//
// Folds per-trial lineup results into the aggregate statistics returned
// to the caller. The aggregator is order-independent: trials may arrive
// in any order, and all sums run over sorted vectors so the floating
// point result is identical for identical trial sets.

use crate::models::contest::Contest;
use crate::simulators::trial::TrialOutcome;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Nearest-rank quantiles of the score distribution
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Quantiles {
    pub p25: f64,
    pub p75: f64,
    pub p90: f64,
    pub p95: f64,
    pub p99: f64,
}

/// Fraction of trials finishing inside each percentile bucket, in [0, 100]
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FinishBuckets {
    /// Finished in the top 1% of the contest
    pub top1: f64,
    /// Top 10%
    pub top10: f64,
    /// Top 20%
    pub top20: f64,
    /// Top 50%
    pub top50: f64,
}

/// Aggregated simulation result for one user lineup
///
/// All probabilities and rates are percentages in [0, 100].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LineupResult {
    /// Index of the lineup in the request
    pub lineup_index: usize,
    /// Trials that contributed to these statistics
    pub trials: usize,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation (divisor T-1)
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub quantiles: Quantiles,
    pub finish_buckets: FinishBuckets,
    /// Probability of finishing rank 1
    pub win_probability: f64,
    /// Probability of finishing at or above the cash line
    pub cash_probability: f64,
    /// (mean payout - entry fee) / entry fee * 100; 0 when the fee is 0
    pub roi: f64,
}

/// Per-lineup accumulation state
#[derive(Debug, Default)]
struct LineupAccumulator {
    scores: Vec<f64>,
    ranks: Vec<usize>,
    payouts: Vec<f64>,
}

/// Streaming consumer of trial outcomes
#[derive(Debug)]
pub struct ResultAggregator {
    accumulators: Vec<LineupAccumulator>,
}

impl ResultAggregator {
    pub fn new(user_count: usize) -> Self {
        ResultAggregator {
            accumulators: (0..user_count).map(|_| LineupAccumulator::default()).collect(),
        }
    }

    /// Record one trial's results
    pub fn record(&mut self, outcome: &TrialOutcome) {
        for result in &outcome.results {
            let acc = &mut self.accumulators[result.lineup_index];
            acc.scores.push(result.score);
            acc.ranks.push(result.rank);
            acc.payouts.push(result.payout);
        }
    }

    /// Trials recorded so far
    pub fn trials_recorded(&self) -> usize {
        self.accumulators
            .first()
            .map(|acc| acc.scores.len())
            .unwrap_or(0)
    }

    /// Compute final statistics for every lineup
    ///
    /// `entrants` is the roster count actually ranked per trial (user
    /// lineups plus the constructed field).
    pub fn finalize(self, contest: &Contest, entrants: usize) -> Vec<LineupResult> {
        self.accumulators
            .into_iter()
            .enumerate()
            .map(|(index, acc)| finalize_lineup(index, acc, contest, entrants))
            .collect()
    }
}

fn finalize_lineup(
    lineup_index: usize,
    acc: LineupAccumulator,
    contest: &Contest,
    entrants: usize,
) -> LineupResult {
    let trials = acc.scores.len();
    if trials == 0 {
        return LineupResult {
            lineup_index,
            ..LineupResult::default()
        };
    }
    let t = trials as f64;

    let mut sorted = acc.scores;
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let quantile = |p: f64| {
        let index = (p / 100.0 * (trials - 1) as f64).round() as usize;
        sorted[index]
    };

    let mean = (&sorted).mean();
    let std_dev = if trials > 1 { (&sorted).std_dev() } else { 0.0 };

    // Finish buckets count percentile-of-field finishes
    let entrant_count = entrants as f64;
    let mut bucket_counts = [0usize; 4];
    for &rank in &acc.ranks {
        let percentile = rank as f64 / entrant_count * 100.0;
        if percentile <= 1.0 {
            bucket_counts[0] += 1;
        }
        if percentile <= 10.0 {
            bucket_counts[1] += 1;
        }
        if percentile <= 20.0 {
            bucket_counts[2] += 1;
        }
        if percentile <= 50.0 {
            bucket_counts[3] += 1;
        }
    }

    let wins = acc.ranks.iter().filter(|&&r| r == 1).count();
    let cash_line = contest.cash_line(entrants);
    let cashes = acc
        .ranks
        .iter()
        .filter(|&&r| r as f64 <= cash_line)
        .count();

    // Sorted before summing so the mean payout is order-independent
    let mut payouts = acc.payouts;
    payouts.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mean_payout = payouts.iter().sum::<f64>() / t;
    let roi = if contest.entry_fee > 0.0 {
        (mean_payout - contest.entry_fee) / contest.entry_fee * 100.0
    } else {
        0.0
    };

    LineupResult {
        lineup_index,
        trials,
        mean,
        median: quantile(50.0),
        std_dev,
        min: sorted[0],
        max: sorted[trials - 1],
        quantiles: Quantiles {
            p25: quantile(25.0),
            p75: quantile(75.0),
            p90: quantile(90.0),
            p95: quantile(95.0),
            p99: quantile(99.0),
        },
        finish_buckets: FinishBuckets {
            top1: bucket_counts[0] as f64 / t * 100.0,
            top10: bucket_counts[1] as f64 / t * 100.0,
            top20: bucket_counts[2] as f64 / t * 100.0,
            top50: bucket_counts[3] as f64 / t * 100.0,
        },
        win_probability: wins as f64 / t * 100.0,
        cash_probability: cashes as f64 / t * 100.0,
        roi,
    }
}
