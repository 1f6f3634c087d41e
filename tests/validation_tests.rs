use dfs_contest_simulator::math::correlation::{
    CorrelationEntry, CorrelationMatrix, ScoreBounds,
};
use dfs_contest_simulator::math::seeding;
use dfs_contest_simulator::models::contest::{Contest, ContestType, PayoutSchedule, PayoutTier};
use dfs_contest_simulator::models::lineup::{Lineup, LineupKind};
use dfs_contest_simulator::models::player::{IdentityAdjuster, Player, ScoreDistribution};
use dfs_contest_simulator::simulators::engine::{
    run_simulation, SimulationParams, SimulationRequest,
};
use dfs_contest_simulator::simulators::ownership::generate_ownership;
use dfs_contest_simulator::simulators::trial::{run_trial, TrialContext};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::{BTreeMap, HashMap};

fn player(id: &str, position: &str, salary: u32, mean: f64, floor: f64, ceiling: f64) -> Player {
    Player {
        id: id.to_string(),
        name: String::new(),
        salary,
        position: position.to_string(),
        projected_points: mean,
        floor,
        ceiling,
        ownership_hint: 0.0,
        injured: false,
        injury_status: String::new(),
        sport: "nba".to_string(),
    }
}

fn guard_pool(size: usize) -> Vec<Player> {
    (0..size)
        .map(|i| {
            player(
                &format!("g{}", i),
                "G",
                4_000 + 100 * i as u32,
                15.0 + i as f64,
                8.0 + i as f64 * 0.5,
                28.0 + i as f64 * 1.5,
            )
        })
        .collect()
}

/// Property 1 and 2: per-trial ranks are a permutation of 1..=N and the
/// highest raw score holds rank 1
#[test]
fn test_ranks_are_permutation_and_ordered() {
    let pool = guard_pool(10);
    let distributions: HashMap<String, ScoreDistribution> = pool
        .iter()
        .map(|p| (p.id.clone(), ScoreDistribution::for_player(p)))
        .collect();
    let bounds: HashMap<String, ScoreBounds> = pool
        .iter()
        .map(|p| (p.id.clone(), ScoreBounds::new(p.projected_points, p.ceiling)))
        .collect();
    let rosters: Vec<Lineup> = pool
        .iter()
        .map(|p| Lineup::new(vec![p.clone()], LineupKind::User))
        .collect();
    let schedule = PayoutSchedule::from_tiers(vec![PayoutTier {
        min_rank: 1,
        max_rank: 2,
        payout: 10.0,
    }]);
    let ctx = TrialContext {
        pool: &pool,
        distributions: &distributions,
        bounds: &bounds,
        rosters: &rosters,
        user_count: rosters.len(),
        schedule: &schedule,
        matrix: None,
        adjuster: &IdentityAdjuster,
    };

    for trial in 0..500 {
        let outcome = run_trial(&ctx, trial, 1234);

        let mut ranks: Vec<usize> = outcome.results.iter().map(|r| r.rank).collect();
        ranks.sort_unstable();
        assert_eq!(ranks, (1..=10).collect::<Vec<_>>());

        let best = outcome
            .results
            .iter()
            .max_by(|a, b| a.score.partial_cmp(&b.score).unwrap())
            .unwrap();
        assert_eq!(best.rank, 1, "best score {} not rank 1", best.score);
    }
}

/// Property 3: generated ownership lies in [0.01, 0.50]; hints override
/// within [0, 1]
#[test]
fn test_ownership_bounds() {
    let mut pool = guard_pool(40);
    pool[7].ownership_hint = 0.65; // verbatim override above the model cap
    let mut rng = seeding::ownership_rng(77);
    let ownership = generate_ownership(&pool, ContestType::Tournament, &mut rng);

    for player in &pool {
        let fraction = ownership[&player.id];
        if player.ownership_hint > 0.0 {
            assert!((0.0..=1.0).contains(&fraction));
        } else {
            assert!(
                (0.01..=0.50).contains(&fraction),
                "{} ownership {} out of model bounds",
                player.id,
                fraction
            );
        }
    }
    assert_eq!(ownership["g7"], 0.65);
}

/// Property 5 and 6: quantile ordering and win <= cash on a real run
#[test]
fn test_quantile_ordering_and_win_cash_relation() {
    let request = SimulationRequest {
        params: SimulationParams {
            trials: 20_000,
            seed: Some(11),
            ..Default::default()
        },
        players: guard_pool(12),
        lineups: vec![
            vec!["g0".to_string(), "g5".to_string()],
            vec!["g10".to_string(), "g11".to_string()],
        ],
        contest: Contest {
            entry_fee: 10.0,
            total_entries: 30,
            salary_cap: 12_000,
            roster_requirements: BTreeMap::from([("G".to_string(), 2)]),
            contest_type: ContestType::Tournament,
            prize_pool: 300.0,
        },
    };

    let outcome = run_simulation(&request).unwrap();
    for result in &outcome.lineup_results {
        assert!(result.min <= result.quantiles.p25);
        assert!(result.quantiles.p25 <= result.quantiles.p75);
        assert!(result.quantiles.p75 <= result.quantiles.p90);
        assert!(result.quantiles.p90 <= result.quantiles.p95);
        assert!(result.quantiles.p95 <= result.quantiles.p99);
        assert!(result.quantiles.p99 <= result.max);
        assert!(
            result.win_probability <= result.cash_probability,
            "win {} above cash {}",
            result.win_probability,
            result.cash_probability
        );
        // Buckets nest the same way
        assert!(result.finish_buckets.top1 <= result.finish_buckets.top10);
        assert!(result.finish_buckets.top10 <= result.finish_buckets.top20);
        assert!(result.finish_buckets.top20 <= result.finish_buckets.top50);
    }
}

/// Property 7: with correlations off, two players' draws are
/// statistically independent (empirical rho within +/-0.02 over 100k)
#[test]
fn test_uncorrelated_draws_are_independent() {
    let a = player("a", "G", 5_000, 20.0, 10.0, 30.0);
    let b = player("b", "G", 5_000, 22.0, 12.0, 32.0);
    let mut dist_a = ScoreDistribution::for_player(&a);
    let mut dist_b = ScoreDistribution::for_player(&b);
    dist_a.injury_probability = 0.0;
    dist_b.injury_probability = 0.0;

    let mut rng = StdRng::seed_from_u64(2024);
    let n = 100_000;
    let mut xs = Vec::with_capacity(n);
    let mut ys = Vec::with_capacity(n);
    for _ in 0..n {
        xs.push(dist_a.sample(&mut rng));
        ys.push(dist_b.sample(&mut rng));
    }

    let rho = pearson(&xs, &ys);
    println!("P7: empirical rho = {:.4}", rho);
    assert!(rho.abs() < 0.02, "empirical rho {} not near zero", rho);
}

/// Property 8: the zero-sample fraction converges to the injury
/// probability
#[test]
fn test_injury_rate_convergence() {
    let mut flagged = player("a", "G", 5_000, 20.0, 10.0, 30.0);
    flagged.injured = true;
    let dist = ScoreDistribution::for_player(&flagged);
    assert_eq!(dist.injury_probability, 0.25);

    let mut rng = StdRng::seed_from_u64(555);
    let n = 100_000;
    let zeros = (0..n).filter(|_| dist.sample(&mut rng) == 0.0).count();
    let rate = zeros as f64 / n as f64;

    println!("P8: zero rate = {:.4}", rate);
    assert!(
        (rate - 0.25).abs() < 0.005,
        "zero rate {} not within 0.005 of 0.25",
        rate
    );
}

/// Property 9 / R1: identical seed and inputs give bit-identical
/// aggregates regardless of worker count
#[test]
fn test_reproducibility_across_worker_counts() {
    let base = SimulationRequest {
        params: SimulationParams {
            trials: 5_000,
            seed: Some(99),
            workers: Some(1),
            ..Default::default()
        },
        players: guard_pool(12),
        lineups: vec![vec!["g0".to_string(), "g1".to_string()]],
        contest: Contest {
            entry_fee: 10.0,
            total_entries: 25,
            salary_cap: 12_000,
            roster_requirements: BTreeMap::from([("G".to_string(), 2)]),
            contest_type: ContestType::Tournament,
            prize_pool: 250.0,
        },
    };

    let single = run_simulation(&base).unwrap();

    for workers in [2, 4, 8] {
        let mut request = base.clone();
        request.params.workers = Some(workers);
        let multi = run_simulation(&request).unwrap();

        for (a, b) in single.lineup_results.iter().zip(multi.lineup_results.iter()) {
            assert_eq!(a.mean.to_bits(), b.mean.to_bits(), "{} workers", workers);
            assert_eq!(a.median.to_bits(), b.median.to_bits());
            assert_eq!(a.std_dev.to_bits(), b.std_dev.to_bits());
            assert_eq!(a.win_probability, b.win_probability);
            assert_eq!(a.cash_probability, b.cash_probability);
            assert_eq!(a.roi.to_bits(), b.roi.to_bits());
        }
        assert_eq!(single.field_size, multi.field_size);
    }
}

/// Scenario 4: perfect positive correlation propagates
///
/// With rho(A, B) = 1, conditioning on A's base draw landing in its top
/// 5% must lift B's adjusted top-20% probability by at least 3
/// percentage points over the independent baseline.
#[test]
fn test_positive_correlation_propagation() {
    let a = player("a", "G", 5_000, 20.0, 10.0, 30.0);
    let b = player("b", "G", 5_000, 20.0, 10.0, 30.0);
    let mut dist_a = ScoreDistribution::for_player(&a);
    let mut dist_b = ScoreDistribution::for_player(&b);
    dist_a.injury_probability = 0.0;
    dist_b.injury_probability = 0.0;

    let matrix = CorrelationMatrix::from_entries(&[CorrelationEntry {
        player_a: "a".to_string(),
        player_b: "b".to_string(),
        rho: 1.0,
    }]);
    let bounds = HashMap::from([
        ("a".to_string(), ScoreBounds::new(20.0, 30.0)),
        ("b".to_string(), ScoreBounds::new(20.0, 30.0)),
    ]);

    let n = 50_000;
    let mut rng = StdRng::seed_from_u64(4242);
    let mut base_a = Vec::with_capacity(n);
    let mut base_b = Vec::with_capacity(n);
    let mut adjusted_b = Vec::with_capacity(n);
    for _ in 0..n {
        let sa = dist_a.sample(&mut rng);
        let sb = dist_b.sample(&mut rng);
        let scores = HashMap::from([("a".to_string(), sa), ("b".to_string(), sb)]);
        let adjusted = matrix.perturb(&scores, &bounds);
        base_a.push(sa);
        base_b.push(sb);
        adjusted_b.push(adjusted["b"]);
    }

    let a_top5 = empirical_quantile(&base_a, 0.95);
    let b_top20 = empirical_quantile(&base_b, 0.80);

    let baseline = base_b.iter().filter(|&&s| s > b_top20).count() as f64 / n as f64;
    let conditioned: Vec<usize> = (0..n).filter(|&i| base_a[i] > a_top5).collect();
    let lifted = conditioned
        .iter()
        .filter(|&&i| adjusted_b[i] > b_top20)
        .count() as f64
        / conditioned.len() as f64;

    println!(
        "S4: baseline top-20 rate {:.4}, conditioned {:.4}",
        baseline, lifted
    );
    assert!(
        lifted >= baseline + 0.03,
        "conditional rate {} does not exceed baseline {} by 3 points",
        lifted,
        baseline
    );
}

fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;
    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys.iter()) {
        cov += (x - mean_x) * (y - mean_y);
        var_x += (x - mean_x) * (x - mean_x);
        var_y += (y - mean_y) * (y - mean_y);
    }
    cov / (var_x.sqrt() * var_y.sqrt())
}

fn empirical_quantile(values: &[f64], q: f64) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    sorted[((sorted.len() - 1) as f64 * q).round() as usize]
}
