// CLI entry point for the DFS Contest Simulator

use clap::{Parser, Subcommand};
use colored::Colorize;
use dfs_contest_simulator::analytics::export::{export_outcome_json, export_results_csv};
use dfs_contest_simulator::math::seeding;
use dfs_contest_simulator::models::contest::PayoutSchedule;
use dfs_contest_simulator::simulators::engine::{
    run_simulation_with, CancelToken, SimulationRequest,
};
use dfs_contest_simulator::simulators::ownership::generate_ownership;
use indicatif::{ProgressBar, ProgressStyle};
use prettytable::{row, Table};
use std::error::Error;
use std::fs;
use std::sync::mpsc;
use std::thread;

#[derive(Parser)]
#[command(name = "dfs-contest-simulator")]
#[command(about = "DFS Contest Monte Carlo Simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a contest simulation from a JSON request file
    Simulate {
        /// Path to the simulation request
        #[arg(short, long)]
        request: String,

        /// Override the trial count
        #[arg(short, long)]
        trials: Option<usize>,

        /// Override the worker count
        #[arg(short, long)]
        workers: Option<usize>,

        /// Override the master seed
        #[arg(short, long)]
        seed: Option<u64>,

        /// Write per-lineup results to a CSV file
        #[arg(long)]
        csv: Option<String>,

        /// Write the full outcome to a JSON file
        #[arg(long)]
        json: Option<String>,
    },

    /// Print the synthesized ownership table for a request's player pool
    Ownership {
        /// Path to the simulation request
        #[arg(short, long)]
        request: String,

        /// Override the master seed
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Print the payout schedule in effect for a request's contest
    Schedule {
        /// Path to the simulation request
        #[arg(short, long)]
        request: String,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            request,
            trials,
            workers,
            seed,
            csv,
            json,
        } => {
            let mut req = load_request(&request)?;
            if let Some(trials) = trials {
                req.params.trials = trials;
            }
            if let Some(workers) = workers {
                req.params.workers = Some(workers);
            }
            if let Some(seed) = seed {
                req.params.seed = Some(seed);
            }
            simulate(req, csv.as_deref(), json.as_deref())
        }
        Commands::Ownership { request, seed } => {
            let req = load_request(&request)?;
            let master_seed = seed.or(req.params.seed).unwrap_or_else(seeding::entropy_seed);
            ownership_table(&req, master_seed);
            Ok(())
        }
        Commands::Schedule { request } => {
            let req = load_request(&request)?;
            schedule_table(&req);
            Ok(())
        }
    }
}

fn load_request(path: &str) -> Result<SimulationRequest, Box<dyn Error>> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn simulate(
    req: SimulationRequest,
    csv: Option<&str>,
    json: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    let total_trials = req.params.trials;
    let bar = ProgressBar::new(total_trials as u64);
    bar.set_style(
        ProgressStyle::with_template(
            "{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} trials (eta {eta})",
        )
        .unwrap(),
    );

    let (progress_tx, progress_rx) = mpsc::sync_channel(32);
    let token = CancelToken::new();
    let worker_token = token.clone();

    let handle =
        thread::spawn(move || run_simulation_with(&req, worker_token, Some(progress_tx), None));

    for snapshot in progress_rx {
        bar.set_position(snapshot.completed as u64);
    }
    let outcome = handle.join().expect("simulation thread panicked")?;
    bar.finish_and_clear();

    println!("{}", "Simulation complete".green().bold());
    println!(
        "  Trials: {} completed, {} failed",
        outcome.trials_completed, outcome.trials_failed
    );
    println!("  Field rosters: {}", outcome.field_size);
    if outcome.cancelled {
        println!(
            "{}",
            "  Run was cancelled; statistics cover the completed subset".yellow()
        );
    }

    let mut table = Table::new();
    table.add_row(row![
        "Lineup", "Trials", "Mean", "Median", "StdDev", "P95", "Win%", "Cash%", "ROI%"
    ]);
    for result in &outcome.lineup_results {
        table.add_row(row![
            result.lineup_index,
            result.trials,
            format!("{:.2}", result.mean),
            format!("{:.2}", result.median),
            format!("{:.2}", result.std_dev),
            format!("{:.2}", result.quantiles.p95),
            format!("{:.2}", result.win_probability),
            format!("{:.2}", result.cash_probability),
            format!("{:.2}", result.roi),
        ]);
    }
    table.printstd();

    if let Some(path) = csv {
        export_results_csv(&outcome.lineup_results, path)?;
        println!("Wrote {}", path);
    }
    if let Some(path) = json {
        export_outcome_json(&outcome, path)?;
        println!("Wrote {}", path);
    }
    Ok(())
}

fn ownership_table(req: &SimulationRequest, master_seed: u64) {
    let mut rng = seeding::ownership_rng(master_seed);
    let ownership = generate_ownership(&req.players, req.contest.contest_type, &mut rng);

    let mut rows: Vec<_> = req.players.iter().collect();
    rows.sort_by(|a, b| {
        ownership[&b.id]
            .partial_cmp(&ownership[&a.id])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut table = Table::new();
    table.add_row(row!["Player", "Pos", "Salary", "Proj", "Own%"]);
    for player in rows {
        table.add_row(row![
            if player.name.is_empty() {
                &player.id
            } else {
                &player.name
            },
            player.position,
            player.salary,
            format!("{:.1}", player.projected_points),
            format!("{:.1}", ownership[&player.id] * 100.0),
        ]);
    }
    table.printstd();
}

fn schedule_table(req: &SimulationRequest) {
    let schedule = req
        .params
        .payout_schedule
        .clone()
        .unwrap_or_else(|| PayoutSchedule::default_for(&req.contest));

    let mut table = Table::new();
    table.add_row(row!["Ranks", "Payout"]);
    for tier in &schedule.tiers {
        let ranks = if tier.min_rank == tier.max_rank {
            tier.min_rank.to_string()
        } else {
            format!("{}-{}", tier.min_rank, tier.max_rank)
        };
        table.add_row(row![ranks, format!("${:.2}", tier.payout)]);
    }
    table.printstd();
    println!(
        "Total allocated: ${:.2} of ${:.2} pool",
        schedule.total_allocated(),
        req.contest.prize_pool
    );
}
