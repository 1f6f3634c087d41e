/// Data export module
///
/// Provides functions for exporting aggregated simulation results to:
/// - CSV for spreadsheet analysis
/// - JSON for web visualization tools

use crate::analytics::metrics::LineupResult;
use crate::simulators::engine::SimulationOutcome;
use csv::Writer;
use std::error::Error;
use std::fs::File;
use std::io::Write;

/// Export per-lineup results to CSV format
///
/// One row per user lineup with the full aggregate statistics.
///
/// # Arguments
/// * `results` - Aggregated lineup results
/// * `path` - Output file path (e.g., "simulation_results.csv")
pub fn export_results_csv(results: &[LineupResult], path: &str) -> Result<(), Box<dyn Error>> {
    let mut wtr = Writer::from_path(path)?;

    wtr.write_record([
        "lineup",
        "trials",
        "mean",
        "median",
        "std_dev",
        "min",
        "max",
        "p25",
        "p75",
        "p90",
        "p95",
        "p99",
        "top1_pct",
        "top10_pct",
        "top20_pct",
        "top50_pct",
        "win_pct",
        "cash_pct",
        "roi_pct",
    ])?;

    for result in results {
        wtr.write_record([
            result.lineup_index.to_string(),
            result.trials.to_string(),
            format!("{:.4}", result.mean),
            format!("{:.4}", result.median),
            format!("{:.4}", result.std_dev),
            format!("{:.4}", result.min),
            format!("{:.4}", result.max),
            format!("{:.4}", result.quantiles.p25),
            format!("{:.4}", result.quantiles.p75),
            format!("{:.4}", result.quantiles.p90),
            format!("{:.4}", result.quantiles.p95),
            format!("{:.4}", result.quantiles.p99),
            format!("{:.2}", result.finish_buckets.top1),
            format!("{:.2}", result.finish_buckets.top10),
            format!("{:.2}", result.finish_buckets.top20),
            format!("{:.2}", result.finish_buckets.top50),
            format!("{:.2}", result.win_probability),
            format!("{:.2}", result.cash_probability),
            format!("{:.2}", result.roi),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Export a full run outcome to JSON format
///
/// Includes every lineup result plus the run-level cancellation flag and
/// trial counts.
///
/// # Arguments
/// * `outcome` - The simulation outcome to export
/// * `path` - Output file path (e.g., "simulation_results.json")
pub fn export_outcome_json(outcome: &SimulationOutcome, path: &str) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(outcome)?;
    let mut file = File::create(path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::metrics::LineupResult;

    fn result() -> LineupResult {
        LineupResult {
            lineup_index: 0,
            trials: 100,
            mean: 98.5,
            median: 97.0,
            std_dev: 12.3,
            min: 61.0,
            max: 140.0,
            ..LineupResult::default()
        }
    }

    #[test]
    fn test_export_csv_roundtrip() {
        let dir = std::env::temp_dir();
        let path = dir.join("dfs_sim_export_test.csv");
        let path = path.to_str().unwrap();

        export_results_csv(&[result()], path).unwrap();

        let contents = std::fs::read_to_string(path).unwrap();
        let mut lines = contents.lines();
        assert!(lines.next().unwrap().starts_with("lineup,trials,mean"));
        let row = lines.next().unwrap();
        assert!(row.starts_with("0,100,98.5000"));

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_export_json_outcome() {
        use crate::simulators::engine::SimulationOutcome;

        let outcome = SimulationOutcome {
            lineup_results: vec![result()],
            cancelled: false,
            trials_completed: 100,
            trials_failed: 0,
            field_size: 99,
        };

        let dir = std::env::temp_dir();
        let path = dir.join("dfs_sim_export_test.json");
        let path = path.to_str().unwrap();

        export_outcome_json(&outcome, path).unwrap();

        let contents = std::fs::read_to_string(path).unwrap();
        assert!(contents.contains("\"trials_completed\": 100"));
        assert!(contents.contains("\"field_size\": 99"));

        std::fs::remove_file(path).ok();
    }
}
