//! CLI command implementations.

use std::path::Path;

use anyhow::Result;
use planner::core::types::Outcome;

use crate::report::aggregate;

/// Print aggregated totals for every session under `results_dir`.
pub fn summarize(results_dir: &Path) -> Result<()> {
    let (summary, warnings) = aggregate(results_dir)?;
    println!(
        "report: sessions={} trials={} points={}",
        summary.sessions, summary.trials, summary.points
    );
    for outcome in Outcome::ALL {
        println!("report: outcome {} {}", outcome.label(), summary.count(outcome));
    }
    println!(
        "report: extensions one_unit={} two_units={}",
        summary.one_unit_extensions, summary.two_unit_extensions
    );
    if let Some(rate) = summary.optimal_rate() {
        println!("report: optimal_rate={:.3}", rate);
    }
    if let Some(avg) = summary.avg_final_ideal_start_secs {
        println!("report: avg_final_ideal_start_secs={:.2}", avg);
    }
    for warning in warnings {
        eprintln!("warning: {}", warning);
    }
    Ok(())
}
