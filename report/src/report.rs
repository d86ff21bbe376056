//! Aggregation of replayed sessions.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use planner::core::types::Outcome;
use planner::replay::{SUMMARY_FILE, load_summary};

#[derive(Debug, Default)]
pub struct ReportSummary {
    pub sessions: usize,
    pub trials: u64,
    pub points: i64,
    pub outcomes: BTreeMap<Outcome, u64>,
    pub one_unit_extensions: u64,
    pub two_unit_extensions: u64,
    pub avg_final_ideal_start_secs: Option<f64>,
}

impl ReportSummary {
    pub fn count(&self, outcome: Outcome) -> u64 {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    /// Optimal choices over answered (non-miss) trials across all sessions.
    pub fn optimal_rate(&self) -> Option<f64> {
        let answered = self.trials - self.count(Outcome::Miss);
        if answered == 0 {
            return None;
        }
        let optimal = self.count(Outcome::OnllCorrect) + self.count(Outcome::OllCorrect);
        Some(optimal as f64 / answered as f64)
    }
}

/// Session directories directly below `results_dir`, sorted.
pub fn load_session_dirs(results_dir: &Path) -> Result<Vec<PathBuf>> {
    if !results_dir.exists() {
        return Ok(Vec::new());
    }
    let mut dirs = Vec::new();
    for entry in
        fs::read_dir(results_dir).with_context(|| format!("read {}", results_dir.display()))?
    {
        let entry = entry.context("read entry")?;
        if entry.path().is_dir() {
            dirs.push(entry.path());
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Sum every `summary.json` below `results_dir`. Unreadable summaries are
/// skipped and reported as warnings.
pub fn aggregate(results_dir: &Path) -> Result<(ReportSummary, Vec<String>)> {
    let mut summary = ReportSummary::default();
    let mut warnings = Vec::new();

    for session_dir in load_session_dirs(results_dir)? {
        let summary_path = session_dir.join(SUMMARY_FILE);
        let session = match load_summary(&summary_path) {
            Ok(session) => session,
            Err(err) => {
                warnings.push(format!(
                    "skip {}: {SUMMARY_FILE} invalid ({err:#})",
                    session_dir.display()
                ));
                continue;
            }
        };
        debug!(session = %session_dir.display(), trials = session.tally.trials, "session loaded");

        summary.sessions += 1;
        summary.trials += u64::from(session.tally.trials);
        summary.points += session.tally.points;
        for (outcome, count) in &session.tally.outcomes {
            *summary.outcomes.entry(*outcome).or_insert(0) += u64::from(*count);
        }
        summary.one_unit_extensions += u64::from(session.tally.one_unit_extensions);
        summary.two_unit_extensions += u64::from(session.tally.two_unit_extensions);

        summary.avg_final_ideal_start_secs = Some(match summary.avg_final_ideal_start_secs {
            None => session.final_ideal_start_secs,
            Some(avg) => {
                let total =
                    avg * (summary.sessions as f64 - 1.0) + session.final_ideal_start_secs;
                total / summary.sessions as f64
            }
        });
    }

    Ok((summary, warnings))
}
