//! Offline replay of a recorded session.
//!
//! Runs every recorded trial through a fresh `Session` and writes two
//! artifacts into the output directory: `events.csv` (the task event log)
//! and `summary.json` (tally plus provenance).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::core::graph::StateGraph;
use crate::core::scoring::SessionTally;
use crate::io::config::TaskConfig;
use crate::io::event_log::{EventCode, EventLogWriter, EventRecord};
use crate::io::responses::load_responses;
use crate::session::{Session, SessionParams};

pub const EVENTS_FILE: &str = "events.csv";
pub const SUMMARY_FILE: &str = "summary.json";

/// Persisted to `summary.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// SHA-256 of the responses file the session was replayed from.
    pub responses_sha256: String,
    pub generated_at: String,
    pub tally: SessionTally,
    /// Ideal start of the trial that would have followed the last one.
    pub final_ideal_start_secs: f64,
    /// Total compensation added to the timeline.
    pub total_shift_secs: f64,
}

#[derive(Debug)]
pub struct ReplayOutput {
    pub events_path: PathBuf,
    pub summary_path: PathBuf,
    pub summary: SessionSummary,
}

#[instrument(skip_all, fields(responses = %responses_path.display(), out = %out_dir.display()))]
pub fn replay_session(
    cfg: &TaskConfig,
    responses_path: &Path,
    out_dir: &Path,
) -> Result<ReplayOutput> {
    cfg.validate()?;
    let loaded = load_responses(responses_path)?;
    fs::create_dir_all(out_dir)
        .with_context(|| format!("create output dir {}", out_dir.display()))?;

    let task_onset = loaded.session.task_onset()?;
    let mut session = Session::new(
        StateGraph::canonical(),
        SessionParams::from_config(cfg),
        task_onset,
    );

    let events_path = out_dir.join(EVENTS_FILE);
    let mut writer = EventLogWriter::create(&events_path)?;
    writer.write(&EventRecord::new(EventCode::TaskOnset, task_onset))?;

    let mut last_close = task_onset;
    for (index, recorded) in loaded.session.trials.iter().enumerate() {
        let response = recorded
            .to_response()
            .with_context(|| format!("trial {index}"))?;
        let report = session
            .run_trial(&response)
            .with_context(|| format!("trial {index}"))?;
        writer.write_all(&report.events)?;
        last_close = last_close.max(response.closed_at);
    }

    // The task ends once the last fixation has run out.
    let task_end = last_close.max(session.ideal_start());
    writer.write(&EventRecord::new(EventCode::TaskEnd, task_end))?;
    let written = writer.written();
    writer.finish()?;
    debug!(events = written, "event log written");

    let summary = SessionSummary {
        responses_sha256: loaded.sha256,
        generated_at: Utc::now().to_rfc3339(),
        tally: session.tally().clone(),
        final_ideal_start_secs: session.ideal_start().as_secs_f64(),
        total_shift_secs: session.total_shift().as_secs_f64(),
    };
    let summary_path = out_dir.join(SUMMARY_FILE);
    write_summary(&summary_path, &summary)?;
    info!(
        trials = summary.tally.trials,
        points = summary.tally.points,
        "session replayed"
    );

    Ok(ReplayOutput {
        events_path,
        summary_path,
        summary,
    })
}

pub fn write_summary(path: &Path, summary: &SessionSummary) -> Result<()> {
    let contents = serde_json::to_string_pretty(summary).context("serialize summary")?;
    fs::write(path, format!("{contents}\n"))
        .with_context(|| format!("write summary {}", path.display()))?;
    Ok(())
}

pub fn load_summary(path: &Path) -> Result<SessionSummary> {
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parse summary {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Outcome;
    use crate::io::event_log::HEADER;
    use crate::test_support::{canonical_session_json, write_responses};

    #[test]
    fn replay_writes_event_log_and_summary() {
        let temp = tempfile::tempdir().expect("tempdir");
        let responses = write_responses(temp.path(), &canonical_session_json());
        let out = temp.path().join("out");

        let output = replay_session(&TaskConfig::default(), &responses, &out).expect("replay");

        let summary = load_summary(&output.summary_path).expect("load summary");
        assert_eq!(summary, output.summary);
        assert_eq!(summary.tally.trials, 3);
        assert_eq!(summary.tally.count(Outcome::OnllCorrect), 1);
        assert_eq!(summary.tally.count(Outcome::AversivePruning), 1);
        assert_eq!(summary.tally.count(Outcome::Miss), 1);
        assert_eq!(summary.tally.one_unit_extensions, 1);
        assert_eq!(summary.total_shift_secs, 1.0);
        assert_eq!(summary.final_ideal_start_secs, 54.0);
        assert_eq!(summary.responses_sha256.len(), 64);

        let log = fs::read_to_string(&output.events_path).expect("read events");
        let lines: Vec<&str> = log.lines().collect();
        assert_eq!(lines[0], HEADER);
        assert!(lines[1].starts_with("NA,NA,2,"), "{}", lines[1]);
        assert!(lines.last().expect("last").starts_with("NA,NA,13,"));
        assert!(log.contains(",12,"), "missing EXTENDING_TIME: {log}");
    }

    #[test]
    fn replay_rejects_invalid_config() {
        let temp = tempfile::tempdir().expect("tempdir");
        let responses = write_responses(temp.path(), &canonical_session_json());
        let cfg = TaskConfig {
            trial_secs: 0.0,
            ..TaskConfig::default()
        };
        assert!(replay_session(&cfg, &responses, &temp.path().join("out")).is_err());
    }

    #[test]
    fn replay_names_failing_trial() {
        let temp = tempfile::tempdir().expect("tempdir");
        let raw = canonical_session_json().replace("\"depth\": 1", "\"depth\": 0");
        let responses = write_responses(temp.path(), &raw);
        let err = replay_session(&TaskConfig::default(), &responses, &temp.path().join("out"))
            .unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("trial 2"), "{message}");
        assert!(message.contains("depth 0"), "{message}");
    }
}
