//! Test-only fixtures for recorded sessions.

use std::fs;
use std::path::{Path, PathBuf};

use crate::core::types::{Action, State};
use crate::io::responses::{RecordedKey, RecordedSession, RecordedTrial};

/// Three trials on the canonical graph, task onset at 0:
///
/// 0. state 1, depth 2, `Left Left` well inside the deadline (ONLL Correct);
/// 1. state 5, depth 2, `Right Left`, closed 15.5s after its start
///    (Aversive Pruning, one unit of compensation);
/// 2. state 2, depth 1, no keys (Miss).
pub fn canonical_session_json() -> String {
    r#"{
  "task_onset_secs": 0.0,
  "trials": [
    {
      "start_state": 1,
      "depth": 2,
      "trial_start_secs": 8.1,
      "closed_at_secs": 20.0,
      "keypresses": [
        { "action": "left", "at_secs": 12.0 },
        { "action": "left", "at_secs": 12.5 }
      ]
    },
    {
      "start_state": 5,
      "depth": 2,
      "trial_start_secs": 23.1,
      "closed_at_secs": 38.6,
      "keypresses": [
        { "action": "right", "at_secs": 25.0 },
        { "action": "left", "at_secs": 26.0 }
      ]
    },
    {
      "start_state": 2,
      "depth": 1,
      "trial_start_secs": 39.1,
      "closed_at_secs": 50.0,
      "keypresses": []
    }
  ]
}
"#
    .to_string()
}

/// Write `contents` to `responses.json` under `dir` and return its path.
pub fn write_responses(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("responses.json");
    fs::write(&path, contents).expect("write responses fixture");
    path
}

/// Recorded trial with keys at the given offsets from `trial_start_secs`.
pub fn recorded_trial(
    start: u8,
    depth: usize,
    trial_start_secs: f64,
    keys: &[(Action, f64)],
    closed_after_secs: f64,
) -> RecordedTrial {
    RecordedTrial {
        start_state: State::new(start).expect("fixture state"),
        depth,
        trial_start_secs,
        closed_at_secs: trial_start_secs + closed_after_secs,
        keypresses: keys
            .iter()
            .map(|&(action, offset)| RecordedKey {
                action,
                at_secs: trial_start_secs + offset,
            })
            .collect(),
    }
}

pub fn recorded_session(trials: Vec<RecordedTrial>) -> RecordedSession {
    RecordedSession {
        task_onset_secs: 0.0,
        trials,
    }
}
