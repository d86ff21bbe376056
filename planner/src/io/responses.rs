//! Recorded subject responses (JSON) used to replay a session offline.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::core::types::{Action, State};
use crate::session::{Keypress, TrialResponse};

/// A session as captured by the input layer. Times are seconds on the
/// session clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedSession {
    pub task_onset_secs: f64,
    pub trials: Vec<RecordedTrial>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedTrial {
    pub start_state: State,
    pub depth: usize,
    pub trial_start_secs: f64,
    /// Clock reading when the trial loop handed the trial back for closing.
    pub closed_at_secs: f64,
    #[serde(default)]
    pub keypresses: Vec<RecordedKey>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedKey {
    pub action: Action,
    pub at_secs: f64,
}

/// Loaded responses plus the SHA-256 of the file they came from.
#[derive(Debug, Clone)]
pub struct LoadedResponses {
    pub session: RecordedSession,
    pub sha256: String,
}

pub fn load_responses(path: &Path) -> Result<LoadedResponses> {
    let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let session: RecordedSession = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse responses {}", path.display()))?;
    debug!(path = %path.display(), trials = session.trials.len(), "responses loaded");
    Ok(LoadedResponses {
        session,
        sha256: sha256_hex(&bytes),
    })
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

impl RecordedSession {
    pub fn task_onset(&self) -> Result<Duration> {
        clock("task_onset_secs", self.task_onset_secs)
    }
}

impl RecordedTrial {
    pub fn to_response(&self) -> Result<TrialResponse> {
        let keypresses = self
            .keypresses
            .iter()
            .map(|key| {
                Ok(Keypress {
                    action: key.action,
                    at: clock("keypress at_secs", key.at_secs)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(TrialResponse {
            start: self.start_state,
            depth: self.depth,
            trial_start: clock("trial_start_secs", self.trial_start_secs)?,
            keypresses,
            closed_at: clock("closed_at_secs", self.closed_at_secs)?,
        })
    }
}

fn clock(name: &str, secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs).map_err(|err| anyhow!("{name} = {secs}: {err}"))
}
