//! Task timing and scoring configuration (`planner.toml`).

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::schedule::DeadlinePolicy;

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "planner.toml";

/// Upper bound for every configured duration (one day).
const MAX_SECS: u64 = 86_400;

/// Task configuration (TOML).
///
/// Every field has a default, so a missing file yields the canonical task.
/// The compensation step is fixed at one second and cannot be configured.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct TaskConfig {
    /// Nominal trial duration in seconds.
    pub trial_secs: f64,

    /// Lead-in between task onset and the first ideal trial start.
    pub task_onset_delay_secs: f64,

    /// Planning sub-window; the response window opens at its end if no key
    /// was pressed earlier.
    pub planning_secs: f64,

    /// Response-entry sub-window measured from the response onset.
    pub response_secs: f64,

    /// Points charged for a trial with an incomplete sequence.
    pub miss_penalty: i32,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            trial_secs: 15.0,
            task_onset_delay_secs: 8.0,
            planning_secs: 9.0,
            response_secs: 2.5,
            miss_penalty: -200,
        }
    }
}

impl TaskConfig {
    pub fn validate(&self) -> Result<()> {
        positive("trial_secs", self.trial_secs)?;
        positive("planning_secs", self.planning_secs)?;
        positive("response_secs", self.response_secs)?;
        duration("task_onset_delay_secs", self.task_onset_delay_secs)?;
        if self.planning_secs + self.response_secs > self.trial_secs {
            return Err(anyhow!(
                "planning_secs + response_secs must fit within trial_secs"
            ));
        }
        Ok(())
    }

    pub fn deadline_policy(&self) -> DeadlinePolicy {
        DeadlinePolicy {
            trial: Duration::from_secs_f64(self.trial_secs),
        }
    }

    pub fn task_onset_delay(&self) -> Duration {
        Duration::from_secs_f64(self.task_onset_delay_secs)
    }

    pub fn planning_window(&self) -> Duration {
        Duration::from_secs_f64(self.planning_secs)
    }

    pub fn response_window(&self) -> Duration {
        Duration::from_secs_f64(self.response_secs)
    }
}

fn positive(name: &str, value: f64) -> Result<()> {
    if duration(name, value)?.is_zero() {
        return Err(anyhow!("{name} must be > 0"));
    }
    Ok(())
}

/// Accepts `0..=MAX_SECS`; the accessors convert without re-checking.
fn duration(name: &str, value: f64) -> Result<Duration> {
    let parsed =
        Duration::try_from_secs_f64(value).map_err(|err| anyhow!("{name} = {value}: {err}"))?;
    if parsed > Duration::from_secs(MAX_SECS) {
        return Err(anyhow!("{name} must be at most {MAX_SECS} seconds"));
    }
    Ok(parsed)
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `TaskConfig::default()`.
pub fn load_config(path: &Path) -> Result<TaskConfig> {
    if !path.exists() {
        let cfg = TaskConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: TaskConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &TaskConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("config path missing parent {}", path.display()))?;
    if !parent.as_os_str().is_empty() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}
