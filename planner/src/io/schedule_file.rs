//! Trial schedule files (`*.schedule`).
//!
//! Comma-separated with a header row. Each following row is
//! `depth,start_state[,goal_state]`; the goal column is used by goal training
//! and path tests and ignored elsewhere.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::Serialize;
use tracing::debug;

use crate::core::sequence::check_depth;
use crate::core::types::State;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduledTrial {
    pub depth: usize,
    pub start: State,
    pub goal: Option<State>,
}

pub fn load_schedule(path: &Path) -> Result<Vec<ScheduledTrial>> {
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let trials =
        parse_schedule(&contents).with_context(|| format!("parse schedule {}", path.display()))?;
    debug!(path = %path.display(), trials = trials.len(), "schedule loaded");
    Ok(trials)
}

pub fn parse_schedule(contents: &str) -> Result<Vec<ScheduledTrial>> {
    let mut trials = Vec::new();
    // Line 1 is the header.
    for (index, line) in contents.lines().enumerate().skip(1) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let row = index + 1;
        let trial = parse_row(line).with_context(|| format!("row {row}: {line}"))?;
        trials.push(trial);
    }
    Ok(trials)
}

fn parse_row(line: &str) -> Result<ScheduledTrial> {
    let columns: Vec<&str> = line.split(',').map(str::trim).collect();
    if columns.len() < 2 {
        return Err(anyhow!("expected at least depth,start_state"));
    }
    let depth: usize = columns[0]
        .parse()
        .with_context(|| format!("invalid depth '{}'", columns[0]))?;
    check_depth(depth)?;
    let start = parse_state(columns[1])?;
    let goal = match columns.get(2) {
        Some(raw) if !raw.is_empty() => Some(parse_state(raw)?),
        _ => None,
    };
    Ok(ScheduledTrial { depth, start, goal })
}

fn parse_state(raw: &str) -> Result<State> {
    let id: u8 = raw
        .parse()
        .with_context(|| format!("invalid state '{raw}'"))?;
    Ok(State::new(id)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rows_after_header() {
        let trials = parse_schedule("depth,start,goal\n2,1,3\n3,5\n\n1,6,\n").expect("parse");
        assert_eq!(trials.len(), 3);
        assert_eq!(trials[0].depth, 2);
        assert_eq!(trials[0].start.id(), 1);
        assert_eq!(trials[0].goal.map(State::id), Some(3));
        assert_eq!(trials[1].goal, None);
        assert_eq!(trials[2].goal, None);
    }

    #[test]
    fn reports_row_of_invalid_state() {
        let err = parse_schedule("depth,start\n1,2\n2,9\n").unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("row 3"), "{message}");
        assert!(message.contains("outside the task graph"), "{message}");
    }

    #[test]
    fn rejects_zero_depth() {
        assert!(parse_schedule("depth,start\n0,1\n").is_err());
    }

    #[test]
    fn loads_from_disk() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("run1.schedule");
        fs::write(&path, "depth,start\n3,4\n").expect("write");
        let trials = load_schedule(&path).expect("load");
        assert_eq!(trials[0].depth, 3);
    }
}
