//! Orchestration of one planning session, trial by trial.
//!
//! A `Session` owns the timeline, the trial counter and the running tally.
//! The input layer hands it one `TrialResponse` per trial; the session cuts
//! the keypresses at the response deadline, classifies and scores the
//! resulting sequence, closes the trial's timing and returns the event
//! records.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::core::classifier::classify;
use crate::core::error::TaskError;
use crate::core::graph::StateGraph;
use crate::core::schedule::{DeadlinePolicy, TrialClose, TrialScheduler, TrialTimingState};
use crate::core::scoring::{SessionTally, trial_points};
use crate::core::sequence::{Sequence, check_depth, evaluate};
use crate::core::types::{Action, Outcome, State};
use crate::io::config::TaskConfig;
use crate::io::event_log::{EventCode, EventRecord};

/// A single button press on the session clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Keypress {
    pub action: Action,
    pub at: Duration,
}

/// Raw input for one trial as delivered by the input layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialResponse {
    pub start: State,
    pub depth: usize,
    pub trial_start: Duration,
    pub keypresses: Vec<Keypress>,
    /// Clock reading when feedback is done and the trial is handed back.
    pub closed_at: Duration,
}

/// Session-level parameters derived from `TaskConfig`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionParams {
    pub policy: DeadlinePolicy,
    pub onset_delay: Duration,
    pub planning_window: Duration,
    pub response_window: Duration,
    pub miss_penalty: i32,
}

impl SessionParams {
    pub fn from_config(cfg: &TaskConfig) -> Self {
        Self {
            policy: cfg.deadline_policy(),
            onset_delay: cfg.task_onset_delay(),
            planning_window: cfg.planning_window(),
            response_window: cfg.response_window(),
            miss_penalty: cfg.miss_penalty,
        }
    }
}

impl Default for SessionParams {
    fn default() -> Self {
        Self::from_config(&TaskConfig::default())
    }
}

/// Everything decided about one trial.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialReport {
    pub trial: u32,
    pub start: State,
    pub depth: usize,
    /// Accepted keypresses, in order.
    pub sequence: Sequence,
    pub outcome: Outcome,
    pub points: i32,
    pub timing: TrialTimingState,
    pub close: TrialClose,
    pub events: Vec<EventRecord>,
}

#[derive(Debug)]
pub struct Session {
    graph: StateGraph,
    params: SessionParams,
    scheduler: TrialScheduler,
    tally: SessionTally,
    next_trial: u32,
}

impl Session {
    /// Start a session whose task onset happened at `task_onset`; the first
    /// trial is ideally due `onset_delay` later.
    pub fn new(graph: StateGraph, params: SessionParams, task_onset: Duration) -> Self {
        let scheduler = TrialScheduler::new(params.policy, task_onset + params.onset_delay);
        Self {
            graph,
            params,
            scheduler,
            tally: SessionTally::default(),
            next_trial: 0,
        }
    }

    /// Ideal start of the next trial.
    pub fn ideal_start(&self) -> Duration {
        self.scheduler.ideal_start()
    }

    /// Compensation added to the timeline so far.
    pub fn total_shift(&self) -> Duration {
        self.scheduler.total_shift()
    }

    pub fn tally(&self) -> &SessionTally {
        &self.tally
    }

    pub fn trials_run(&self) -> u32 {
        self.next_trial
    }

    pub fn run_trial(&mut self, response: &TrialResponse) -> Result<TrialReport, TaskError> {
        check_depth(response.depth)?;
        let trial = self.next_trial;
        let mut timing = self.scheduler.open_trial(response.trial_start);
        if response.trial_start < timing.ideal_start {
            warn!(
                trial,
                trial_start = response.trial_start.as_secs_f64(),
                ideal_start = timing.ideal_start.as_secs_f64(),
                "trial opened before its ideal start"
            );
        }

        let entry = self.accept_keypresses(response);
        self.scheduler.mark_response(&mut timing, entry.response_start);
        let sequence: Sequence = entry.accepted.iter().map(|key| key.action).collect();

        let outcome = classify(&self.graph, response.start, response.depth, &sequence)?;
        let points = trial_points(
            &self.graph,
            response.start,
            response.depth,
            &sequence,
            self.params.miss_penalty,
        );

        let close = self.scheduler.close(&mut timing, response.closed_at);
        if let Some(label) = close.compensation.label() {
            info!(
                trial,
                elapsed = close.elapsed.as_secs_f64(),
                ideal_next_start = close.ideal_next_start.as_secs_f64(),
                "{label}"
            );
        }
        self.tally.record(outcome, points, close.compensation);
        debug!(trial, outcome = %outcome, points, "trial classified");

        let events = self.trial_events(trial, response, &entry, outcome, points, &close);
        self.next_trial += 1;

        Ok(TrialReport {
            trial,
            start: response.start,
            depth: response.depth,
            sequence,
            outcome,
            points,
            timing,
            close,
            events,
        })
    }

    /// Apply the planning and response windows to the raw keypresses.
    ///
    /// The response window opens at the first key pressed during planning, or
    /// at the end of planning if none was. Keys before the trial start, at or
    /// after the response deadline, or beyond `depth` are dropped.
    fn accept_keypresses(&self, response: &TrialResponse) -> Entry {
        let mut keys: Vec<Keypress> = response
            .keypresses
            .iter()
            .copied()
            .filter(|key| key.at >= response.trial_start)
            .collect();
        keys.sort_by_key(|key| key.at);

        let planning_end = response.trial_start + self.params.planning_window;
        let response_start = match keys.first() {
            Some(first) if first.at < planning_end => first.at,
            _ => planning_end,
        };
        let deadline = response_start + self.params.response_window;

        let accepted = keys
            .into_iter()
            .filter(|key| key.at < deadline)
            .take(response.depth)
            .collect();
        Entry {
            response_start,
            accepted,
        }
    }

    fn trial_events(
        &self,
        trial: u32,
        response: &TrialResponse,
        entry: &Entry,
        outcome: Outcome,
        points: i32,
        close: &TrialClose,
    ) -> Vec<EventRecord> {
        let depth = response.depth.to_string();
        let mut events = vec![
            EventRecord::new(EventCode::TrialOnset, response.trial_start).for_trial(trial, &depth),
            EventRecord::new(EventCode::PlanningOnset, response.trial_start)
                .for_trial(trial, &depth)
                .with_result(secs_label(self.params.planning_window)),
            EventRecord::new(EventCode::ResponseOnset, entry.response_start)
                .for_trial(trial, &depth)
                .with_result(secs_label(self.params.response_window)),
        ];

        // A key pressed during planning opens the response window and is
        // logged without points; later keys carry the running total.
        let planning_end = response.trial_start + self.params.planning_window;
        let mut state = response.start;
        let mut running = 0;
        for (index, key) in entry.accepted.iter().enumerate() {
            let step = evaluate(&self.graph, state, &[key.action]);
            running += step.total;
            state = step.final_state;
            let mut record = EventRecord::new(EventCode::Response, key.at)
                .for_trial(trial, format!("{}_{}_{}", response.start, response.depth, index))
                .with_response(
                    key.at.saturating_sub(response.trial_start),
                    Some(key.action.response_code()),
                );
            if index > 0 || key.at >= planning_end {
                record = record.with_result(running.to_string());
            }
            events.push(record);
        }

        if let Some(last) = entry.accepted.last().filter(|_| outcome != Outcome::Miss) {
            events.push(EventRecord::new(EventCode::AnimationOnset, last.at).for_trial(trial, &depth));
        }

        events.push(
            EventRecord::new(EventCode::Feedback, response.closed_at)
                .for_trial(trial, &depth)
                .with_result(points.to_string()),
        );
        events.push(
            EventRecord::new(EventCode::Outcome, response.closed_at)
                .for_trial(trial, &depth)
                .with_result(outcome.label()),
        );

        if let Some(label) = close.compensation.label() {
            events.push(
                EventRecord::new(EventCode::ExtendingTime, response.closed_at)
                    .for_trial(trial, &depth)
                    .with_response(close.elapsed, None)
                    .with_result(label),
            );
        }

        let fixation = close.committed_end.saturating_sub(response.closed_at);
        events.push(
            EventRecord::new(EventCode::FixationOnset, response.closed_at)
                .for_trial(trial, &depth)
                .with_result(fixation.as_secs().to_string()),
        );
        events
    }
}

/// Keypresses that survived the entry windows.
#[derive(Debug)]
struct Entry {
    response_start: Duration,
    accepted: Vec<Keypress>,
}

fn secs_label(value: Duration) -> String {
    value.as_secs_f64().to_string()
}
