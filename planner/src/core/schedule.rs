//! Trial deadline scheduling.
//!
//! Instants are offsets from the session clock origin. Each trial lasts a fixed
//! nominal duration from its ideal start; a trial that overruns that duration
//! pushes its own end and every later ideal start forward by one or two whole
//! seconds, decided once when the trial closes.

use std::time::Duration;

use serde::Serialize;

/// One compensation step. Fixed so the `EXTENDING_TIME` labels stay exact.
pub const COMPENSATION_UNIT: Duration = Duration::from_secs(1);

/// Shift applied to the session timeline when a trial closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Compensation {
    None,
    OneUnit,
    TwoUnits,
}

impl Compensation {
    pub fn units(self) -> u32 {
        match self {
            Compensation::None => 0,
            Compensation::OneUnit => 1,
            Compensation::TwoUnits => 2,
        }
    }

    /// Result text of the `EXTENDING_TIME` event, if one is due.
    pub fn label(self) -> Option<&'static str> {
        match self {
            Compensation::None => None,
            Compensation::OneUnit => Some("adding 1 second"),
            Compensation::TwoUnits => Some("adding 2 seconds"),
        }
    }
}

/// Nominal trial length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeadlinePolicy {
    pub trial: Duration,
}

impl Default for DeadlinePolicy {
    fn default() -> Self {
        Self {
            trial: Duration::from_secs(15),
        }
    }
}

/// Decision made when a trial closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrialClose {
    /// `now - trial_start`, saturating at zero.
    pub elapsed: Duration,
    pub compensation: Compensation,
    /// Instant the trial's fixation period ends.
    pub committed_end: Duration,
    /// Ideal start of the next trial.
    pub ideal_next_start: Duration,
}

impl DeadlinePolicy {
    /// Bands `[trial, trial + 1s)` and `[trial + 1s, ∞)` are disjoint.
    pub fn compensation_for(&self, elapsed: Duration) -> Compensation {
        if elapsed < self.trial {
            Compensation::None
        } else if elapsed < self.trial + COMPENSATION_UNIT {
            Compensation::OneUnit
        } else {
            Compensation::TwoUnits
        }
    }

    pub fn close_trial(
        &self,
        trial_start: Duration,
        now: Duration,
        ideal_next_start: Duration,
    ) -> TrialClose {
        let elapsed = now.saturating_sub(trial_start);
        let compensation = self.compensation_for(elapsed);
        let shifted = ideal_next_start + COMPENSATION_UNIT * compensation.units();
        TrialClose {
            elapsed,
            compensation,
            committed_end: shifted,
            ideal_next_start: shifted,
        }
    }
}

/// `DeadlinePolicy::close_trial` with the canonical 15s trial.
pub fn close_trial(trial_start: Duration, now: Duration, ideal_next_start: Duration) -> TrialClose {
    DeadlinePolicy::default().close_trial(trial_start, now, ideal_next_start)
}

/// Timing of the trial currently in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrialTimingState {
    pub ideal_start: Duration,
    pub actual_trial_start: Duration,
    pub response_start: Option<Duration>,
    pub committed_end: Option<Duration>,
}

/// Threads the ideal start timeline from one trial to the next.
///
/// Trials are strictly sequential: open, optionally mark the response onset,
/// close, then open the next one.
#[derive(Debug, Clone)]
pub struct TrialScheduler {
    policy: DeadlinePolicy,
    ideal_start: Duration,
    total_shift: Duration,
}

impl TrialScheduler {
    pub fn new(policy: DeadlinePolicy, first_ideal_start: Duration) -> Self {
        Self {
            policy,
            ideal_start: first_ideal_start,
            total_shift: Duration::ZERO,
        }
    }

    /// Ideal start of the next trial to be opened.
    pub fn ideal_start(&self) -> Duration {
        self.ideal_start
    }

    /// Sum of every compensation applied so far.
    pub fn total_shift(&self) -> Duration {
        self.total_shift
    }

    pub fn open_trial(&self, actual_start: Duration) -> TrialTimingState {
        TrialTimingState {
            ideal_start: self.ideal_start,
            actual_trial_start: actual_start,
            response_start: None,
            committed_end: None,
        }
    }

    pub fn mark_response(&self, timing: &mut TrialTimingState, at: Duration) {
        timing.response_start.get_or_insert(at);
    }

    /// Close the trial at `now`, fixing its end and the next ideal start.
    pub fn close(&mut self, timing: &mut TrialTimingState, now: Duration) -> TrialClose {
        let nominal_next = timing.ideal_start + self.policy.trial;
        let close = self
            .policy
            .close_trial(timing.actual_trial_start, now, nominal_next);
        timing.committed_end = Some(close.committed_end);
        self.total_shift += close.ideal_next_start - nominal_next;
        self.ideal_start = close.ideal_next_start;
        close
    }
}
