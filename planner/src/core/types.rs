//! Shared deterministic types for the planning task core.
//!
//! These types define stable contracts between core components. They carry no
//! I/O and must serialize identically across runs.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::error::TaskError;

/// Number of states in the task graph.
pub const STATE_COUNT: usize = 6;

/// A node of the task graph, identified `1..=6`.
///
/// Construction validates the domain, so every `State` held by the core is
/// a valid index into the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct State(pub(crate) u8);

impl State {
    pub fn new(id: u8) -> Result<Self, TaskError> {
        if (1..=STATE_COUNT as u8).contains(&id) {
            Ok(Self(id))
        } else {
            Err(TaskError::InvalidState(id))
        }
    }

    pub fn id(self) -> u8 {
        self.0
    }

    /// Zero-based row in the transition table.
    pub(crate) fn index(self) -> usize {
        usize::from(self.0 - 1)
    }

    /// All states in ascending order.
    pub fn all() -> impl Iterator<Item = State> {
        (1..=STATE_COUNT as u8).map(State)
    }
}

impl TryFrom<u8> for State {
    type Error = TaskError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

impl From<State> for u8 {
    fn from(state: State) -> Self {
        state.0
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One of the two buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Left,
    Right,
}

impl Action {
    pub const BOTH: [Action; 2] = [Action::Left, Action::Right];

    /// Column in the transition table.
    pub(crate) fn index(self) -> usize {
        match self {
            Action::Left => 0,
            Action::Right => 1,
        }
    }

    /// Response code written to the event log (`-1` left, `1` right).
    pub fn response_code(self) -> i32 {
        match self {
            Action::Left => -1,
            Action::Right => 1,
        }
    }

    /// Parse `left`/`right` (or `l`/`r`), case-insensitive.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "left" | "l" => Some(Action::Left),
            "right" | "r" => Some(Action::Right),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Left => f.write_str("left"),
            Action::Right => f.write_str("right"),
        }
    }
}

/// Classification of one trial.
///
/// `Onll*` trials have an optimal plan free of large losses; `Oll*` trials
/// have an optimal plan that traverses one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    OnllCorrect,
    OllCorrect,
    AversivePruning,
    OnllError,
    OllError,
    Miss,
}

impl Outcome {
    pub const ALL: [Outcome; 6] = [
        Outcome::OnllCorrect,
        Outcome::OllCorrect,
        Outcome::AversivePruning,
        Outcome::OnllError,
        Outcome::OllError,
        Outcome::Miss,
    ];

    /// Label written verbatim into the event log result field.
    pub fn label(self) -> &'static str {
        match self {
            Outcome::OnllCorrect => "ONLL Correct",
            Outcome::OllCorrect => "OLL Correct",
            Outcome::AversivePruning => "Aversive Pruning",
            Outcome::OnllError => "ONLL Error",
            Outcome::OllError => "OLL Error",
            Outcome::Miss => "Miss",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
