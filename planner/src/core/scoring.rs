//! Points and training checks.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::graph::StateGraph;
use crate::core::schedule::Compensation;
use crate::core::sequence::evaluate;
use crate::core::types::{Action, Outcome, State};

/// Points awarded for a trial: the path total, or `miss_penalty` when fewer
/// than `depth` actions were entered.
pub fn trial_points(
    graph: &StateGraph,
    start: State,
    depth: usize,
    actual: &[Action],
    miss_penalty: i32,
) -> i32 {
    if actual.len() < depth {
        return miss_penalty;
    }
    evaluate(graph, start, actual).total
}

/// Goal training succeeds when the last move lands on `goal`.
pub fn reaches_goal(graph: &StateGraph, start: State, sequence: &[Action], goal: State) -> bool {
    evaluate(graph, start, sequence).final_state == goal
}

/// Path test: is `answer` the reward of the move from `start` to `goal`?
///
/// Returns `None` when the two states are not adjacent.
pub fn check_path_answer(
    graph: &StateGraph,
    start: State,
    goal: State,
    answer: i32,
) -> Option<bool> {
    let action = graph.action_toward(start, goal)?;
    Some(graph.reward(start, action) == answer)
}

/// Running totals for a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTally {
    pub trials: u32,
    pub points: i64,
    pub outcomes: BTreeMap<Outcome, u32>,
    pub one_unit_extensions: u32,
    pub two_unit_extensions: u32,
}

impl SessionTally {
    pub fn record(&mut self, outcome: Outcome, points: i32, compensation: Compensation) {
        self.trials += 1;
        self.points += i64::from(points);
        *self.outcomes.entry(outcome).or_insert(0) += 1;
        match compensation {
            Compensation::None => {}
            Compensation::OneUnit => self.one_unit_extensions += 1,
            Compensation::TwoUnits => self.two_unit_extensions += 1,
        }
    }

    pub fn count(&self, outcome: Outcome) -> u32 {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    /// Fraction of non-miss trials scored `OnllCorrect` or `OllCorrect`.
    pub fn optimal_rate(&self) -> Option<f64> {
        let answered = self.trials - self.count(Outcome::Miss);
        if answered == 0 {
            return None;
        }
        let optimal = self.count(Outcome::OnllCorrect) + self.count(Outcome::OllCorrect);
        Some(f64::from(optimal) / f64::from(answered))
    }
}
