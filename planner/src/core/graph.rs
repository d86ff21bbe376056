//! Fixed transition table of the task.

use serde::{Deserialize, Serialize};

use crate::core::types::{Action, STATE_COUNT, State};

/// Outcome of pushing one button in one state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub next: State,
    pub reward: i32,
}

/// Read-only table of 6 states x 2 actions.
///
/// Every `(state, action)` pair is defined by construction, so lookups are
/// infallible once a `State` exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateGraph {
    table: [[Transition; 2]; STATE_COUNT],
}

/// `(left next, left reward, right next, right reward)` per state, 1..=6.
const CANONICAL: [(u8, i32, u8, i32); STATE_COUNT] = [
    (2, 140, 4, 20),
    (3, -20, 5, -70),
    (6, -70, 4, -20),
    (2, 20, 5, -20),
    (1, -70, 6, -20),
    (3, 20, 1, -20),
];

impl StateGraph {
    /// Build a graph from an explicit table. Row `i` describes state `i + 1`;
    /// column 0 is `Left`, column 1 is `Right`.
    pub fn from_table(table: [[Transition; 2]; STATE_COUNT]) -> Self {
        Self { table }
    }

    /// The six-state graph used by the task.
    pub fn canonical() -> Self {
        let table = CANONICAL.map(|(left_next, left_reward, right_next, right_reward)| {
            [
                Transition {
                    next: State(left_next),
                    reward: left_reward,
                },
                Transition {
                    next: State(right_next),
                    reward: right_reward,
                },
            ]
        });
        Self { table }
    }

    pub fn step(&self, state: State, action: Action) -> Transition {
        self.table[state.index()][action.index()]
    }

    pub fn reward(&self, state: State, action: Action) -> i32 {
        self.step(state, action).reward
    }

    pub fn next(&self, state: State, action: Action) -> State {
        self.step(state, action).next
    }

    /// The most negative reward in the table (the "large loss").
    pub fn large_loss(&self) -> i32 {
        self.table
            .iter()
            .flatten()
            .map(|transition| transition.reward)
            .min()
            .unwrap_or_default()
    }

    /// Button that moves from `from` directly to `to`, if they are adjacent.
    ///
    /// `Left` wins when both buttons lead to `to`.
    pub fn action_toward(&self, from: State, to: State) -> Option<Action> {
        Action::BOTH
            .into_iter()
            .find(|&action| self.next(from, action) == to)
    }
}

impl Default for StateGraph {
    fn default() -> Self {
        Self::canonical()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(id: u8) -> State {
        State::new(id).expect("state")
    }

    #[test]
    fn canonical_table_matches_task_layout() {
        let graph = StateGraph::canonical();
        assert_eq!(graph.next(s(1), Action::Left), s(2));
        assert_eq!(graph.reward(s(1), Action::Left), 140);
        assert_eq!(graph.next(s(2), Action::Right), s(5));
        assert_eq!(graph.reward(s(2), Action::Right), -70);
        assert_eq!(graph.next(s(6), Action::Right), s(1));
        assert_eq!(graph.reward(s(6), Action::Left), 20);
    }

    #[test]
    fn every_state_is_reachable() {
        let graph = StateGraph::canonical();
        let mut seen = [false; STATE_COUNT];
        let mut frontier = vec![s(1)];
        while let Some(state) = frontier.pop() {
            if seen[state.index()] {
                continue;
            }
            seen[state.index()] = true;
            for action in Action::BOTH {
                frontier.push(graph.next(state, action));
            }
        }
        assert!(seen.iter().all(|&reached| reached));
    }

    #[test]
    fn large_loss_is_minimum_reward() {
        assert_eq!(StateGraph::canonical().large_loss(), -70);
    }

    #[test]
    fn action_toward_finds_adjacent_states_only() {
        let graph = StateGraph::canonical();
        assert_eq!(graph.action_toward(s(1), s(2)), Some(Action::Left));
        assert_eq!(graph.action_toward(s(1), s(4)), Some(Action::Right));
        assert_eq!(graph.action_toward(s(1), s(6)), None);
    }
}
