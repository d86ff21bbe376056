//! Candidate enumeration and evaluation of action sequences.

use serde::Serialize;

use crate::core::error::TaskError;
use crate::core::graph::StateGraph;
use crate::core::types::{Action, State};

/// Ordered list of button presses.
pub type Sequence = Vec<Action>;

/// Upper bound on enumerated depth; the task uses at most 3.
pub const MAX_DEPTH: usize = 16;

/// Result of folding a sequence through the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Evaluation {
    pub total: i32,
    pub steps: Vec<i32>,
    pub final_state: State,
}

/// Reject depths the enumerator cannot represent.
pub fn check_depth(depth: usize) -> Result<(), TaskError> {
    if depth == 0 || depth > MAX_DEPTH {
        return Err(TaskError::InvalidDepth(depth));
    }
    Ok(())
}

/// Every sequence of exactly `depth` actions (`2^depth` of them).
///
/// Bit `depth - 1 - i` of the index selects action `i`, so the output is in
/// lexicographic order with `Left` before `Right`.
pub fn enumerate_sequences(depth: usize) -> Result<Vec<Sequence>, TaskError> {
    check_depth(depth)?;
    let count = 1usize << depth;
    let sequences = (0..count)
        .map(|index| {
            (0..depth)
                .map(|position| {
                    if (index >> (depth - 1 - position)) & 1 == 0 {
                        Action::Left
                    } else {
                        Action::Right
                    }
                })
                .collect()
        })
        .collect();
    Ok(sequences)
}

pub fn evaluate(graph: &StateGraph, start: State, sequence: &[Action]) -> Evaluation {
    let mut state = start;
    let mut total = 0;
    let mut steps = Vec::with_capacity(sequence.len());
    for &action in sequence {
        let transition = graph.step(state, action);
        steps.push(transition.reward);
        total += transition.reward;
        state = transition.next;
    }
    Evaluation {
        total,
        steps,
        final_state: state,
    }
}
