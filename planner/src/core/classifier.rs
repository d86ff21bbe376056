//! Outcome classification of one planning trial.
//!
//! Every candidate sequence of the trial depth is evaluated, so all optimal
//! paths are visible when deciding whether the optimum requires a large loss.

use serde::Serialize;

use crate::core::error::TaskError;
use crate::core::graph::StateGraph;
use crate::core::sequence::{Evaluation, Sequence, check_depth, enumerate_sequences, evaluate};
use crate::core::types::{Action, Outcome, State};

/// One enumerated sequence together with its evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub sequence: Sequence,
    pub evaluation: Evaluation,
}

/// What a trial offers before the subject responds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrialAnalysis {
    pub start: State,
    pub depth: usize,
    pub best_reward: i32,
    /// Number of candidates tied at `best_reward`.
    pub optimal_paths: usize,
    /// True if any optimal candidate contains a large-loss step.
    pub requires_large_loss: bool,
    /// Second-highest distinct total, if there is one.
    pub second_best_reward: Option<i32>,
}

pub fn candidates(
    graph: &StateGraph,
    start: State,
    depth: usize,
) -> Result<Vec<Candidate>, TaskError> {
    Ok(enumerate_sequences(depth)?
        .into_iter()
        .map(|sequence| {
            let evaluation = evaluate(graph, start, &sequence);
            Candidate {
                sequence,
                evaluation,
            }
        })
        .collect())
}

pub fn analyze_trial(
    graph: &StateGraph,
    start: State,
    depth: usize,
) -> Result<TrialAnalysis, TaskError> {
    let candidates = candidates(graph, start, depth)?;
    let large_loss = graph.large_loss();

    let best_reward = candidates
        .iter()
        .map(|candidate| candidate.evaluation.total)
        .max()
        .ok_or(TaskError::InvalidDepth(depth))?;

    let optimal: Vec<&Candidate> = candidates
        .iter()
        .filter(|candidate| candidate.evaluation.total == best_reward)
        .collect();

    // Any optimal path with a large loss marks the trial, not all of them.
    let requires_large_loss = optimal
        .iter()
        .any(|candidate| candidate.evaluation.steps.contains(&large_loss));

    let second_best_reward =
        second_best_total(candidates.iter().map(|candidate| candidate.evaluation.total));

    Ok(TrialAnalysis {
        start,
        depth,
        best_reward,
        optimal_paths: optimal.len(),
        requires_large_loss,
        second_best_reward,
    })
}

/// Classify the sequence a subject entered for one trial.
///
/// A sequence shorter than `depth` is a `Miss`; longer is a caller bug.
pub fn classify(
    graph: &StateGraph,
    start: State,
    depth: usize,
    actual: &[Action],
) -> Result<Outcome, TaskError> {
    check_depth(depth)?;
    if actual.len() > depth {
        return Err(TaskError::SequenceTooLong {
            len: actual.len(),
            depth,
        });
    }
    if actual.len() < depth {
        return Ok(Outcome::Miss);
    }

    let analysis = analyze_trial(graph, start, depth)?;
    let earned = evaluate(graph, start, actual).total;

    if !analysis.requires_large_loss {
        return Ok(if earned == analysis.best_reward {
            Outcome::OnllCorrect
        } else {
            Outcome::OnllError
        });
    }

    if earned == analysis.best_reward {
        return Ok(Outcome::OllCorrect);
    }
    let second_best = analysis
        .second_best_reward
        .ok_or(TaskError::InsufficientDistinctTotals {
            start: start.id(),
            depth,
        })?;
    Ok(if earned == second_best {
        Outcome::AversivePruning
    } else {
        Outcome::OllError
    })
}

/// Second-highest distinct value, or `None` if fewer than two distinct values.
fn second_best_total(totals: impl Iterator<Item = i32>) -> Option<i32> {
    let mut unique: Vec<i32> = totals.collect();
    unique.sort_unstable_by(|a, b| b.cmp(a));
    unique.dedup();
    unique.get(1).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::graph::Transition;
    use crate::core::types::Action::{Left, Right};

    fn s(id: u8) -> State {
        State::new(id).expect("state")
    }

    fn run(start: u8, depth: usize, actual: &[Action]) -> Outcome {
        classify(&StateGraph::canonical(), s(start), depth, actual).expect("classify")
    }

    /// Depth-2 graph from state 1 where three paths tie at -20: LL and LR
    /// contain the -70 large loss, RL does not. RR totals -40.
    fn tied_optimum_graph() -> StateGraph {
        let t = |next: u8, reward: i32| Transition {
            next: s(next),
            reward,
        };
        StateGraph::from_table([
            [t(2, 50), t(3, -10)],
            [t(1, -70), t(4, -70)],
            [t(5, -10), t(6, -30)],
            [t(1, -10), t(5, -10)],
            [t(6, -10), t(1, -10)],
            [t(1, -10), t(4, -10)],
        ])
    }

    #[test]
    fn depth_one_from_state_one() {
        assert_eq!(run(1, 1, &[Left]), Outcome::OnllCorrect);
        assert_eq!(run(1, 1, &[Right]), Outcome::OnllError);
    }

    #[test]
    fn depth_one_from_state_two_prefers_smaller_loss() {
        assert_eq!(run(2, 1, &[Left]), Outcome::OnllCorrect);
        assert_eq!(run(2, 1, &[Right]), Outcome::OnllError);
    }

    #[test]
    fn depth_two_from_state_one() {
        let analysis = analyze_trial(&StateGraph::canonical(), s(1), 2).expect("analyze");
        assert_eq!(analysis.best_reward, 120);
        assert!(!analysis.requires_large_loss);
        assert_eq!(run(1, 2, &[Left, Left]), Outcome::OnllCorrect);
        assert_eq!(run(1, 2, &[Left, Right]), Outcome::OnllError);
    }

    #[test]
    fn truncated_sequence_is_miss() {
        assert_eq!(run(1, 2, &[Left]), Outcome::Miss);
        assert_eq!(run(3, 3, &[]), Outcome::Miss);
    }

    #[test]
    fn oversized_sequence_is_rejected() {
        let err = classify(&StateGraph::canonical(), s(1), 1, &[Left, Left]).unwrap_err();
        assert_eq!(err, TaskError::SequenceTooLong { len: 2, depth: 1 });
    }

    #[test]
    fn large_loss_optimum_from_state_five() {
        // LL = -70 + 140 = 70, RL = -20 + 20 = 0, RR = -40, LR = -50.
        let analysis = analyze_trial(&StateGraph::canonical(), s(5), 2).expect("analyze");
        assert_eq!(analysis.best_reward, 70);
        assert!(analysis.requires_large_loss);
        assert_eq!(analysis.second_best_reward, Some(0));

        assert_eq!(run(5, 2, &[Left, Left]), Outcome::OllCorrect);
        assert_eq!(run(5, 2, &[Right, Left]), Outcome::AversivePruning);
        assert_eq!(run(5, 2, &[Right, Right]), Outcome::OllError);
        assert_eq!(run(5, 2, &[Left, Right]), Outcome::OllError);
    }

    #[test]
    fn large_loss_optimum_at_depth_three() {
        // Best is LRL = -70 - 20 + 140 = 50; runner-up RLL = -20 + 20 - 20 = -20.
        let analysis = analyze_trial(&StateGraph::canonical(), s(3), 3).expect("analyze");
        assert_eq!(analysis.best_reward, 50);
        assert!(analysis.requires_large_loss);
        assert_eq!(analysis.second_best_reward, Some(-20));
        assert_eq!(run(3, 3, &[Left, Right, Left]), Outcome::OllCorrect);
        assert_eq!(run(3, 3, &[Right, Left, Left]), Outcome::AversivePruning);
        assert_eq!(run(3, 3, &[Right, Right, Right]), Outcome::OllError);
    }

    #[test]
    fn one_large_loss_optimum_is_enough_to_mark_the_trial() {
        let graph = tied_optimum_graph();
        let analysis = analyze_trial(&graph, s(1), 2).expect("analyze");
        assert_eq!(analysis.best_reward, -20);
        assert_eq!(analysis.optimal_paths, 3);
        assert!(analysis.requires_large_loss);
        assert_eq!(analysis.second_best_reward, Some(-40));

        // RL ties the optimum without a large loss but still scores as OLL.
        assert_eq!(
            classify(&graph, s(1), 2, &[Right, Left]).expect("classify"),
            Outcome::OllCorrect
        );
        assert_eq!(
            classify(&graph, s(1), 2, &[Right, Right]).expect("classify"),
            Outcome::AversivePruning
        );
    }

    #[test]
    fn classify_is_total_and_pure() {
        let graph = StateGraph::canonical();
        for start in State::all() {
            for depth in 1..=3 {
                for full in enumerate_sequences(depth).expect("enumerate") {
                    for len in 0..=depth {
                        let actual = &full[..len];
                        let first = classify(&graph, start, depth, actual).expect("classify");
                        let second = classify(&graph, start, depth, actual).expect("classify");
                        assert_eq!(first, second);
                        assert_eq!(first == Outcome::Miss, len < depth);
                    }
                }
            }
        }
    }

    #[test]
    fn second_best_requires_two_distinct_totals() {
        assert_eq!(second_best_total([5, 5, 5].into_iter()), None);
        assert_eq!(second_best_total([3, 9, 9, 1].into_iter()), Some(3));
    }
}
