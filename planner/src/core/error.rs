//! Contract violations raised by the core.
//!
//! None of these occur with the canonical graph and well-formed inputs; they
//! flag a malformed table, schedule or caller and always propagate.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    #[error("state {0} is outside the task graph (expected 1..=6)")]
    InvalidState(u8),

    #[error("depth {0} is outside the supported range 1..=16")]
    InvalidDepth(usize),

    #[error("entered {len} actions but the trial depth is {depth}")]
    SequenceTooLong { len: usize, depth: usize },

    #[error("start state {start} at depth {depth} has fewer than two distinct path totals")]
    InsufficientDistinctTotals { start: u8, depth: usize },
}
