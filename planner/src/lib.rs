//! Outcome classification and trial deadline scheduling for a sequential
//! planning task.
//!
//! Subjects move through a fixed six-state graph by pressing Left or Right,
//! collecting the reward of every transition. Each trial asks for a fixed
//! number of moves from a given start state within a timed window.
//!
//! - **[`core`]**: Pure, deterministic logic (graph, enumeration,
//!   classification, deadline compensation, scoring). No I/O.
//! - **[`io`]**: Config, schedule files, recorded responses and the event log.
//!
//! [`session`] threads one session's timeline and tally through the core;
//! [`replay`] drives a recorded session end to end.

pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod replay;
pub mod session;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
