//! Deterministic, pure logic of the planning task.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! values and return deterministic outputs suitable for tests.

pub mod classifier;
pub mod error;
pub mod graph;
pub mod schedule;
pub mod scoring;
pub mod sequence;
pub mod types;
