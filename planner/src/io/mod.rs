//! File formats the planner reads and writes.

pub mod config;
pub mod event_log;
pub mod responses;
pub mod schedule_file;
