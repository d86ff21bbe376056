//! Stable exit codes for planner CLI commands.

/// Command succeeded.
pub const OK: i32 = 0;
/// Command failed: invalid input, config, schedule or responses, or an I/O error.
pub const INVALID: i32 = 1;
