//! Exit codes shared by every subcommand.

/// Success exit code (standard Unix convention).
pub const SUCCESS: i32 = 0;

/// Any failure: bad arguments, invalid configuration or a failed command.
pub const ERROR: i32 = 2;
