//! Standard exit codes for CLI operations
//!
//! These exit codes follow Unix conventions where applicable. Argument
//! parsing failures are reported by clap with its own code.

/// Validation error - flags present but unusable
pub const VALIDATION_ERROR: i32 = 2;

/// Template error - filling in the templates failed
pub const TEMPLATE_ERROR: i32 = 3;

/// IO error - file not found, permission denied, etc.
pub const IO_ERROR: i32 = 5;
