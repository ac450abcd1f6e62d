//! Command implementations for the CLI.
//!
//! Each group of commands is implemented in its own module.

pub mod host;
pub mod init;
pub mod names;
