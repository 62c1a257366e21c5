//! CLI module for stacklens.
//!
//! This module provides the command-line interface definitions.

mod commands;

pub use commands::{Cli, Commands, DemoCommands, DescribeCommands};
