//! CLI layer for ragsql-rs.
//!
//! Provides the command-line interface using clap: serving the HTTP API
//! and running the agents from the shell.

pub mod commands;
pub mod parser;

pub use commands::execute;
pub use parser::{Cli, Commands};
