//! Command-line front end for poisonproof.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod output;

pub use cli::{Cli, Commands, OutputFormat};
