//! Command-line interface for rhythm-refiner.
//!
//! This module provides CLI commands for summarizing playlists, producing
//! recommendations, and inspecting the scoring configuration.

mod commands;

pub use commands::{Cli, Commands, run_command};
