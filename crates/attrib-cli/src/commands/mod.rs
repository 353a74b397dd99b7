//! CLI subcommand implementations.

pub mod activities;
pub mod clear;
pub mod log;
pub mod replay;
pub mod stats;
pub mod status;
pub mod util;
