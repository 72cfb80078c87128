//! vederctl library: argument parsing, command handlers and rendering.

pub mod cli;
pub mod commands;
pub mod output;
