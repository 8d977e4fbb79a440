//! The `cardpipe` command-line tool.

pub mod cli;
pub mod commands;
pub mod error;
