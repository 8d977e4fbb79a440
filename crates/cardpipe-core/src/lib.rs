//! Shared configuration, errors and constants for the cardpipe workspace.

pub mod config;
pub mod constants;
pub mod error;
