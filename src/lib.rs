//! extman library
//!
//! Exports the configuration engine for testing and integration.

pub mod cli;
pub mod config;
pub mod error;
