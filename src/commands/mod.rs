//! Command implementations for the CLI
//!
//! This module contains the implementation of all CLI commands:
//! - start: Start the gateway server
//! - test: Test configuration validity
//! - config: Configuration display and validation
//! - estimate: Compute an estimate without the server

pub mod config;
pub mod estimate;
pub mod start;
pub mod test;
