//! schedtrace
//!
//! Reconstructs per-process CPU time distribution over wall-clock time
//! from a kernel scheduling trace.
//!
//! This crate provides the core implementation for the
//! `schedtrace` CLI tool.
//!
//! ## Getting Started
//!
//! ```bash
//! schedtrace analyze trace.log --output cpu.csv --summary processes.csv
//! schedtrace --help
//! ```

pub mod aggregator;
pub mod commands;
pub mod kernel;
pub mod output;
pub mod parser;
pub mod utils;
