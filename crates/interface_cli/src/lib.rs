//! Command Line Interface
//!
//! Batch quoting from files: a snapshot document holding rule sets and
//! premium rows, and a request document holding one or more evaluation
//! requests. Results are printed as a JSON array.

pub mod config;
pub mod batch;

pub use config::CliConfig;
pub use batch::{parse_requests, read_requests, render};
