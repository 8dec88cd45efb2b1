//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! underwriting engine test suite.
//!
//! # Modules
//!
//! - `fixtures`: Stable ids, timestamps and a sample carrier catalog
//! - `builders`: Builder patterns for rules, rule sets, profiles and requests
//! - `assertions`: Custom assertion helpers for verdicts and quotes
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use assertions::*;
pub use generators::*;
