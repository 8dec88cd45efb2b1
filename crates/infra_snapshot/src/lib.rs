//! Snapshot Infrastructure
//!
//! Adapters for the [`SnapshotPort`](domain_quoting::SnapshotPort):
//!
//! - [`InMemorySnapshot`]: a catalog held in memory, swappable at runtime
//! - [`JsonFileSnapshot`]: a JSON document on disk, re-read on every load
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_snapshot::JsonFileSnapshot;
//! use domain_quoting::{EngineConfig, QuoteService};
//! use std::sync::Arc;
//!
//! let service = QuoteService::new(Arc::new(JsonFileSnapshot::new("snapshot.json")), EngineConfig::default());
//! ```

pub mod memory;
pub mod file;
pub mod error;

pub use memory::InMemorySnapshot;
pub use file::JsonFileSnapshot;
pub use error::SnapshotError;
