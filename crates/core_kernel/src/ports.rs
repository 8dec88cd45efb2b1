//! Ports and Adapters Infrastructure
//!
//! The engine never reaches into storage itself. Rule sets and rate tables
//! arrive through port traits defined by the domain crates; adapters (an
//! in-memory catalog, a JSON snapshot on disk, a database in a host
//! application) implement them and report failures with [`PortError`].
//!
//! ```text
//!   QuoteService ──► SnapshotPort (domain_quoting)
//!                        ▲               ▲
//!              InMemorySnapshot    JsonFileSnapshot   (infra_snapshot)
//! ```

use std::fmt;
use thiserror::Error;

/// Error type for port operations
///
/// All adapters report through this type so callers can decide on retries
/// without knowing which adapter is configured.
#[derive(Debug, Error)]
pub enum PortError {
    /// The requested entity was not found
    #[error("Not found: {entity_type} with id {id}")]
    NotFound {
        entity_type: String,
        id: String,
    },

    /// Connection to the underlying system failed
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Stored data could not be decoded into domain types
    #[error("Transformation error: {message}")]
    Transformation {
        message: String,
    },
}

impl PortError {
    /// Creates a NotFound error
    pub fn not_found(entity_type: impl Into<String>, id: impl fmt::Display) -> Self {
        PortError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    /// Creates a Connection error wrapping its cause
    pub fn connection(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        PortError::Connection {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a Transformation error
    pub fn transformation(message: impl Into<String>) -> Self {
        PortError::Transformation {
            message: message.into(),
        }
    }

    /// Returns true if this error indicates a transient failure that may succeed on retry
    pub fn is_transient(&self) -> bool {
        matches!(self, PortError::Connection { .. })
    }

    /// Returns true if this error indicates the entity was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, PortError::NotFound { .. })
    }
}

/// Marker trait for all domain ports
///
/// Ports are shared across worker tasks, so implementations must be
/// thread-safe.
pub trait DomainPort: Send + Sync + 'static {}
