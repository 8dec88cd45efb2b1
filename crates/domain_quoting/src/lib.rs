//! Quoting Domain
//!
//! Ties underwriting and rating together behind a request/result surface:
//!
//! - **Requests**: applicant profile, carrier/product selector and coverage,
//!   validated before evaluation
//! - **Snapshot port**: loads the immutable rule set and rate catalog a
//!   batch is evaluated against
//! - **Product limits**: issue-age and face-amount knockouts applied before
//!   underwriting
//! - **Quote service**: single, batch and concurrent portfolio quoting
//! - **Ranking**: orders results across carriers, best offer first
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_quoting::{EngineConfig, QuoteService};
//!
//! let service = QuoteService::new(port, EngineConfig::default());
//! let results = service.quote_batch(&requests).await?;
//! ```

pub mod config;
pub mod request;
pub mod result;
pub mod snapshot;
pub mod product;
pub mod service;
pub mod ranking;
pub mod error;

pub use config::EngineConfig;
pub use request::{EvaluationRequest, MAX_ISSUE_AGE, MAX_TERM_YEARS};
pub use result::{PremiumOutcome, QuoteResult};
pub use product::{constraints_for, FaceAmountTier, ProductConstraints};
pub use snapshot::{SnapshotPort, SnapshotScope, UnderwritingSnapshot};
pub use service::{evaluate_request, QuoteService, NO_PRODUCT_REASON};
pub use ranking::{compare_offers, rank};
pub use error::QuoteError;
