//! Core Kernel - Foundational types for the underwriting engine
//!
//! This crate provides the building blocks shared by every other crate:
//! - Money types with precise decimal arithmetic
//! - Strongly typed identifiers for carriers, products, rule sets and rules
//! - Port error types for the rule/rate snapshot adapters

pub mod money;
pub mod identifiers;
pub mod ports;

pub use money::{Money, Currency, MoneyError};
pub use identifiers::{ImoId, CarrierId, ProductId, RuleSetId, RuleId, PremiumRowId};
pub use ports::{PortError, DomainPort};
