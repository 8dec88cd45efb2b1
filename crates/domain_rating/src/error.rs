//! Rating domain errors

use core_kernel::MoneyError;
use domain_underwriting::HealthClass;
use thiserror::Error;

use crate::matrix::{RateKey, RatingScope};

/// No premium row exists for the exact lookup tuple
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("No premium row for {key} in {scope}")]
pub struct NoMatchError {
    pub scope: RatingScope,
    pub key: RateKey,
}

/// Errors that can occur while pricing a verdict
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RatingError {
    #[error(transparent)]
    NoMatch(#[from] NoMatchError),

    /// The verdict is ineligible and is never priced
    #[error("Ineligible verdicts are not priced")]
    Ineligible,

    /// The health class has no rate class
    #[error("Health class {0} cannot be rated")]
    NotRatable(HealthClass),

    #[error("Invalid policy parameters: {0}")]
    InvalidParams(String),

    #[error("Money error: {0}")]
    Money(#[from] MoneyError),
}

impl RatingError {
    pub fn invalid_params(message: impl Into<String>) -> Self {
        RatingError::InvalidParams(message.into())
    }

    /// Returns the missing tuple when the error is a lookup miss
    pub fn no_match(&self) -> Option<&NoMatchError> {
        match self {
            RatingError::NoMatch(err) => Some(err),
            _ => None,
        }
    }
}
