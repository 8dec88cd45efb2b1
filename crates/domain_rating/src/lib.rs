//! Rating Domain
//!
//! Prices an underwriting decision by looking up a discrete premium matrix:
//!
//! - **Matrix**: rows keyed by gender, tobacco class, rate class, term, age
//!   and face amount
//! - **Resolver**: exact lookup by default, opt-in bilinear interpolation
//! - **Premium**: base, flat extra, monthly and annual totals and cost per
//!   thousand of coverage
//!
//! A lookup miss is a structured [`NoMatchError`], never a guessed price.

pub mod matrix;
pub mod premium;
pub mod resolver;
pub mod error;

pub use matrix::{PremiumMatrixRow, RateClass, RateKey, RatingScope, TobaccoClass};
pub use premium::{LookupMode, PolicyParams, QuotedPremium};
pub use resolver::{exact_lookup, interpolate, PremiumRateResolver};
pub use error::{NoMatchError, RatingError};
