//! Underwriting Domain
//!
//! Decides whether an applicant is insurable with a carrier/product, at
//! which health class, and with which rating adjustments. The decision is a
//! pure function of the applicant profile and an immutable catalog of rule
//! sets.
//!
//! # Pipeline
//!
//! ```text
//! profile + selector
//!   -> resolver   (which rule sets apply, one per condition)
//!   -> evaluator  (first matching rule per set, by priority)
//!   -> combiner   (worst case across sets)
//!   -> FinalVerdict
//! ```
//!
//! Predicates are evaluated with three-valued logic: a question the
//! applicant never answered is `Unknown`, never `false`.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_underwriting::{underwrite, ApplicantProfile, FlatExtraComposition, Gender, Selector};
//!
//! let profile = ApplicantProfile::new(52, Gender::Male, false)
//!     .with_fact("diabetes.insulin_use", true);
//! let verdict = underwrite(&rule_sets, &Selector::new(carrier_id, Some(product_id)), &profile,
//!     FlatExtraComposition::Sum);
//! ```

pub mod classification;
pub mod profile;
pub mod predicate;
pub mod rules;
pub mod resolver;
pub mod verdict;
pub mod evaluator;
pub mod combiner;
pub mod decision;
pub mod validation;
pub mod error;

pub use classification::{Eligibility, FlatExtra, Gender, HealthClass, TableRating};
pub use profile::ApplicantProfile;
pub use predicate::{evaluate, evaluate_traced, Condition, Evaluation, NullPolicy, Operator, Predicate, Truth, PREDICATE_VERSION};
pub use rules::{ReviewStatus, Rule, RuleOutcome, RuleSet, RuleSetScope, DEFAULT_VARIANT};
pub use resolver::{resolve, select, Selection, Selector};
pub use verdict::{Provenance, TriggeredRule, Verdict, CLEAN_PROFILE_REASON, NO_MATCH_REASON, NO_RULE_SET_CONCERN};
pub use evaluator::evaluate_rule_set;
pub use combiner::{combine, combine_with, FinalVerdict, FlatExtraComposition, Reason};
pub use decision::{underwrite, underwrite_with, DEFAULT_CLEAN_PROFILE_CLASS};
pub use validation::{ensure_valid, validate_rule_set, ValidationIssue, ValidationReport};
pub use error::{DataError, UnderwritingError};
