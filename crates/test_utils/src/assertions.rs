//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for verdicts and quotes that give
//! more meaningful error messages than standard assertions.

use core_kernel::Money;
use domain_quoting::{PremiumOutcome, QuoteResult};
use domain_rating::{QuotedPremium, RateKey};
use domain_underwriting::{Eligibility, FinalVerdict, HealthClass};
use rust_decimal::Decimal;

/// Asserts the eligibility and health class of a combined verdict
///
/// # Panics
///
/// Panics with the verdict's reasons if either differs
pub fn assert_decision(verdict: &FinalVerdict, eligibility: Eligibility, health_class: HealthClass) {
    assert_eq!(
        (verdict.eligibility, verdict.health_class),
        (eligibility, health_class),
        "Unexpected decision: expected {}/{}, got {}/{} with reasons {:?}",
        eligibility,
        health_class,
        verdict.eligibility,
        verdict.health_class,
        verdict.reason_texts()
    );
}

/// Asserts that a verdict carries a reason with exactly this text
pub fn assert_reason_present(verdict: &FinalVerdict, reason: &str) {
    assert!(
        verdict.reasons.iter().any(|r| r.text == reason),
        "Expected reason {:?}, got {:?}",
        reason,
        verdict.reason_texts()
    );
}

/// Asserts that a verdict was referred because `field` was missing
pub fn assert_referred_for_missing(verdict: &FinalVerdict, field: &str) {
    assert_eq!(
        verdict.eligibility,
        Eligibility::Refer,
        "Expected refer for missing {}, got {} with reasons {:?}",
        field,
        verdict.eligibility,
        verdict.reason_texts()
    );
    assert!(
        verdict.missing_fields.iter().any(|f| f == field),
        "Expected {} among missing fields {:?}",
        field,
        verdict.missing_fields
    );
}

/// Asserts that a quote was priced and returns the premium
pub fn assert_quoted(result: &QuoteResult) -> &QuotedPremium {
    match &result.premium {
        PremiumOutcome::Quoted(premium) => premium,
        other => panic!("Expected a quoted premium, got {:?}", other),
    }
}

/// Asserts that pricing missed and that the miss names `key`
pub fn assert_no_match(result: &QuoteResult, key: &RateKey) {
    match &result.premium {
        PremiumOutcome::NoMatch { key: missed, message, .. } => {
            assert_eq!(missed, key, "No-match names the wrong tuple: {}", message);
            assert!(
                message.contains(&key.to_string()),
                "No-match message {:?} does not name {}",
                message,
                key
            );
        }
        other => panic!("Expected a premium no-match for {}, got {:?}", key, other),
    }
}

/// Asserts that a quote was not priced
pub fn assert_not_rated(result: &QuoteResult) {
    assert!(
        matches!(result.premium, PremiumOutcome::NotRated { .. }),
        "Expected an unrated quote, got {:?}",
        result.premium
    );
}

/// Asserts that two Money values are approximately equal within a tolerance
///
/// # Panics
///
/// Panics if the currencies don't match or the amounts differ by more than tolerance
pub fn assert_money_approx_eq(actual: &Money, expected: &Money, tolerance: Decimal) {
    assert_eq!(
        actual.currency(),
        expected.currency(),
        "Currency mismatch: actual={}, expected={}",
        actual.currency(),
        expected.currency()
    );

    let diff = (actual.amount() - expected.amount()).abs();
    assert!(
        diff <= tolerance,
        "Money amounts differ by more than tolerance: actual={}, expected={}, diff={}, tolerance={}",
        actual.amount(),
        expected.amount(),
        diff,
        tolerance
    );
}
