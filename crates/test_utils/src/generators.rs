//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating random test data
//! that maintains domain invariants.

use core_kernel::{RuleId, RuleSetId};
use domain_underwriting::{
    ApplicantProfile, Eligibility, FlatExtra, Gender, HealthClass, Provenance, TableRating, Verdict,
};
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

/// Strategy for generating Eligibility values
pub fn eligibility_strategy() -> impl Strategy<Value = Eligibility> {
    prop_oneof![
        Just(Eligibility::Eligible),
        Just(Eligibility::Refer),
        Just(Eligibility::Ineligible),
    ]
}

/// Strategy for generating HealthClass values
pub fn health_class_strategy() -> impl Strategy<Value = HealthClass> {
    proptest::sample::select(HealthClass::ALL.to_vec())
}

/// Strategy for generating TableRating values, including none
pub fn table_rating_strategy() -> impl Strategy<Value = TableRating> {
    (0u8..=16u8).prop_map(TableRating::from_units)
}

/// Strategy for generating an optional flat extra
///
/// Per-thousand charges run from $0.25 to $25.00 over 1 to 10 years.
pub fn flat_extra_strategy() -> impl Strategy<Value = Option<FlatExtra>> {
    proptest::option::of(
        (25i64..=2500i64, 1u32..=10u32)
            .prop_map(|(cents, years)| FlatExtra::new(Decimal::new(cents, 2), years)),
    )
}

/// Strategy for generating Gender values
pub fn gender_strategy() -> impl Strategy<Value = Gender> {
    prop_oneof![Just(Gender::Male), Just(Gender::Female)]
}

/// Strategy for generating a condition code from a small vocabulary
pub fn condition_code_strategy() -> impl Strategy<Value = String> {
    proptest::sample::select(vec!["diabetes", "hypertension", "sleep_apnea", "cancer"])
        .prop_map(str::to_string)
}

/// Strategy for generating a per-rule-set verdict
pub fn verdict_strategy() -> impl Strategy<Value = Verdict> {
    (
        condition_code_strategy(),
        any::<u64>(),
        eligibility_strategy(),
        health_class_strategy(),
        table_rating_strategy(),
        flat_extra_strategy(),
        proptest::collection::vec("[a-z]{1,8}\\.[a-z_]{1,12}", 0..3),
    )
        .prop_map(|(code, seed, eligibility, health_class, table_rating, flat_extra, missing)| {
            let provenance = Provenance {
                condition_code: Some(code.clone()),
                rule_set_id: Some(RuleSetId::from_uuid(Uuid::from_u128(seed as u128))),
                rule_set_name: Some(format!("{} rules", code)),
                rule_id: Some(RuleId::from_uuid(Uuid::from_u128(((seed as u128) << 64) | 1))),
            };
            let mut verdict = Verdict::refer(provenance, format!("{} outcome {}", code, seed))
                .with_missing_fields(missing);
            verdict.eligibility = eligibility;
            verdict.health_class = health_class;
            verdict.table_rating = table_rating;
            verdict.flat_extra = flat_extra;
            verdict
        })
}

/// Strategy for generating a list of verdicts to combine
pub fn verdicts_strategy(max: usize) -> impl Strategy<Value = Vec<Verdict>> {
    proptest::collection::vec(verdict_strategy(), 0..=max)
}

/// Strategy for generating applicant profiles
///
/// Diabetic applicants may or may not have answered the insulin question.
pub fn profile_strategy() -> impl Strategy<Value = ApplicantProfile> {
    (
        18u32..=85u32,
        gender_strategy(),
        any::<bool>(),
        proptest::option::of(160u32..=450u32),
        proptest::option::of(proptest::option::of(any::<bool>())),
    )
        .prop_map(|(age, gender, tobacco, bmi_tenths, diabetes)| {
            let mut profile = ApplicantProfile::new(age, gender, tobacco);
            if let Some(tenths) = bmi_tenths {
                profile = profile.with_bmi(tenths as f64 / 10.0);
            }
            match diabetes {
                Some(Some(insulin)) => profile
                    .with_condition("diabetes")
                    .with_fact("diabetes.insulin_use", insulin),
                Some(None) => profile.with_condition("diabetes"),
                None => profile,
            }
        })
}
