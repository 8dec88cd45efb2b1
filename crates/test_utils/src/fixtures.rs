//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for the underwriting engine. Ids and
//! timestamps are fixed so fixtures compare equal across calls and test runs.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use core_kernel::{CarrierId, ImoId, ProductId, RuleSetId};
use domain_quoting::UnderwritingSnapshot;
use domain_rating::{PremiumMatrixRow, RateClass};
use domain_underwriting::{ApplicantProfile, Eligibility, Gender, HealthClass, RuleSet};
use once_cell::sync::Lazy;
use rust_decimal_macros::dec;
use serde_json::json;
use uuid::Uuid;

use crate::builders::{PremiumRowBuilder, RuleBuilder, RuleSetBuilder};

/// Reason text of the diabetes catch-all rule
pub const CATCH_ALL_REASON: &str = "best available class is Standard.";

/// Reason text of the insulin decline rule
pub const INSULIN_DECLINE_REASON: &str = "Insulin-dependent diabetes is declined.";

/// Fixture for identifier test data
pub struct IdFixtures;

impl IdFixtures {
    /// The carrier most fixtures belong to
    pub fn carrier_id() -> CarrierId {
        CarrierId::from_uuid(Uuid::from_u128(0x7a3e_0000_0000_0000_0000_0000_0000_0001))
    }

    /// A second carrier for cross-carrier tests
    pub fn other_carrier_id() -> CarrierId {
        CarrierId::from_uuid(Uuid::from_u128(0x7a3e_0000_0000_0000_0000_0000_0000_0002))
    }

    /// The term product rates are published for
    pub fn product_id() -> ProductId {
        ProductId::from_uuid(Uuid::from_u128(0x9f10_0000_0000_0000_0000_0000_0000_0001))
    }

    /// The owning IMO for IMO-scoped fixtures
    pub fn imo_id() -> ImoId {
        ImoId::from_uuid(Uuid::from_u128(0x1e30_0000_0000_0000_0000_0000_0000_0001))
    }

    /// A deterministic rule set id
    pub fn rule_set_id(n: u128) -> RuleSetId {
        RuleSetId::from_uuid(Uuid::from_u128(0x5e70_0000_0000_0000_0000_0000_0000_0000 + n))
    }
}

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Creation time shared by fixture rules (Jan 1, 2024)
    pub fn created_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    /// Evaluation date for `*_since_*` operators (Jun 15, 2024)
    pub fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }
}

/// Fixture for applicant profiles
pub struct ProfileFixtures;

impl ProfileFixtures {
    /// A 45 year old male non-smoker with nothing to disclose
    pub fn healthy_male() -> ApplicantProfile {
        ApplicantProfile::new(45, Gender::Male, false).with_as_of(TemporalFixtures::as_of())
    }

    /// A diabetic applicant who answered the insulin question
    pub fn diabetic(insulin_use: bool) -> ApplicantProfile {
        Self::healthy_male()
            .with_condition("diabetes")
            .with_fact("diabetes.insulin_use", insulin_use)
            .with_fact("diabetes.a1c", 6.8)
    }

    /// A diabetic applicant who left every follow-up question blank
    pub fn diabetic_unanswered() -> ApplicantProfile {
        Self::healthy_male().with_condition("diabetes")
    }
}

/// Fixture for rule sets
pub struct RuleSetFixtures;

impl RuleSetFixtures {
    /// Diabetes rule set with only a catch-all rule
    pub fn diabetes_catch_all() -> RuleSet {
        RuleSetBuilder::new(IdFixtures::carrier_id())
            .with_id(IdFixtures::rule_set_id(1))
            .with_name("Transamerica diabetes")
            .for_condition("diabetes")
            .with_rule(Self::catch_all_rule())
            .build()
    }

    /// Diabetes rule set with an insulin decline ahead of the catch-all
    pub fn diabetes_with_insulin_decline() -> RuleSet {
        RuleSetBuilder::new(IdFixtures::carrier_id())
            .with_id(IdFixtures::rule_set_id(2))
            .with_name("Transamerica diabetes")
            .for_condition("diabetes")
            .with_rule(
                RuleBuilder::new("Insulin dependent")
                    .with_priority(5)
                    .when("diabetes.insulin_use", "eq", json!(true))
                    .with_outcome(Eligibility::Ineligible, HealthClass::Decline, INSULIN_DECLINE_REASON)
                    .build(),
            )
            .with_rule(Self::catch_all_rule())
            .build()
    }

    /// Product-level build chart: high BMI refers, everyone else is preferred
    pub fn build_chart() -> RuleSet {
        RuleSetBuilder::new(IdFixtures::carrier_id())
            .with_id(IdFixtures::rule_set_id(3))
            .with_name("Transamerica build chart")
            .with_rule(
                RuleBuilder::new("BMI over 40")
                    .with_priority(1)
                    .when("client.bmi", "gte", json!(40))
                    .with_outcome(Eligibility::Refer, HealthClass::Refer, "BMI over 40 needs review.")
                    .build(),
            )
            .with_rule(
                RuleBuilder::new("Preferred build")
                    .with_priority(10)
                    .with_outcome(Eligibility::Eligible, HealthClass::Preferred, "Build within preferred limits.")
                    .build(),
            )
            .build()
    }

    fn catch_all_rule() -> domain_underwriting::Rule {
        RuleBuilder::new("Diabetes catch-all")
            .with_priority(10)
            .with_outcome(Eligibility::Eligible, HealthClass::Standard, CATCH_ALL_REASON)
            .build()
    }
}

/// Fixture for premium matrix rows
pub struct PremiumFixtures;

impl PremiumFixtures {
    /// Male non-tobacco 20 year term rows at ages 40 and 50, faces 250k and 500k
    pub fn term_grid(rate_class: RateClass) -> Vec<PremiumMatrixRow> {
        let mut rows = Vec::new();
        for (age, face, monthly) in [
            (40, dec!(250000), dec!(20.00)),
            (40, dec!(500000), dec!(36.00)),
            (50, dec!(250000), dec!(40.00)),
            (50, dec!(500000), dec!(72.00)),
        ] {
            rows.push(
                PremiumRowBuilder::new()
                    .with_rate_class(rate_class)
                    .with_age(age)
                    .with_face_amount(face)
                    .with_monthly_premium(monthly)
                    .build(),
            );
        }
        rows
    }

    /// Male non-tobacco 20 year term row at age 45 for $250,000
    pub fn standard_row() -> PremiumMatrixRow {
        PremiumRowBuilder::new()
            .with_rate_class(RateClass::Standard)
            .with_monthly_premium(dec!(30.00))
            .build()
    }
}

/// A catalog with the diabetes and build chart rule sets and matching rates
pub static SAMPLE_SNAPSHOT: Lazy<UnderwritingSnapshot> = Lazy::new(|| {
    let mut premium_rows = vec![
        PremiumFixtures::standard_row(),
        PremiumRowBuilder::new()
            .with_rate_class(RateClass::Preferred)
            .with_monthly_premium(dec!(24.00))
            .build(),
    ];
    premium_rows.extend(PremiumFixtures::term_grid(RateClass::Standard));

    UnderwritingSnapshot::new(
        vec![
            RuleSetFixtures::diabetes_with_insulin_decline(),
            RuleSetFixtures::build_chart(),
        ],
        premium_rows,
    )
});
