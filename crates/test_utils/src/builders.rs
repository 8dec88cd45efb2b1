//! Test Data Builders
//!
//! Provides builder patterns for constructing test data with sensible defaults.
//! These builders allow tests to specify only the relevant fields while using
//! defaults for everything else.

use chrono::{DateTime, Utc};
use core_kernel::{CarrierId, ImoId, PremiumRowId, ProductId, RuleId, RuleSetId};
use domain_quoting::EvaluationRequest;
use domain_rating::{PolicyParams, PremiumMatrixRow, RateClass, TobaccoClass};
use domain_underwriting::{
    ApplicantProfile, Eligibility, FlatExtra, Gender, HealthClass, ReviewStatus, Rule, RuleOutcome,
    RuleSet, RuleSetScope, TableRating, DEFAULT_VARIANT, PREDICATE_VERSION,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

use crate::fixtures::{IdFixtures, ProfileFixtures, TemporalFixtures};

/// Builder for constructing test rules
///
/// Defaults to a catch-all rule at priority 10 with an eligible/standard
/// outcome.
pub struct RuleBuilder {
    id: RuleId,
    name: String,
    priority: i32,
    created_at: DateTime<Utc>,
    age_band: (Option<u32>, Option<u32>),
    gender: Option<Gender>,
    predicate: Value,
    predicate_version: u32,
    outcome: RuleOutcome,
}

impl RuleBuilder {
    /// Creates a new catch-all rule builder
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: RuleId::new(),
            name: name.into(),
            priority: 10,
            created_at: TemporalFixtures::created_at(),
            age_band: (None, None),
            gender: None,
            predicate: json!({}),
            predicate_version: PREDICATE_VERSION,
            outcome: RuleOutcome::new(Eligibility::Eligible, HealthClass::Standard, "standard"),
        }
    }

    /// Sets the rule ID
    pub fn with_id(mut self, id: RuleId) -> Self {
        self.id = id;
        self
    }

    /// Sets the priority (lower runs first)
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the creation timestamp used to break priority ties
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Restricts the rule to an age band
    pub fn with_age_band(mut self, min: Option<u32>, max: Option<u32>) -> Self {
        self.age_band = (min, max);
        self
    }

    /// Restricts the rule to one gender
    pub fn for_gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }

    /// Sets the raw predicate JSON
    pub fn with_predicate(mut self, predicate: Value) -> Self {
        self.predicate = predicate;
        self
    }

    /// Sets the predicate to a single comparison
    pub fn when(mut self, field: &str, operator: &str, value: Value) -> Self {
        self.predicate = json!({ "field": field, "operator": operator, "value": value });
        self
    }

    /// Sets the predicate format version
    pub fn with_predicate_version(mut self, version: u32) -> Self {
        self.predicate_version = version;
        self
    }

    /// Sets eligibility, class and reason of the outcome
    pub fn with_outcome(
        mut self,
        eligibility: Eligibility,
        health_class: HealthClass,
        reason: impl Into<String>,
    ) -> Self {
        self.outcome.eligibility = eligibility;
        self.outcome.health_class = health_class;
        self.outcome.reason = reason.into();
        self
    }

    /// Sets the table rating of the outcome
    pub fn with_table_rating(mut self, rating: TableRating) -> Self {
        self.outcome.table_rating = rating;
        self
    }

    /// Sets the flat extra of the outcome
    pub fn with_flat_extra(mut self, per_thousand: Decimal, years: u32) -> Self {
        self.outcome.flat_extra = Some(FlatExtra::new(per_thousand, years));
        self
    }

    /// Adds a concern to the outcome
    pub fn with_concern(mut self, concern: impl Into<String>) -> Self {
        self.outcome.concerns.push(concern.into());
        self
    }

    /// Builds the rule
    pub fn build(self) -> Rule {
        Rule {
            id: self.id,
            name: self.name,
            priority: self.priority,
            created_at: self.created_at,
            age_band_min: self.age_band.0,
            age_band_max: self.age_band.1,
            gender: self.gender,
            predicate: self.predicate,
            predicate_version: self.predicate_version,
            outcome: self.outcome,
        }
    }
}

/// Builder for constructing test rule sets
///
/// Defaults to an approved, active, product-level rule set for the fixture
/// product.
pub struct RuleSetBuilder {
    rule_set: RuleSet,
}

impl RuleSetBuilder {
    /// Creates a new builder for a carrier
    pub fn new(carrier_id: CarrierId) -> Self {
        Self {
            rule_set: RuleSet {
                id: RuleSetId::new(),
                imo_id: None,
                carrier_id,
                product_id: Some(IdFixtures::product_id()),
                scope: RuleSetScope::Product,
                condition_code: None,
                variant: DEFAULT_VARIANT.to_string(),
                name: "Test rule set".to_string(),
                is_active: true,
                version: 1,
                review_status: ReviewStatus::Approved,
                default_outcome: None,
                rules: Vec::new(),
            },
        }
    }

    /// Sets the rule set ID
    pub fn with_id(mut self, id: RuleSetId) -> Self {
        self.rule_set.id = id;
        self
    }

    /// Sets the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.rule_set.name = name.into();
        self
    }

    /// Scopes the rule set to a condition code
    pub fn for_condition(mut self, code: impl Into<String>) -> Self {
        self.rule_set.scope = RuleSetScope::Condition;
        self.rule_set.condition_code = Some(code.into());
        self
    }

    /// Sets the product, `None` for a carrier-wide rule set
    pub fn with_product(mut self, product_id: Option<ProductId>) -> Self {
        self.rule_set.product_id = product_id;
        self
    }

    /// Sets the owning IMO
    pub fn with_imo(mut self, imo_id: ImoId) -> Self {
        self.rule_set.imo_id = Some(imo_id);
        self
    }

    /// Sets the variant
    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.rule_set.variant = variant.into();
        self
    }

    /// Sets the version
    pub fn with_version(mut self, version: u32) -> Self {
        self.rule_set.version = version;
        self
    }

    /// Sets the review status
    pub fn with_review_status(mut self, status: ReviewStatus) -> Self {
        self.rule_set.review_status = status;
        self
    }

    /// Marks the rule set inactive
    pub fn inactive(mut self) -> Self {
        self.rule_set.is_active = false;
        self
    }

    /// Sets the verdict used when no rule matches
    pub fn with_default_outcome(mut self, outcome: RuleOutcome) -> Self {
        self.rule_set.default_outcome = Some(outcome);
        self
    }

    /// Adds a rule
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rule_set.rules.push(rule);
        self
    }

    /// Builds the rule set
    pub fn build(self) -> RuleSet {
        self.rule_set
    }
}

/// Builder for constructing premium matrix rows
///
/// Defaults to the fixture carrier and product, male non-tobacco standard,
/// 20 year term, age 45, $250,000 face at $30.00 a month.
pub struct PremiumRowBuilder {
    row: PremiumMatrixRow,
}

impl Default for PremiumRowBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PremiumRowBuilder {
    /// Creates a new builder with default values
    pub fn new() -> Self {
        Self {
            row: PremiumMatrixRow {
                id: PremiumRowId::new(),
                imo_id: None,
                carrier_id: IdFixtures::carrier_id(),
                product_id: IdFixtures::product_id(),
                gender: Gender::Male,
                tobacco_class: TobaccoClass::NonTobacco,
                rate_class: RateClass::Standard,
                term_years: Some(20),
                age: 45,
                face_amount: dec!(250000),
                monthly_premium: dec!(30.00),
            },
        }
    }

    /// Sets the carrier
    pub fn with_carrier(mut self, carrier_id: CarrierId) -> Self {
        self.row.carrier_id = carrier_id;
        self
    }

    /// Sets the owning IMO
    pub fn with_imo(mut self, imo_id: ImoId) -> Self {
        self.row.imo_id = Some(imo_id);
        self
    }

    /// Sets the gender
    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.row.gender = gender;
        self
    }

    /// Sets the tobacco class
    pub fn with_tobacco_class(mut self, class: TobaccoClass) -> Self {
        self.row.tobacco_class = class;
        self
    }

    /// Sets the rate class
    pub fn with_rate_class(mut self, class: RateClass) -> Self {
        self.row.rate_class = class;
        self
    }

    /// Sets the term, `None` for permanent products
    pub fn with_term_years(mut self, term_years: Option<u32>) -> Self {
        self.row.term_years = term_years;
        self
    }

    /// Sets the issue age
    pub fn with_age(mut self, age: u32) -> Self {
        self.row.age = age;
        self
    }

    /// Sets the face amount
    pub fn with_face_amount(mut self, face_amount: Decimal) -> Self {
        self.row.face_amount = face_amount;
        self
    }

    /// Sets the monthly premium
    pub fn with_monthly_premium(mut self, monthly: Decimal) -> Self {
        self.row.monthly_premium = monthly;
        self
    }

    /// Builds the row
    pub fn build(self) -> PremiumMatrixRow {
        self.row
    }
}

/// Builder for constructing evaluation requests
///
/// Defaults to the fixture carrier and product, a healthy 45 year old male
/// and $250,000 of 20 year term.
pub struct RequestBuilder {
    request: EvaluationRequest,
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestBuilder {
    /// Creates a new builder with default values
    pub fn new() -> Self {
        Self {
            request: EvaluationRequest::new(
                IdFixtures::carrier_id(),
                Some(IdFixtures::product_id()),
                ProfileFixtures::healthy_male(),
                PolicyParams::term(dec!(250000), 20),
            ),
        }
    }

    /// Sets the carrier
    pub fn with_carrier(mut self, carrier_id: CarrierId) -> Self {
        self.request.carrier_id = carrier_id;
        self
    }

    /// Sets the product
    pub fn with_product(mut self, product_id: Option<ProductId>) -> Self {
        self.request.product_id = product_id;
        self
    }

    /// Sets the requesting IMO
    pub fn with_imo(mut self, imo_id: ImoId) -> Self {
        self.request.imo_id = Some(imo_id);
        self
    }

    /// Sets the rule set variant
    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.request.variant = Some(variant.into());
        self
    }

    /// Sets the applicant profile
    pub fn with_profile(mut self, profile: ApplicantProfile) -> Self {
        self.request.applicant_profile = profile;
        self
    }

    /// Sets the coverage
    pub fn with_policy_params(mut self, params: PolicyParams) -> Self {
        self.request.policy_params = params;
        self
    }

    /// Builds the request
    pub fn build(self) -> EvaluationRequest {
        self.request
    }
}
