//! Rule sets and rules
//!
//! A [`RuleSet`] is a versioned, reviewed collection of [`Rule`]s scoped to a
//! carrier (optionally a product) and either a condition code or the product
//! as a whole. Rules are walked in `(priority, created_at, id)` order.

use chrono::{DateTime, Utc};
use core_kernel::{CarrierId, ImoId, ProductId, RuleId, RuleSetId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::classification::{Eligibility, FlatExtra, Gender, HealthClass, TableRating};
use crate::error::DataError;
use crate::predicate::{Predicate, PREDICATE_VERSION};
use crate::profile::ApplicantProfile;

/// Variant name used when a request does not ask for one
pub const DEFAULT_VARIANT: &str = "default";

/// What a rule set is keyed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleSetScope {
    /// Evaluated only when the applicant reports the set's condition
    Condition,
    /// Evaluated for every applicant of the carrier/product
    #[serde(alias = "global")]
    Product,
}

/// Review workflow state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Draft,
    PendingReview,
    Approved,
    Rejected,
}

/// The verdict a rule produces when its predicate matches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleOutcome {
    pub eligibility: Eligibility,
    pub health_class: HealthClass,
    #[serde(default)]
    pub table_rating: TableRating,
    #[serde(default)]
    pub flat_extra: Option<FlatExtra>,
    pub reason: String,
    #[serde(default)]
    pub concerns: Vec<String>,
}

impl RuleOutcome {
    pub fn new(eligibility: Eligibility, health_class: HealthClass, reason: impl Into<String>) -> Self {
        Self {
            eligibility,
            health_class,
            table_rating: TableRating::None,
            flat_extra: None,
            reason: reason.into(),
            concerns: Vec::new(),
        }
    }
}

/// A single prioritized rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: RuleId,
    pub name: String,
    /// Lower runs first
    pub priority: i32,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub age_band_min: Option<u32>,
    #[serde(default)]
    pub age_band_max: Option<u32>,
    #[serde(default)]
    pub gender: Option<Gender>,
    /// Stored predicate JSON, parsed at evaluation time
    #[serde(default)]
    pub predicate: Value,
    #[serde(default = "default_predicate_version")]
    pub predicate_version: u32,
    pub outcome: RuleOutcome,
}

fn default_predicate_version() -> u32 {
    PREDICATE_VERSION
}

impl Rule {
    /// Whether the age band and gender filter admit the applicant
    pub fn applies_to(&self, profile: &ApplicantProfile) -> bool {
        if self.age_band_min.is_some_and(|min| profile.age < min) {
            return false;
        }
        if self.age_band_max.is_some_and(|max| profile.age > max) {
            return false;
        }
        self.gender.map_or(true, |g| g == profile.gender)
    }

    /// Parses the stored predicate
    pub fn parsed_predicate(&self) -> Result<Predicate, DataError> {
        Predicate::parse(&self.predicate, self.predicate_version)
    }

    /// Stable ordering key
    pub fn sort_key(&self) -> (i32, DateTime<Utc>, RuleId) {
        (self.priority, self.created_at, self.id)
    }
}

/// A versioned collection of rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    pub id: RuleSetId,
    #[serde(default)]
    pub imo_id: Option<ImoId>,
    pub carrier_id: CarrierId,
    /// `None` applies carrier-wide
    #[serde(default)]
    pub product_id: Option<ProductId>,
    pub scope: RuleSetScope,
    #[serde(default)]
    pub condition_code: Option<String>,
    #[serde(default = "default_variant")]
    pub variant: String,
    pub name: String,
    pub is_active: bool,
    pub version: u32,
    pub review_status: ReviewStatus,
    /// Verdict when no rule matches; `None` refers for manual review
    #[serde(default)]
    pub default_outcome: Option<RuleOutcome>,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

fn default_variant() -> String {
    DEFAULT_VARIANT.to_string()
}

impl RuleSet {
    /// Only active, approved sets are ever evaluated
    pub fn is_evaluable(&self) -> bool {
        self.is_active && self.review_status == ReviewStatus::Approved
    }

    /// Rules in evaluation order
    pub fn ordered_rules(&self) -> Vec<&Rule> {
        let mut rules: Vec<&Rule> = self.rules.iter().collect();
        rules.sort_by_key(|r| r.sort_key());
        rules
    }

    /// Condition this set answers for, if condition scoped
    pub fn condition(&self) -> Option<&str> {
        match self.scope {
            RuleSetScope::Condition => self.condition_code.as_deref(),
            RuleSetScope::Product => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn rule(priority: i32, seconds: i64) -> Rule {
        Rule {
            id: RuleId::new(),
            name: format!("p{}", priority),
            priority,
            created_at: Utc.timestamp_opt(1_700_000_000 + seconds, 0).unwrap(),
            age_band_min: None,
            age_band_max: None,
            gender: None,
            predicate: json!({}),
            predicate_version: PREDICATE_VERSION,
            outcome: RuleOutcome::new(Eligibility::Eligible, HealthClass::Standard, "ok"),
        }
    }

    #[test]
    fn test_ordered_by_priority_then_created_at() {
        let set_rules = vec![rule(10, 0), rule(5, 9), rule(5, 1)];
        let expected = vec![set_rules[2].id, set_rules[1].id, set_rules[0].id];
        let set = RuleSet {
            id: RuleSetId::new(),
            imo_id: None,
            carrier_id: CarrierId::new(),
            product_id: None,
            scope: RuleSetScope::Condition,
            condition_code: Some("diabetes".into()),
            variant: DEFAULT_VARIANT.into(),
            name: "Diabetes".into(),
            is_active: true,
            version: 1,
            review_status: ReviewStatus::Approved,
            default_outcome: None,
            rules: set_rules,
        };

        let ordered: Vec<RuleId> = set.ordered_rules().iter().map(|r| r.id).collect();
        assert_eq!(ordered, expected);
        assert_eq!(set.condition(), Some("diabetes"));
    }

    #[test]
    fn test_applicability_filter() {
        let mut r = rule(1, 0);
        r.age_band_min = Some(18);
        r.age_band_max = Some(60);
        r.gender = Some(Gender::Female);

        assert!(r.applies_to(&ApplicantProfile::new(40, Gender::Female, false)));
        assert!(!r.applies_to(&ApplicantProfile::new(40, Gender::Male, false)));
        assert!(!r.applies_to(&ApplicantProfile::new(61, Gender::Female, false)));
        assert!(!r.applies_to(&ApplicantProfile::new(17, Gender::Female, false)));
    }

    #[test]
    fn test_global_scope_alias() {
        let scope: RuleSetScope = serde_json::from_str("\"global\"").unwrap();
        assert_eq!(scope, RuleSetScope::Product);
    }
}
