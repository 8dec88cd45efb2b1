//! Per-rule-set verdicts

use core_kernel::{RuleId, RuleSetId};
use serde::{Deserialize, Serialize};

use crate::classification::{Eligibility, FlatExtra, HealthClass, TableRating};
use crate::rules::{Rule, RuleOutcome, RuleSet};

/// Reason attached when no rule in a set matched
pub const NO_MATCH_REASON: &str = "No matching rule - manual review required";

/// Reason attached when an applicant reports no conditions and no set applies
pub const CLEAN_PROFILE_REASON: &str = "No reported conditions and no rule set applies";

/// Concern attached when a reported condition has no approved rule set
pub const NO_RULE_SET_CONCERN: &str = "no approved rule set found - manual review required";

/// Where a verdict came from
///
/// Field order is the sort key the combiner uses to make its output
/// independent of input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Provenance {
    pub condition_code: Option<String>,
    pub rule_set_id: Option<RuleSetId>,
    pub rule_set_name: Option<String>,
    pub rule_id: Option<RuleId>,
}

impl Provenance {
    pub fn for_rule_set(rule_set: &RuleSet) -> Self {
        Self {
            condition_code: rule_set.condition().map(str::to_string),
            rule_set_id: Some(rule_set.id),
            rule_set_name: Some(rule_set.name.clone()),
            rule_id: None,
        }
    }

    /// Provenance of a reported condition nothing answers for
    pub fn for_condition(code: impl Into<String>) -> Self {
        Self {
            condition_code: Some(code.into()),
            rule_set_id: None,
            rule_set_name: None,
            rule_id: None,
        }
    }

    pub fn with_rule(mut self, rule_id: RuleId) -> Self {
        self.rule_id = Some(rule_id);
        self
    }
}

/// A rule whose predicate matched
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TriggeredRule {
    pub rule_set_id: RuleSetId,
    pub rule_id: RuleId,
    pub rule_name: String,
    pub priority: i32,
    pub condition_code: Option<String>,
}

/// Outcome of evaluating one rule set
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Verdict {
    pub provenance: Provenance,
    pub eligibility: Eligibility,
    pub health_class: HealthClass,
    pub table_rating: TableRating,
    pub flat_extra: Option<FlatExtra>,
    pub reasons: Vec<String>,
    pub concerns: Vec<String>,
    pub triggered_rule: Option<TriggeredRule>,
    /// Fields whose absence left some rule unknown
    pub missing_fields: Vec<String>,
    /// Set when a rule's predicate could not be evaluated
    pub data_error: Option<String>,
}

impl Verdict {
    /// Manual-review verdict with an unknown class
    pub fn refer(provenance: Provenance, reason: impl Into<String>) -> Self {
        Self {
            provenance,
            eligibility: Eligibility::Refer,
            health_class: HealthClass::Unknown,
            table_rating: TableRating::None,
            flat_extra: None,
            reasons: vec![reason.into()],
            concerns: Vec::new(),
            triggered_rule: None,
            missing_fields: Vec::new(),
            data_error: None,
        }
    }

    /// Verdict produced by a matched rule
    pub fn matched(rule_set: &RuleSet, rule: &Rule) -> Self {
        let outcome = &rule.outcome;
        Self {
            provenance: Provenance::for_rule_set(rule_set).with_rule(rule.id),
            eligibility: outcome.eligibility,
            health_class: outcome.health_class,
            table_rating: outcome.table_rating,
            flat_extra: outcome.flat_extra,
            reasons: vec![outcome.reason.clone()],
            concerns: outcome.concerns.clone(),
            triggered_rule: Some(TriggeredRule {
                rule_set_id: rule_set.id,
                rule_id: rule.id,
                rule_name: rule.name.clone(),
                priority: rule.priority,
                condition_code: rule_set.condition().map(str::to_string),
            }),
            missing_fields: Vec::new(),
            data_error: None,
        }
    }

    /// Eligible verdict for an applicant with nothing to underwrite
    pub fn clean(health_class: HealthClass) -> Self {
        let mut verdict = Self::refer(Provenance::default(), CLEAN_PROFILE_REASON);
        verdict.eligibility = Eligibility::Eligible;
        verdict.health_class = health_class;
        verdict
    }

    /// Verdict from a set's default outcome when none of its rules matched
    pub fn defaulted(rule_set: &RuleSet, outcome: &RuleOutcome) -> Self {
        Self {
            provenance: Provenance::for_rule_set(rule_set),
            eligibility: outcome.eligibility,
            health_class: outcome.health_class,
            table_rating: outcome.table_rating,
            flat_extra: outcome.flat_extra,
            reasons: vec![outcome.reason.clone()],
            concerns: outcome.concerns.clone(),
            triggered_rule: None,
            missing_fields: Vec::new(),
            data_error: None,
        }
    }

    /// Verdict for a reported condition with no approved rule set
    pub fn no_rule_set(condition_code: &str) -> Self {
        let mut verdict = Self::refer(
            Provenance::for_condition(condition_code),
            format!("No approved rule set found for condition '{}'", condition_code),
        );
        verdict.concerns.push(NO_RULE_SET_CONCERN.to_string());
        verdict
    }

    pub fn with_missing_fields(mut self, fields: impl IntoIterator<Item = String>) -> Self {
        self.missing_fields.extend(fields);
        self.missing_fields.sort();
        self.missing_fields.dedup();
        self
    }

    pub fn is_ineligible(&self) -> bool {
        self.eligibility == Eligibility::Ineligible
    }
}
