//! Static checks over rule sets
//!
//! Catches authoring mistakes before a set is approved: predicates that will
//! never evaluate, impossible filters, and ambiguous or unreachable rules.

use core_kernel::RuleId;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::classification::{Eligibility, HealthClass};
use crate::error::UnderwritingError;
use crate::predicate::Predicate;
use crate::rules::{RuleSet, RuleSetScope};

/// One finding, optionally pinned to a rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub rule_id: Option<RuleId>,
    pub message: String,
}

/// Errors block approval; warnings do not
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, rule_id: Option<RuleId>, message: impl Into<String>) {
        self.errors.push(ValidationIssue { rule_id, message: message.into() });
    }

    fn warn(&mut self, rule_id: Option<RuleId>, message: impl Into<String>) {
        self.warnings.push(ValidationIssue { rule_id, message: message.into() });
    }
}

/// Validates a rule set
pub fn validate_rule_set(rule_set: &RuleSet) -> ValidationReport {
    let mut report = ValidationReport::default();

    if rule_set.scope == RuleSetScope::Condition
        && rule_set.condition_code.as_deref().map_or(true, str::is_empty)
    {
        report.error(None, "condition-scoped rule set has no condition_code");
    }
    if rule_set.rules.is_empty() {
        report.warn(None, "rule set has no rules; every applicant will be referred");
    }

    let mut ids = BTreeSet::new();
    let mut by_priority: BTreeMap<i32, Vec<RuleId>> = BTreeMap::new();

    for rule in &rule_set.rules {
        if !ids.insert(rule.id) {
            report.error(Some(rule.id), format!("duplicate rule id {}", rule.id));
        }
        by_priority.entry(rule.priority).or_default().push(rule.id);

        if let (Some(min), Some(max)) = (rule.age_band_min, rule.age_band_max) {
            if min > max {
                report.error(
                    Some(rule.id),
                    format!("rule '{}' age band {}..{} is empty", rule.name, min, max),
                );
            }
        }

        if let Err(err) = rule.parsed_predicate() {
            report.error(Some(rule.id), format!("rule '{}': {}", rule.name, err));
        }

        let outcome = &rule.outcome;
        if outcome.eligibility == Eligibility::Eligible && outcome.health_class >= HealthClass::Refer {
            report.warn(
                Some(rule.id),
                format!(
                    "rule '{}' is eligible but assigns {}",
                    rule.name, outcome.health_class
                ),
            );
        }
        if outcome.reason.trim().is_empty() {
            report.warn(Some(rule.id), format!("rule '{}' has no reason", rule.name));
        }
    }

    for (priority, rules) in &by_priority {
        if rules.len() > 1 {
            report.warn(
                None,
                format!(
                    "{} rules share priority {}; ties resolve by creation time",
                    rules.len(),
                    priority
                ),
            );
        }
    }

    let ordered = rule_set.ordered_rules();
    let catch_all = ordered.iter().position(|rule| {
        rule.age_band_min.is_none()
            && rule.age_band_max.is_none()
            && rule.gender.is_none()
            && matches!(rule.parsed_predicate(), Ok(Predicate::Always))
    });
    match catch_all {
        None if !ordered.is_empty() => {
            report.warn(None, "no catch-all rule; unmatched applicants will be referred")
        }
        Some(index) => {
            for unreachable in &ordered[index + 1..] {
                report.warn(
                    Some(unreachable.id),
                    format!("rule '{}' follows a catch-all and can never match", unreachable.name),
                );
            }
        }
        None => {}
    }

    report
}

/// Rejects a rule set that has validation errors
///
/// Warnings are not fatal.
pub fn ensure_valid(rule_set: &RuleSet) -> Result<(), UnderwritingError> {
    let report = validate_rule_set(rule_set);
    if report.is_valid() {
        return Ok(());
    }
    Err(UnderwritingError::InvalidRuleSet {
        rule_set_id: rule_set.id,
        issues: report.errors.into_iter().map(|issue| issue.message).collect(),
    })
}
