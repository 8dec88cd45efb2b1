//! Rule set evaluation
//!
//! Rules are walked in priority order as a fold with early exit: the first
//! rule whose predicate is `True` decides the verdict. `False` and `Unknown`
//! move on to the next rule; a [`DataError`] stops the walk and the set is
//! referred with the error attached. When nothing matches, the set's
//! default outcome applies, or a refer if it has none.

use std::collections::BTreeSet;
use std::ops::ControlFlow;
use tracing::{debug, warn};

use crate::error::DataError;
use crate::predicate::{evaluate_traced, Truth};
use crate::profile::ApplicantProfile;
use crate::rules::{Rule, RuleSet};
use crate::verdict::{Provenance, Verdict, NO_MATCH_REASON};

enum Stop<'a> {
    Matched(&'a Rule),
    Failed(&'a Rule, DataError),
}

/// Evaluates one rule set against a profile
pub fn evaluate_rule_set(rule_set: &RuleSet, profile: &ApplicantProfile) -> Verdict {
    let mut missing = BTreeSet::new();

    let walk = rule_set
        .ordered_rules()
        .into_iter()
        .filter(|rule| {
            let applies = rule.applies_to(profile);
            if !applies {
                debug!(rule_set_id = %rule_set.id, rule_id = %rule.id, "rule filtered out by age band or gender");
            }
            applies
        })
        .try_for_each(|rule| {
            let evaluation = match rule
                .parsed_predicate()
                .and_then(|predicate| evaluate_traced(&predicate, profile))
            {
                Ok(evaluation) => evaluation,
                Err(err) => return ControlFlow::Break(Stop::Failed(rule, err)),
            };

            debug!(
                rule_set_id = %rule_set.id,
                rule_id = %rule.id,
                priority = rule.priority,
                truth = ?evaluation.truth,
                "rule evaluated"
            );

            match evaluation.truth {
                Truth::True => ControlFlow::Break(Stop::Matched(rule)),
                Truth::False => ControlFlow::Continue(()),
                Truth::Unknown => {
                    missing.extend(evaluation.missing_fields);
                    ControlFlow::Continue(())
                }
            }
        });

    match walk {
        ControlFlow::Break(Stop::Matched(rule)) => {
            Verdict::matched(rule_set, rule).with_missing_fields(missing)
        }
        ControlFlow::Break(Stop::Failed(rule, err)) => {
            warn!(
                rule_set_id = %rule_set.id,
                rule_id = %rule.id,
                error = %err,
                "rule could not be evaluated; referring rule set"
            );
            let mut verdict = Verdict::refer(
                Provenance::for_rule_set(rule_set).with_rule(rule.id),
                format!("Rule '{}' could not be evaluated: {}", rule.name, err),
            );
            verdict.data_error = Some(err.to_string());
            verdict.with_missing_fields(missing)
        }
        ControlFlow::Continue(()) => {
            debug!(rule_set_id = %rule_set.id, defaulted = rule_set.default_outcome.is_some(), "no rule matched");
            let mut verdict = match &rule_set.default_outcome {
                Some(outcome) => Verdict::defaulted(rule_set, outcome),
                None => Verdict::refer(Provenance::for_rule_set(rule_set), NO_MATCH_REASON),
            };
            if !missing.is_empty() {
                let fields: Vec<&str> = missing.iter().map(String::as_str).collect();
                verdict
                    .concerns
                    .push(format!("missing data: {}", fields.join(", ")));
            }
            verdict.with_missing_fields(missing)
        }
    }
}
