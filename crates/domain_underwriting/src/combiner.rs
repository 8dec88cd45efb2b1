//! Verdict combination
//!
//! Merges the verdicts of independently evaluated rule sets into one
//! carrier/product decision. Every dimension combines by "worst of", and
//! verdicts are sorted before reasons and concerns are concatenated, so the
//! result does not depend on the order verdicts arrive in.

use core_kernel::RuleSetId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::classification::{Eligibility, FlatExtra, HealthClass, TableRating};
use crate::verdict::{Provenance, TriggeredRule, Verdict};

/// How flat extras from several verdicts are merged
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlatExtraComposition {
    /// Sum of per-thousand amounts, longest duration
    #[default]
    Sum,
    /// Largest per-thousand amount
    Max,
    /// The single extra with the largest per-thousand × years
    WorstOnly,
}

impl FlatExtraComposition {
    pub fn compose(&self, extras: &[FlatExtra]) -> Option<FlatExtra> {
        match self {
            FlatExtraComposition::Sum => {
                if extras.is_empty() {
                    return None;
                }
                let per_thousand: Decimal = extras.iter().map(|e| e.per_thousand).sum();
                let years = extras.iter().map(|e| e.years).max().unwrap_or_default();
                Some(FlatExtra::new(per_thousand, years))
            }
            FlatExtraComposition::Max => extras
                .iter()
                .copied()
                .max_by_key(|e| (e.per_thousand, e.years)),
            FlatExtraComposition::WorstOnly => extras
                .iter()
                .copied()
                .max_by_key(|e| (e.total_weight(), e.per_thousand, e.years)),
        }
    }
}

/// A reason and the verdict it came from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reason {
    pub text: String,
    pub provenance: Provenance,
}

/// Carrier/product-level decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalVerdict {
    pub eligibility: Eligibility,
    pub health_class: HealthClass,
    pub table_rating: TableRating,
    pub flat_extra: Option<FlatExtra>,
    pub reasons: Vec<Reason>,
    pub concerns: Vec<String>,
    pub triggered_rules: Vec<TriggeredRule>,
    pub missing_fields: Vec<String>,
    pub evaluated_rule_sets: Vec<RuleSetId>,
}

impl FinalVerdict {
    /// Reason texts without provenance
    pub fn reason_texts(&self) -> Vec<&str> {
        self.reasons.iter().map(|r| r.text.as_str()).collect()
    }

    pub fn is_eligible(&self) -> bool {
        self.eligibility == Eligibility::Eligible
    }
}

/// Combines verdicts using the default flat extra composition
pub fn combine(verdicts: &[Verdict]) -> FinalVerdict {
    combine_with(verdicts, FlatExtraComposition::default())
}

/// Combines verdicts
///
/// - eligibility: ineligible > refer > eligible; `refer` when there are no verdicts
/// - health class: worst over verdicts that are not ineligible; `decline`
///   when every verdict is ineligible, `unknown` when there are none
/// - table rating: worst; flat extras: per `composition`
pub fn combine_with(verdicts: &[Verdict], composition: FlatExtraComposition) -> FinalVerdict {
    let mut sorted: Vec<&Verdict> = verdicts.iter().collect();
    sorted.sort();

    let eligibility = if sorted.is_empty() {
        Eligibility::Refer
    } else {
        sorted
            .iter()
            .fold(Eligibility::Eligible, |acc, v| acc.worst(v.eligibility))
    };

    let health_class = if sorted.is_empty() {
        HealthClass::Unknown
    } else if sorted.iter().all(|v| v.is_ineligible()) {
        HealthClass::Decline
    } else {
        sorted
            .iter()
            .filter(|v| !v.is_ineligible())
            .fold(HealthClass::PreferredPlus, |acc, v| acc.worst(v.health_class))
    };

    let table_rating = sorted
        .iter()
        .map(|v| v.table_rating)
        .max()
        .unwrap_or_default();

    let extras: Vec<FlatExtra> = sorted.iter().filter_map(|v| v.flat_extra).collect();
    let flat_extra = composition.compose(&extras);

    let mut seen_reasons = BTreeSet::new();
    let mut reasons = Vec::new();
    let mut seen_concerns = BTreeSet::new();
    let mut concerns = Vec::new();
    let mut missing = BTreeSet::new();
    let mut evaluated = BTreeSet::new();
    let mut triggered_rules = Vec::new();

    for verdict in &sorted {
        for text in &verdict.reasons {
            if seen_reasons.insert(text.as_str()) {
                reasons.push(Reason {
                    text: text.clone(),
                    provenance: verdict.provenance.clone(),
                });
            }
        }
        for concern in &verdict.concerns {
            if seen_concerns.insert(concern.as_str()) {
                concerns.push(concern.clone());
            }
        }
        missing.extend(verdict.missing_fields.iter().cloned());
        evaluated.extend(verdict.provenance.rule_set_id);
        triggered_rules.extend(verdict.triggered_rule.clone());
    }

    FinalVerdict {
        eligibility,
        health_class,
        table_rating,
        flat_extra,
        reasons,
        concerns,
        triggered_rules,
        missing_fields: missing.into_iter().collect(),
        evaluated_rule_sets: evaluated.into_iter().collect(),
    }
}
