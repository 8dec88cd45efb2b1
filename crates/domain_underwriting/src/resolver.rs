//! Rule set resolution
//!
//! Picks the rule sets that apply to a carrier/product selector and the
//! conditions an applicant reports, then narrows condition sets down to one
//! per condition code.

use core_kernel::{CarrierId, ImoId, ProductId};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};

use crate::rules::{RuleSet, RuleSetScope, DEFAULT_VARIANT};

/// Which carrier/product (and optionally IMO and variant) a request targets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selector {
    #[serde(default)]
    pub imo_id: Option<ImoId>,
    pub carrier_id: CarrierId,
    #[serde(default)]
    pub product_id: Option<ProductId>,
    #[serde(default = "default_variant")]
    pub variant: String,
}

fn default_variant() -> String {
    DEFAULT_VARIANT.to_string()
}

impl Selector {
    pub fn new(carrier_id: CarrierId, product_id: Option<ProductId>) -> Self {
        Self {
            imo_id: None,
            carrier_id,
            product_id,
            variant: default_variant(),
        }
    }

    pub fn with_imo(mut self, imo_id: ImoId) -> Self {
        self.imo_id = Some(imo_id);
        self
    }

    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = variant.into();
        self
    }

    /// Carrier, product and IMO match, ignoring status and scope
    ///
    /// Shared sets are visible to everyone; IMO-owned sets only to that IMO.
    pub(crate) fn admits(&self, rule_set: &RuleSet) -> bool {
        rule_set.carrier_id == self.carrier_id
            && rule_set.product_id.map_or(true, |p| Some(p) == self.product_id)
            && rule_set.imo_id.map_or(true, |owner| Some(owner) == self.imo_id)
    }
}

/// Every evaluable rule set that applies to the selector and conditions
///
/// No ordering between the returned sets is implied.
pub fn resolve<'a>(
    selector: &Selector,
    conditions_present: &BTreeSet<String>,
    catalog: &'a [RuleSet],
) -> Vec<&'a RuleSet> {
    catalog
        .iter()
        .filter(|rs| rs.is_evaluable() && selector.admits(rs))
        .filter(|rs| match rs.scope {
            RuleSetScope::Product => true,
            RuleSetScope::Condition => rs
                .condition_code
                .as_ref()
                .is_some_and(|code| conditions_present.contains(code)),
        })
        .collect()
}

/// Rule sets chosen for one evaluation
#[derive(Debug, Clone, Default)]
pub struct Selection<'a> {
    /// Product-wide sets, all evaluated
    pub product_sets: Vec<&'a RuleSet>,
    /// Exactly one set per covered condition
    pub condition_sets: BTreeMap<String, &'a RuleSet>,
    /// Reported conditions no approved set answers for
    pub uncovered: Vec<String>,
}

impl<'a> Selection<'a> {
    /// All chosen sets in a stable order
    pub fn rule_sets(&self) -> impl Iterator<Item = &'a RuleSet> + '_ {
        self.product_sets
            .iter()
            .copied()
            .chain(self.condition_sets.values().copied())
    }

    pub fn is_empty(&self) -> bool {
        self.product_sets.is_empty() && self.condition_sets.is_empty()
    }
}

/// Resolves and then keeps one rule set per condition
///
/// Preference among candidates for the same condition: the requested
/// variant, then the IMO's own set over a shared one, then product-specific
/// over carrier-wide, then the highest version, then the smallest id.
pub fn select<'a>(
    selector: &Selector,
    conditions_present: &BTreeSet<String>,
    catalog: &'a [RuleSet],
) -> Selection<'a> {
    let mut selection = Selection::default();
    let mut candidates: BTreeMap<&str, Vec<&'a RuleSet>> = BTreeMap::new();

    for rule_set in resolve(selector, conditions_present, catalog) {
        match rule_set.condition() {
            Some(code) => candidates.entry(code).or_default().push(rule_set),
            None => selection.product_sets.push(rule_set),
        }
    }
    selection.product_sets.sort_by_key(|rs| rs.id);

    for (code, sets) in candidates {
        let best = sets.into_iter().min_by_key(|rs| {
            (
                rs.variant != selector.variant,
                rs.imo_id.is_none(),
                rs.product_id.is_none(),
                Reverse(rs.version),
                rs.id,
            )
        });
        if let Some(best) = best {
            selection.condition_sets.insert(code.to_string(), best);
        }
    }

    selection.uncovered = conditions_present
        .iter()
        .filter(|code| !selection.condition_sets.contains_key(*code))
        .cloned()
        .collect();

    selection
}
