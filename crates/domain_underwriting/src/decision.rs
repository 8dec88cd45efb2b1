//! End-to-end underwriting decision for one applicant

use tracing::{debug, info, warn};

use crate::classification::HealthClass;
use crate::combiner::{combine_with, FinalVerdict, FlatExtraComposition};
use crate::evaluator::evaluate_rule_set;
use crate::profile::ApplicantProfile;
use crate::resolver::{select, Selector};
use crate::rules::RuleSet;
use crate::verdict::{Provenance, Verdict};

/// Class given to a condition-free applicant when no rule set applies
pub const DEFAULT_CLEAN_PROFILE_CLASS: HealthClass = HealthClass::Preferred;

/// Resolves, evaluates and combines the rule sets for one selector
///
/// Uses [`DEFAULT_CLEAN_PROFILE_CLASS`] for applicants with nothing to
/// underwrite; see [`underwrite_with`].
pub fn underwrite(
    catalog: &[RuleSet],
    selector: &Selector,
    profile: &ApplicantProfile,
    composition: FlatExtraComposition,
) -> FinalVerdict {
    underwrite_with(catalog, selector, profile, composition, DEFAULT_CLEAN_PROFILE_CLASS)
}

/// Resolves, evaluates and combines the rule sets for one selector
///
/// Never fails. A carrier/product with no approved rule sets at all, or a
/// reported condition nothing answers for, yields a `refer` verdict with the
/// configuration problem in its reasons. An applicant who reports no
/// conditions, against a carrier whose sets are all condition scoped, is
/// eligible at `clean_profile_class`.
pub fn underwrite_with(
    catalog: &[RuleSet],
    selector: &Selector,
    profile: &ApplicantProfile,
    composition: FlatExtraComposition,
    clean_profile_class: HealthClass,
) -> FinalVerdict {
    let conditions = profile.conditions_present();
    let selection = select(selector, &conditions, catalog);

    let mut verdicts: Vec<Verdict> = selection
        .rule_sets()
        .map(|rule_set| evaluate_rule_set(rule_set, profile))
        .collect();

    for code in &selection.uncovered {
        warn!(carrier_id = %selector.carrier_id, condition = %code, "no approved rule set for reported condition");
        verdicts.push(Verdict::no_rule_set(code));
    }

    let configured = catalog
        .iter()
        .any(|rule_set| rule_set.is_evaluable() && selector.admits(rule_set));
    if !configured {
        warn!(
            carrier_id = %selector.carrier_id,
            product_id = ?selector.product_id,
            "no approved rule sets configured"
        );
        verdicts.push(Verdict::refer(
            Provenance::default(),
            configuration_reason(selector),
        ));
    } else if selection.is_empty() && selection.uncovered.is_empty() {
        debug!(carrier_id = %selector.carrier_id, "no conditions reported and no product rule set");
        verdicts.push(Verdict::clean(clean_profile_class));
    }

    let verdict = combine_with(&verdicts, composition);
    info!(
        carrier_id = %selector.carrier_id,
        rule_sets = verdict.evaluated_rule_sets.len(),
        eligibility = %verdict.eligibility,
        health_class = %verdict.health_class,
        "underwriting decision"
    );
    verdict
}

fn configuration_reason(selector: &Selector) -> String {
    match selector.product_id {
        Some(product) => format!(
            "No approved rule sets configured for carrier {} and product {}",
            selector.carrier_id, product
        ),
        None => format!("No approved rule sets configured for carrier {}", selector.carrier_id),
    }
}
