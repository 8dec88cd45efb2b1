//! Comparison ranking across carriers

use std::cmp::Ordering;

use crate::result::QuoteResult;

/// Orders results best offer first
///
/// Eligible before refer before ineligible, priced before unpriced, then the
/// cheapest cost per thousand, then the better health class. The sort is
/// stable, so equal offers keep their input order.
pub fn rank(results: &mut [QuoteResult]) {
    results.sort_by(compare_offers);
}

/// Ranking comparator used by [`rank`]
pub fn compare_offers(a: &QuoteResult, b: &QuoteResult) -> Ordering {
    a.eligibility
        .cmp(&b.eligibility)
        .then_with(|| b.is_priced().cmp(&a.is_priced()))
        .then_with(|| match (a.cost_per_thousand(), b.cost_per_thousand()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => Ordering::Equal,
        })
        .then_with(|| a.health_class.cmp(&b.health_class))
}
