//! Product eligibility constraints
//!
//! Issue-age and face-amount limits a product places on every applicant,
//! whatever their health. A request outside them is knocked out before the
//! rule sets are consulted and is never priced.

use core_kernel::{CarrierId, ImoId, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Highest face amount available up to an issue age
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceAmountTier {
    /// Inclusive upper issue age of the tier
    pub max_age: u32,
    pub max_face_amount: Decimal,
}

/// Limits one product places on issue age and face amount
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductConstraints {
    pub carrier_id: CarrierId,
    pub product_id: ProductId,
    /// Owning IMO; `None` for carrier-published limits
    #[serde(default)]
    pub imo_id: Option<ImoId>,
    #[serde(default)]
    pub min_issue_age: Option<u32>,
    #[serde(default)]
    pub max_issue_age: Option<u32>,
    #[serde(default)]
    pub min_face_amount: Option<Decimal>,
    #[serde(default)]
    pub max_face_amount: Option<Decimal>,
    /// Age-tiered face limits; the tier with the lowest `max_age` at or
    /// above the applicant's age applies
    #[serde(default)]
    pub face_amount_tiers: Vec<FaceAmountTier>,
}

impl ProductConstraints {
    /// Unconstrained product
    pub fn new(carrier_id: CarrierId, product_id: ProductId) -> Self {
        Self {
            carrier_id,
            product_id,
            imo_id: None,
            min_issue_age: None,
            max_issue_age: None,
            min_face_amount: None,
            max_face_amount: None,
            face_amount_tiers: Vec::new(),
        }
    }

    pub fn with_issue_ages(mut self, min: Option<u32>, max: Option<u32>) -> Self {
        self.min_issue_age = min;
        self.max_issue_age = max;
        self
    }

    pub fn with_face_amounts(mut self, min: Option<Decimal>, max: Option<Decimal>) -> Self {
        self.min_face_amount = min;
        self.max_face_amount = max;
        self
    }

    pub fn with_face_amount_tier(mut self, max_age: u32, max_face_amount: Decimal) -> Self {
        self.face_amount_tiers.push(FaceAmountTier { max_age, max_face_amount });
        self
    }

    /// Highest face amount the tiers allow at `age`, if any tier covers it
    pub fn tiered_max_face(&self, age: u32) -> Option<Decimal> {
        self.face_amount_tiers
            .iter()
            .filter(|tier| age <= tier.max_age)
            .min_by_key(|tier| tier.max_age)
            .map(|tier| tier.max_face_amount)
    }

    /// Why an applicant of `age` cannot buy `face_amount`, or `None`
    pub fn knockout(&self, age: u32, face_amount: Decimal) -> Option<String> {
        if let Some(min) = self.min_issue_age.filter(|min| age < *min) {
            return Some(format!("Issue age {} is below the product minimum of {}", age, min));
        }
        if let Some(max) = self.max_issue_age.filter(|max| age > *max) {
            return Some(format!("Issue age {} is above the product maximum of {}", age, max));
        }
        if let Some(min) = self.min_face_amount.filter(|min| face_amount < *min) {
            return Some(format!(
                "Face amount {} is below the product minimum of {}",
                face_amount, min
            ));
        }
        if let Some(max) = self.max_face_amount.filter(|max| face_amount > *max) {
            return Some(format!(
                "Face amount {} is above the product maximum of {}",
                face_amount, max
            ));
        }
        if let Some(max) = self.tiered_max_face(age).filter(|max| face_amount > *max) {
            return Some(format!(
                "Face amount {} is above the maximum of {} at issue age {}",
                face_amount, max, age
            ));
        }
        None
    }
}

/// The constraints that govern a carrier/product for an IMO
///
/// Shared constraints apply to everyone; an IMO's own constraints are
/// visible only to it and take precedence over the shared ones.
pub fn constraints_for<'a>(
    catalog: &'a [ProductConstraints],
    carrier_id: CarrierId,
    product_id: ProductId,
    imo_id: Option<ImoId>,
) -> Option<&'a ProductConstraints> {
    catalog
        .iter()
        .filter(|c| c.carrier_id == carrier_id && c.product_id == product_id)
        .filter(|c| c.imo_id.map_or(true, |owner| Some(owner) == imo_id))
        .min_by_key(|c| c.imo_id.is_none())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn final_expense() -> ProductConstraints {
        ProductConstraints::new(CarrierId::new(), ProductId::new())
            .with_issue_ages(Some(50), Some(85))
            .with_face_amounts(Some(dec!(2000)), Some(dec!(40000)))
            .with_face_amount_tier(75, dec!(40000))
            .with_face_amount_tier(80, dec!(25000))
            .with_face_amount_tier(85, dec!(15000))
    }

    #[test]
    fn test_within_limits_passes() {
        assert_eq!(final_expense().knockout(60, dec!(25000)), None);
        assert_eq!(final_expense().knockout(85, dec!(15000)), None, "Limits are inclusive");
    }

    #[test]
    fn test_issue_age_limits() {
        let constraints = final_expense();
        assert!(constraints.knockout(49, dec!(10000)).is_some_and(|r| r.contains("below")));
        assert!(constraints.knockout(86, dec!(10000)).is_some_and(|r| r.contains("above")));
    }

    #[test]
    fn test_face_amount_limits() {
        let constraints = final_expense();
        assert!(constraints.knockout(60, dec!(1000)).is_some());
        assert!(constraints.knockout(60, dec!(50000)).is_some());
    }

    #[test]
    fn test_tier_is_chosen_by_age() {
        let constraints = final_expense();
        assert_eq!(constraints.tiered_max_face(70), Some(dec!(40000)));
        assert_eq!(constraints.tiered_max_face(76), Some(dec!(25000)));
        assert_eq!(constraints.tiered_max_face(90), None);
        assert!(constraints.knockout(78, dec!(30000)).is_some(), "30,000 exceeds the 76-80 tier");
        assert!(constraints.knockout(74, dec!(30000)).is_none());
    }

    #[test]
    fn test_imo_constraints_take_precedence() {
        let imo = ImoId::new();
        let shared = final_expense();
        let mut owned = shared.clone().with_issue_ages(Some(50), Some(80));
        owned.imo_id = Some(imo);
        let catalog = vec![shared.clone(), owned.clone()];

        let for_imo = constraints_for(&catalog, shared.carrier_id, shared.product_id, Some(imo));
        let for_other = constraints_for(&catalog, shared.carrier_id, shared.product_id, Some(ImoId::new()));
        let for_none = constraints_for(&catalog, shared.carrier_id, shared.product_id, None);

        assert_eq!(for_imo, Some(&owned));
        assert_eq!(for_other, Some(&shared));
        assert_eq!(for_none, Some(&shared));
    }
}
