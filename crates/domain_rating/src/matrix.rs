//! Premium matrix model
//!
//! A premium matrix is a discrete table of monthly premiums keyed by
//! gender, tobacco class, rate class, term, age and face amount, scoped to a
//! carrier product and optionally to an IMO.

use core_kernel::{CarrierId, ImoId, PremiumRowId, ProductId};
use domain_underwriting::{Gender, HealthClass};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tobacco dimension of the rate table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TobaccoClass {
    NonTobacco,
    Tobacco,
    PreferredNonTobacco,
}

impl TobaccoClass {
    /// Default class for an applicant's tobacco flag
    pub fn for_tobacco_use(tobacco: bool) -> Self {
        if tobacco {
            TobaccoClass::Tobacco
        } else {
            TobaccoClass::NonTobacco
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TobaccoClass::NonTobacco => "non_tobacco",
            TobaccoClass::Tobacco => "tobacco",
            TobaccoClass::PreferredNonTobacco => "preferred_non_tobacco",
        }
    }
}

/// Rate-table class, a coarser view of the health class
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateClass {
    PreferredPlus,
    Preferred,
    StandardPlus,
    Standard,
    TableRated,
}

impl RateClass {
    /// Maps a health class onto the rate table
    ///
    /// `refer`, `unknown` and `decline` have no rate class.
    pub fn from_health_class(class: HealthClass) -> Option<RateClass> {
        match class {
            HealthClass::PreferredPlus => Some(RateClass::PreferredPlus),
            HealthClass::Preferred => Some(RateClass::Preferred),
            HealthClass::StandardPlus => Some(RateClass::StandardPlus),
            HealthClass::Standard => Some(RateClass::Standard),
            HealthClass::Substandard => Some(RateClass::TableRated),
            HealthClass::Refer | HealthClass::Unknown | HealthClass::Decline => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RateClass::PreferredPlus => "preferred_plus",
            RateClass::Preferred => "preferred",
            RateClass::StandardPlus => "standard_plus",
            RateClass::Standard => "standard",
            RateClass::TableRated => "table_rated",
        }
    }
}

/// The carrier product (and optionally IMO) whose rates apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RatingScope {
    #[serde(default)]
    pub imo_id: Option<ImoId>,
    pub carrier_id: CarrierId,
    pub product_id: ProductId,
}

impl RatingScope {
    pub fn new(carrier_id: CarrierId, product_id: ProductId) -> Self {
        Self { imo_id: None, carrier_id, product_id }
    }

    pub fn with_imo(mut self, imo_id: Option<ImoId>) -> Self {
        self.imo_id = imo_id;
        self
    }

    /// Rows of this carrier product; IMO-owned rows only for that IMO
    pub fn admits(&self, row: &PremiumMatrixRow) -> bool {
        row.carrier_id == self.carrier_id
            && row.product_id == self.product_id
            && row.imo_id.map_or(true, |imo| Some(imo) == self.imo_id)
    }
}

impl fmt::Display for RatingScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "carrier {} product {}", self.carrier_id, self.product_id)?;
        if let Some(imo) = self.imo_id {
            write!(f, " imo {}", imo)?;
        }
        Ok(())
    }
}

/// Exact lookup tuple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateKey {
    pub gender: Gender,
    pub tobacco_class: TobaccoClass,
    pub rate_class: RateClass,
    /// `None` for permanent products
    pub term_years: Option<u32>,
    pub age: u32,
    pub face_amount: Decimal,
}

impl RateKey {
    /// Same gender, tobacco, class and term; age and face may differ
    pub fn same_curve(&self, other: &RateKey) -> bool {
        self.gender == other.gender
            && self.tobacco_class == other.tobacco_class
            && self.rate_class == other.rate_class
            && self.term_years == other.term_years
    }
}

impl fmt::Display for RateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let term = self
            .term_years
            .map_or_else(|| "permanent".to_string(), |t| format!("{}y", t));
        write!(
            f,
            "({}, {}, {}, {}, age {}, face {})",
            self.gender,
            self.tobacco_class.as_str(),
            self.rate_class.as_str(),
            term,
            self.age,
            self.face_amount
        )
    }
}

/// One row of a premium matrix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PremiumMatrixRow {
    pub id: PremiumRowId,
    #[serde(default)]
    pub imo_id: Option<ImoId>,
    pub carrier_id: CarrierId,
    pub product_id: ProductId,
    pub gender: Gender,
    pub tobacco_class: TobaccoClass,
    pub rate_class: RateClass,
    #[serde(default)]
    pub term_years: Option<u32>,
    pub age: u32,
    pub face_amount: Decimal,
    pub monthly_premium: Decimal,
}

impl PremiumMatrixRow {
    pub fn key(&self) -> RateKey {
        RateKey {
            gender: self.gender,
            tobacco_class: self.tobacco_class,
            rate_class: self.rate_class,
            term_years: self.term_years,
            age: self.age,
            face_amount: self.face_amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_class_mapping() {
        assert_eq!(RateClass::from_health_class(HealthClass::Substandard), Some(RateClass::TableRated));
        assert_eq!(RateClass::from_health_class(HealthClass::Standard), Some(RateClass::Standard));
        assert_eq!(RateClass::from_health_class(HealthClass::Refer), None);
        assert_eq!(RateClass::from_health_class(HealthClass::Decline), None);
    }

    #[test]
    fn test_rate_key_display_names_every_dimension() {
        let key = RateKey {
            gender: Gender::Female,
            tobacco_class: TobaccoClass::NonTobacco,
            rate_class: RateClass::Preferred,
            term_years: Some(20),
            age: 41,
            face_amount: rust_decimal_macros::dec!(250000),
        };
        assert_eq!(
            key.to_string(),
            "(female, non_tobacco, preferred, 20y, age 41, face 250000)"
        );
    }
}
