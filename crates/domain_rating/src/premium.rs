//! Policy parameters and priced premiums

use core_kernel::{Currency, Money, PremiumRowId};
use domain_underwriting::FlatExtra;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::RatingError;
use crate::matrix::{RateKey, TobaccoClass};

/// How the rate table is searched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupMode {
    /// Only an exact row prices a quote
    #[default]
    Exact,
    /// Fall back to bilinear interpolation over age and face amount
    Bilinear,
}

/// Coverage being quoted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyParams {
    pub face_amount: Decimal,
    /// `None` for permanent products
    #[serde(default)]
    pub term_years: Option<u32>,
    /// Overrides the class implied by the applicant's tobacco flag
    #[serde(default)]
    pub tobacco_class: Option<TobaccoClass>,
}

impl PolicyParams {
    pub fn term(face_amount: Decimal, term_years: u32) -> Self {
        Self {
            face_amount,
            term_years: Some(term_years),
            tobacco_class: None,
        }
    }

    pub fn permanent(face_amount: Decimal) -> Self {
        Self {
            face_amount,
            term_years: None,
            tobacco_class: None,
        }
    }

    pub fn with_tobacco_class(mut self, class: TobaccoClass) -> Self {
        self.tobacco_class = Some(class);
        self
    }
}

/// A priced premium with its components
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotedPremium {
    pub rate_key: RateKey,
    /// Row that priced the quote; `None` when interpolated
    pub row_id: Option<PremiumRowId>,
    pub interpolated: bool,
    pub base_monthly: Money,
    pub flat_extra_monthly: Money,
    pub total_monthly: Money,
    pub annual: Money,
    /// Annual premium per $1,000 of face amount
    pub cost_per_thousand: Decimal,
}

impl QuotedPremium {
    /// Builds the breakdown from a table premium and an optional flat extra
    pub fn build(
        rate_key: RateKey,
        row_id: Option<PremiumRowId>,
        base_monthly: Decimal,
        flat_extra: Option<FlatExtra>,
        currency: Currency,
    ) -> Result<Self, RatingError> {
        let face = rate_key.face_amount;
        let base_monthly = Money::new(base_monthly, currency);
        let flat_extra_monthly = match flat_extra {
            Some(extra) => Money::per_thousand(extra.per_thousand, face, currency).divide(dec!(12))?,
            None => Money::zero(currency),
        };
        let total_monthly = base_monthly.checked_add(&flat_extra_monthly)?;
        let annual = total_monthly.multiply(dec!(12));
        let cost_per_thousand = annual.cost_per_thousand(face)?.round_dp(2);

        Ok(Self {
            rate_key,
            interpolated: row_id.is_none(),
            row_id,
            base_monthly,
            flat_extra_monthly,
            total_monthly,
            annual,
            cost_per_thousand,
        })
    }
}
