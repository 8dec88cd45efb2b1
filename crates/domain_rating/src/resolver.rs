//! Premium rate resolution
//!
//! Turns a combined underwriting verdict and the requested coverage into a
//! rate-table lookup. Lookups are exact by default; a missing row is a
//! [`NoMatchError`] naming the tuple that was searched for. Interpolation
//! across age and face amount is only attempted under
//! [`LookupMode::Bilinear`], and never across term lengths.

use core_kernel::Currency;
use domain_underwriting::{ApplicantProfile, Eligibility, FinalVerdict};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::error::{NoMatchError, RatingError};
use crate::matrix::{PremiumMatrixRow, RateClass, RateKey, RatingScope, TobaccoClass};
use crate::premium::{LookupMode, PolicyParams, QuotedPremium};

/// Prices verdicts against a premium matrix
#[derive(Debug, Clone, Copy, Default)]
pub struct PremiumRateResolver {
    mode: LookupMode,
    currency: Currency,
}

impl PremiumRateResolver {
    pub fn new(mode: LookupMode, currency: Currency) -> Self {
        Self { mode, currency }
    }

    pub fn mode(&self) -> LookupMode {
        self.mode
    }

    /// Builds the lookup tuple for an applicant
    pub fn rate_key(
        verdict: &FinalVerdict,
        profile: &ApplicantProfile,
        params: &PolicyParams,
    ) -> Result<RateKey, RatingError> {
        if verdict.eligibility == Eligibility::Ineligible {
            return Err(RatingError::Ineligible);
        }
        let rate_class = RateClass::from_health_class(verdict.health_class)
            .ok_or(RatingError::NotRatable(verdict.health_class))?;
        if params.face_amount <= Decimal::ZERO {
            return Err(RatingError::invalid_params(format!(
                "face amount must be positive, got {}",
                params.face_amount
            )));
        }

        Ok(RateKey {
            gender: profile.gender,
            tobacco_class: params
                .tobacco_class
                .unwrap_or_else(|| TobaccoClass::for_tobacco_use(profile.tobacco)),
            rate_class,
            term_years: params.term_years,
            age: profile.age,
            face_amount: params.face_amount,
        })
    }

    /// Prices a verdict
    pub fn resolve(
        &self,
        verdict: &FinalVerdict,
        profile: &ApplicantProfile,
        params: &PolicyParams,
        scope: &RatingScope,
        matrix: &[PremiumMatrixRow],
    ) -> Result<QuotedPremium, RatingError> {
        let key = Self::rate_key(verdict, profile, params)?;

        if let Some(row) = exact_lookup(scope, &key, matrix) {
            debug!(row_id = %row.id, key = %key, "exact premium row");
            return QuotedPremium::build(key, Some(row.id), row.monthly_premium, verdict.flat_extra, self.currency);
        }

        if self.mode == LookupMode::Bilinear {
            if let Some(monthly) = interpolate(scope, &key, matrix) {
                debug!(key = %key, monthly = %monthly, "interpolated premium");
                return QuotedPremium::build(key, None, monthly, verdict.flat_extra, self.currency);
            }
        }

        warn!(scope = %scope, key = %key, "no premium row");
        Err(NoMatchError { scope: *scope, key }.into())
    }
}

/// Finds the row for an exact tuple, preferring IMO-owned rows
pub fn exact_lookup<'a>(
    scope: &RatingScope,
    key: &RateKey,
    matrix: &'a [PremiumMatrixRow],
) -> Option<&'a PremiumMatrixRow> {
    matrix
        .iter()
        .filter(|row| scope.admits(row) && row.key() == *key)
        .min_by_key(|row| (row.imo_id.is_none(), row.id))
}

/// Bilinear interpolation over age and face amount
///
/// Uses the nearest rows at or below and at or above the requested age and
/// face on the same curve. All four corners must exist. A value that
/// coincides with a table point collapses that axis.
pub fn interpolate(scope: &RatingScope, key: &RateKey, matrix: &[PremiumMatrixRow]) -> Option<Decimal> {
    let curve: Vec<&PremiumMatrixRow> = matrix
        .iter()
        .filter(|row| scope.admits(row) && row.key().same_curve(key))
        .collect();

    let (age_lo, age_hi) = bracket(curve.iter().map(|r| Decimal::from(r.age)), Decimal::from(key.age))?;
    let (face_lo, face_hi) = bracket(curve.iter().map(|r| r.face_amount), key.face_amount)?;

    let corner = |age: Decimal, face: Decimal| -> Option<Decimal> {
        curve
            .iter()
            .copied()
            .filter(|r| Decimal::from(r.age) == age && r.face_amount == face)
            .min_by_key(|r| (r.imo_id.is_none(), r.id))
            .map(|r| r.monthly_premium)
    };

    let p00 = corner(age_lo, face_lo)?;
    let p01 = corner(age_lo, face_hi)?;
    let p10 = corner(age_hi, face_lo)?;
    let p11 = corner(age_hi, face_hi)?;

    let t = fraction(Decimal::from(key.age), age_lo, age_hi);
    let u = fraction(key.face_amount, face_lo, face_hi);
    let one = Decimal::ONE;

    let premium = p00 * (one - t) * (one - u)
        + p10 * t * (one - u)
        + p01 * (one - t) * u
        + p11 * t * u;
    Some(premium.round_dp(2))
}

/// Nearest points at or below and at or above `target`
fn bracket(points: impl Iterator<Item = Decimal> + Clone, target: Decimal) -> Option<(Decimal, Decimal)> {
    let lo = points.clone().filter(|p| *p <= target).max()?;
    let hi = points.filter(|p| *p >= target).min()?;
    Some((lo, hi))
}

fn fraction(value: Decimal, lo: Decimal, hi: Decimal) -> Decimal {
    if hi == lo {
        Decimal::ZERO
    } else {
        (value - lo) / (hi - lo)
    }
}
