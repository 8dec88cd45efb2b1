//! Evaluation requests

use core_kernel::{CarrierId, ImoId, ProductId};
use domain_rating::{PolicyParams, RatingScope};
use domain_underwriting::{ApplicantProfile, Selector};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Oldest issue age the engine will evaluate
pub const MAX_ISSUE_AGE: u32 = 120;
/// Longest term the engine will quote
pub const MAX_TERM_YEARS: u32 = 40;

/// One applicant quoted against one carrier/product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct EvaluationRequest {
    pub carrier_id: CarrierId,
    #[serde(default)]
    pub product_id: Option<ProductId>,
    #[serde(default)]
    pub imo_id: Option<ImoId>,
    /// Rule set variant; the configured default when absent
    #[serde(default)]
    pub variant: Option<String>,
    #[validate(custom(function = "validate_profile"))]
    pub applicant_profile: ApplicantProfile,
    #[validate(custom(function = "validate_policy_params"))]
    pub policy_params: PolicyParams,
}

impl EvaluationRequest {
    pub fn new(
        carrier_id: CarrierId,
        product_id: Option<ProductId>,
        applicant_profile: ApplicantProfile,
        policy_params: PolicyParams,
    ) -> Self {
        Self {
            carrier_id,
            product_id,
            imo_id: None,
            variant: None,
            applicant_profile,
            policy_params,
        }
    }

    pub fn with_imo(mut self, imo_id: ImoId) -> Self {
        self.imo_id = Some(imo_id);
        self
    }

    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = Some(variant.into());
        self
    }

    /// Rule set selector, falling back to `default_variant`
    pub fn selector(&self, default_variant: &str) -> Selector {
        Selector {
            imo_id: self.imo_id,
            carrier_id: self.carrier_id,
            product_id: self.product_id,
            variant: self
                .variant
                .clone()
                .unwrap_or_else(|| default_variant.to_string()),
        }
    }

    /// Rate table scope; rates are per product, so none without one
    pub fn rating_scope(&self) -> Option<RatingScope> {
        self.product_id
            .map(|product| RatingScope::new(self.carrier_id, product).with_imo(self.imo_id))
    }
}

fn validate_profile(profile: &ApplicantProfile) -> Result<(), ValidationError> {
    if profile.age > MAX_ISSUE_AGE {
        return Err(invalid("age_out_of_range", format!("age must be at most {}", MAX_ISSUE_AGE)));
    }
    if let Some(bmi) = profile.bmi {
        if !(bmi > 0.0 && bmi < 100.0) {
            return Err(invalid("bmi_out_of_range", "bmi must be between 0 and 100"));
        }
    }
    Ok(())
}

fn validate_policy_params(params: &PolicyParams) -> Result<(), ValidationError> {
    if params.face_amount <= Decimal::ZERO {
        return Err(invalid("face_amount_not_positive", "face amount must be positive"));
    }
    if let Some(term) = params.term_years {
        if term == 0 || term > MAX_TERM_YEARS {
            return Err(invalid(
                "term_out_of_range",
                format!("term must be between 1 and {} years", MAX_TERM_YEARS),
            ));
        }
    }
    Ok(())
}

fn invalid(code: &'static str, message: impl Into<String>) -> ValidationError {
    let message: String = message.into();
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_underwriting::Gender;
    use rust_decimal_macros::dec;

    fn request(age: u32, face: Decimal, term: Option<u32>) -> EvaluationRequest {
        let params = PolicyParams {
            face_amount: face,
            term_years: term,
            tobacco_class: None,
        };
        EvaluationRequest::new(
            CarrierId::new(),
            Some(ProductId::new()),
            ApplicantProfile::new(age, Gender::Female, false),
            params,
        )
    }

    #[test]
    fn test_valid_request() {
        assert!(request(45, dec!(250000), Some(20)).validate().is_ok());
        assert!(request(45, dec!(250000), None).validate().is_ok());
    }

    #[test]
    fn test_invalid_requests() {
        assert!(request(121, dec!(250000), Some(20)).validate().is_err());
        assert!(request(45, dec!(0), Some(20)).validate().is_err());
        assert!(request(45, dec!(250000), Some(0)).validate().is_err());
        assert!(request(45, dec!(250000), Some(41)).validate().is_err());
    }

    #[test]
    fn test_selector_uses_default_variant() {
        let req = request(45, dec!(250000), Some(20));
        assert_eq!(req.selector("default").variant, "default");
        assert_eq!(req.clone().with_variant("simplified").selector("default").variant, "simplified");
        assert!(req.rating_scope().is_some());
    }
}
