//! Engine configuration

use core_kernel::Currency;
use domain_rating::LookupMode;
use domain_underwriting::{FlatExtraComposition, HealthClass, DEFAULT_CLEAN_PROFILE_CLASS, DEFAULT_VARIANT};
use serde::{Deserialize, Serialize};

/// Knobs that change how verdicts combine and premiums are looked up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// How flat extras from several rule sets combine
    pub flat_extra_composition: FlatExtraComposition,
    /// Exact lookup, or opt-in bilinear interpolation
    pub lookup_mode: LookupMode,
    /// Rule set variant used when a request names none
    pub default_variant: String,
    /// Currency premiums are quoted in
    pub currency: Currency,
    /// Class for an applicant with no conditions when no rule set applies
    pub clean_profile_class: HealthClass,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            flat_extra_composition: FlatExtraComposition::Sum,
            lookup_mode: LookupMode::Exact,
            default_variant: DEFAULT_VARIANT.to_string(),
            currency: Currency::USD,
            clean_profile_class: DEFAULT_CLEAN_PROFILE_CLASS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_document_keeps_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"lookup_mode": "bilinear"}"#).unwrap();
        assert_eq!(config.lookup_mode, LookupMode::Bilinear);
        assert_eq!(config.flat_extra_composition, FlatExtraComposition::Sum);
        assert_eq!(config.default_variant, "default");
        assert_eq!(config.clean_profile_class, HealthClass::Preferred);
    }

    #[test]
    fn test_clean_profile_class_override() {
        let config: EngineConfig = serde_json::from_str(r#"{"clean_profile_class": "standard"}"#).unwrap();
        assert_eq!(config.clean_profile_class, HealthClass::Standard);
    }
}
