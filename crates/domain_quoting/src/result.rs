//! Quote results

use core_kernel::{CarrierId, ProductId, RuleSetId};
use domain_rating::{QuotedPremium, RateKey, RatingError, RatingScope};
use domain_underwriting::{
    Eligibility, FinalVerdict, FlatExtra, HealthClass, Reason, TableRating, TriggeredRule,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Pricing outcome of a quote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PremiumOutcome {
    /// A rate row (or interpolation) priced the verdict
    Quoted(QuotedPremium),
    /// The verdict is ratable but the table has no row for it
    NoMatch {
        scope: RatingScope,
        key: RateKey,
        message: String,
    },
    /// The verdict is not priced (ineligible, unratable class, no product)
    NotRated { reason: String },
}

impl PremiumOutcome {
    pub fn not_rated(reason: impl Into<String>) -> Self {
        PremiumOutcome::NotRated { reason: reason.into() }
    }

    pub fn quoted(&self) -> Option<&QuotedPremium> {
        match self {
            PremiumOutcome::Quoted(premium) => Some(premium),
            _ => None,
        }
    }
}

impl From<Result<QuotedPremium, RatingError>> for PremiumOutcome {
    fn from(result: Result<QuotedPremium, RatingError>) -> Self {
        match result {
            Ok(premium) => PremiumOutcome::Quoted(premium),
            Err(RatingError::NoMatch(miss)) => PremiumOutcome::NoMatch {
                message: miss.to_string(),
                scope: miss.scope,
                key: miss.key,
            },
            Err(other) => PremiumOutcome::not_rated(other.to_string()),
        }
    }
}

/// Underwriting decision and premium for one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteResult {
    pub carrier_id: CarrierId,
    pub product_id: Option<ProductId>,
    pub eligibility: Eligibility,
    pub health_class: HealthClass,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_rating: Option<TableRating>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flat_extra: Option<FlatExtra>,
    pub premium: PremiumOutcome,
    pub reasons: Vec<Reason>,
    pub concerns: Vec<String>,
    pub triggered_rules: Vec<TriggeredRule>,
    pub missing_fields: Vec<String>,
    pub evaluated_rule_sets: Vec<RuleSetId>,
    /// SHA-256 of the applicant facts
    pub input_hash: String,
}

impl QuoteResult {
    pub fn new(
        carrier_id: CarrierId,
        product_id: Option<ProductId>,
        verdict: FinalVerdict,
        premium: PremiumOutcome,
        input_hash: String,
    ) -> Self {
        Self {
            carrier_id,
            product_id,
            eligibility: verdict.eligibility,
            health_class: verdict.health_class,
            table_rating: Some(verdict.table_rating).filter(TableRating::is_rated),
            flat_extra: verdict.flat_extra,
            premium,
            reasons: verdict.reasons,
            concerns: verdict.concerns,
            triggered_rules: verdict.triggered_rules,
            missing_fields: verdict.missing_fields,
            evaluated_rule_sets: verdict.evaluated_rule_sets,
            input_hash,
        }
    }

    pub fn reason_texts(&self) -> Vec<&str> {
        self.reasons.iter().map(|r| r.text.as_str()).collect()
    }

    pub fn cost_per_thousand(&self) -> Option<Decimal> {
        self.premium.quoted().map(|p| p.cost_per_thousand)
    }

    pub fn is_priced(&self) -> bool {
        self.premium.quoted().is_some()
    }
}
