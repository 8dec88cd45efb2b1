//! Quote Service Tests
//!
//! Tests the request-to-quote pipeline against an in-memory snapshot port:
//! - Single and batch quoting
//! - Per-entry validation failures
//! - Concurrent portfolio quoting matching the sequential batch
//! - Ranking across offers
//!
//! # Test Organization
//!
//! - `quote_tests` - single requests end to end
//! - `product_limit_tests` - issue-age and face-amount knockouts
//! - `batch_tests` - batches, validation and snapshot failures
//! - `portfolio_tests` - concurrent evaluation
//! - `ranking_tests` - best offer ordering

use std::sync::Arc;

use async_trait::async_trait;
use core_kernel::{DomainPort, PortError};
use domain_quoting::{
    rank, EngineConfig, PremiumOutcome, ProductConstraints, QuoteError, QuoteService, SnapshotPort,
    SnapshotScope, UnderwritingSnapshot, NO_PRODUCT_REASON,
};
use domain_rating::{PolicyParams, RateClass};
use domain_underwriting::{Eligibility, HealthClass, CLEAN_PROFILE_REASON};
use rust_decimal_macros::dec;
use test_utils::{
    assert_no_match, assert_not_rated, assert_quoted, IdFixtures, PremiumRowBuilder, ProfileFixtures,
    RequestBuilder, RuleSetFixtures, INSULIN_DECLINE_REASON, SAMPLE_SNAPSHOT,
};

/// Serves a fixed snapshot
struct StaticSnapshot(UnderwritingSnapshot);

impl DomainPort for StaticSnapshot {}

#[async_trait]
impl SnapshotPort for StaticSnapshot {
    async fn load_snapshot(&self, scope: &SnapshotScope) -> Result<UnderwritingSnapshot, PortError> {
        Ok(self.0.restrict(scope))
    }
}

/// Always fails to load
struct UnavailableSnapshot;

impl DomainPort for UnavailableSnapshot {}

#[async_trait]
impl SnapshotPort for UnavailableSnapshot {
    async fn load_snapshot(&self, _scope: &SnapshotScope) -> Result<UnderwritingSnapshot, PortError> {
        Err(PortError::connection(
            "catalog store unreachable",
            std::io::Error::from(std::io::ErrorKind::ConnectionRefused),
        ))
    }
}

fn service() -> QuoteService {
    service_for(SAMPLE_SNAPSHOT.clone(), EngineConfig::default())
}

fn service_for(snapshot: UnderwritingSnapshot, config: EngineConfig) -> QuoteService {
    QuoteService::new(Arc::new(StaticSnapshot(snapshot)), config)
}

// ============================================================================
// QUOTE TESTS
// ============================================================================

mod quote_tests {
    use super::*;

    /// A healthy applicant is preferred and priced from the preferred row
    #[tokio::test]
    async fn test_healthy_applicant_is_priced() {
        let result = service().quote(&RequestBuilder::new().build()).await.expect("quote");

        assert_eq!(result.eligibility, Eligibility::Eligible);
        assert_eq!(result.health_class, HealthClass::Preferred);
        let premium = assert_quoted(&result);
        assert_eq!(premium.rate_key.rate_class, RateClass::Preferred);
        assert_eq!(premium.total_monthly.amount(), dec!(24.00));
        assert_eq!(result.cost_per_thousand(), Some(dec!(1.15)));
        assert_eq!(result.missing_fields, vec!["client.bmi"], "Unanswered BMI is reported");
    }

    /// An insulin-dependent diabetic is declined and not priced
    #[tokio::test]
    async fn test_declined_applicant_is_not_priced() {
        let request = RequestBuilder::new().with_profile(ProfileFixtures::diabetic(true)).build();

        let result = service().quote(&request).await.expect("quote");

        assert_eq!(result.eligibility, Eligibility::Ineligible);
        assert_eq!(result.reason_texts(), vec![INSULIN_DECLINE_REASON]);
        assert_not_rated(&result);
    }

    /// Condition and product decisions combine before pricing
    #[tokio::test]
    async fn test_condition_worsens_class() {
        let request = RequestBuilder::new().with_profile(ProfileFixtures::diabetic(false)).build();

        let result = service().quote(&request).await.expect("quote");

        assert_eq!(result.health_class, HealthClass::Standard);
        assert_eq!(assert_quoted(&result).base_monthly.amount(), dec!(30.00));
        assert_eq!(result.evaluated_rule_sets.len(), 2);
    }

    /// A coverage the table has no row for reports the missing tuple
    #[tokio::test]
    async fn test_missing_rate_row_is_reported() {
        let params = PolicyParams::term(dec!(250000), 10);
        let request = RequestBuilder::new().with_policy_params(params).build();

        let result = service().quote(&request).await.expect("quote");

        assert_eq!(result.eligibility, Eligibility::Eligible, "A missing row does not change the decision");
        match &result.premium {
            PremiumOutcome::NoMatch { key, .. } => {
                assert_eq!(key.term_years, Some(10));
                assert_no_match(&result, key);
            }
            other => panic!("Expected a no-match, got {:?}", other),
        }
    }

    /// Without a product the decision is made but not priced
    #[tokio::test]
    async fn test_no_product_is_not_rated() {
        let request = RequestBuilder::new().with_product(None).build();

        let result = service().quote(&request).await.expect("quote");

        assert_eq!(
            result.premium,
            PremiumOutcome::not_rated(NO_PRODUCT_REASON),
            "Premiums are product specific"
        );
    }

    /// Identical applicant facts hash identically
    #[tokio::test]
    async fn test_input_hash_is_stable() {
        let first = service().quote(&RequestBuilder::new().build()).await.expect("quote");
        let second = service().quote(&RequestBuilder::new().build()).await.expect("quote");
        let other = service()
            .quote(&RequestBuilder::new().with_profile(ProfileFixtures::diabetic(false)).build())
            .await
            .expect("quote");

        assert_eq!(first.input_hash, second.input_hash);
        assert_ne!(first.input_hash, other.input_hash);
        assert_eq!(first.input_hash.len(), 64, "Hex encoded SHA-256");
    }
    /// An applicant with no conditions is priced when only condition sets exist
    #[tokio::test]
    async fn test_clean_profile_is_priced_without_product_rules() {
        let snapshot = UnderwritingSnapshot::new(
            vec![RuleSetFixtures::diabetes_with_insulin_decline()],
            vec![PremiumRowBuilder::new()
                .with_rate_class(RateClass::Preferred)
                .with_monthly_premium(dec!(24.00))
                .build()],
        );
        let standard = EngineConfig {
            clean_profile_class: HealthClass::Standard,
            ..EngineConfig::default()
        };

        let preferred = service_for(snapshot.clone(), EngineConfig::default())
            .quote(&RequestBuilder::new().build())
            .await
            .expect("quote");
        let configured = service_for(snapshot, standard)
            .quote(&RequestBuilder::new().build())
            .await
            .expect("quote");

        assert_eq!(preferred.eligibility, Eligibility::Eligible);
        assert_eq!(preferred.reason_texts(), vec![CLEAN_PROFILE_REASON]);
        assert_eq!(assert_quoted(&preferred).total_monthly.amount(), dec!(24.00));
        assert_eq!(configured.health_class, HealthClass::Standard, "Clean-profile class follows config");
    }
}

// ============================================================================
// PRODUCT LIMIT TESTS
// ============================================================================

mod product_limit_tests {
    use super::*;

    fn limited_service() -> QuoteService {
        let limits = ProductConstraints::new(IdFixtures::carrier_id(), IdFixtures::product_id())
            .with_issue_ages(Some(18), Some(75))
            .with_face_amounts(Some(dec!(25000)), Some(dec!(1000000)))
            .with_face_amount_tier(50, dec!(1000000))
            .with_face_amount_tier(75, dec!(250000));
        service_for(SAMPLE_SNAPSHOT.clone().with_products(vec![limits]), EngineConfig::default())
    }

    /// A request within the product limits is underwritten and priced as usual
    #[tokio::test]
    async fn test_within_limits_is_priced() {
        let result = limited_service().quote(&RequestBuilder::new().build()).await.expect("quote");

        assert_eq!(result.health_class, HealthClass::Preferred);
        assert_quoted(&result);
    }

    /// An applicant older than the product allows is ineligible before any rule runs
    #[tokio::test]
    async fn test_issue_age_knockout() {
        let mut older = ProfileFixtures::diabetic(false);
        older.age = 80;

        let result = limited_service()
            .quote(&RequestBuilder::new().with_profile(older).build())
            .await
            .expect("quote");

        assert_eq!(result.eligibility, Eligibility::Ineligible);
        assert_eq!(result.health_class, HealthClass::Decline);
        assert!(result.evaluated_rule_sets.is_empty(), "No rule set is evaluated after a knockout");
        assert!(
            result.reason_texts()[0].contains("Issue age 80"),
            "Got {:?}",
            result.reason_texts()
        );
        assert_not_rated(&result);
    }

    /// The age tier caps the face amount below the product maximum
    #[tokio::test]
    async fn test_age_tiered_face_knockout() {
        let mut older = ProfileFixtures::healthy_male();
        older.age = 60;
        let params = PolicyParams::term(dec!(500000), 20);

        let result = limited_service()
            .quote(&RequestBuilder::new().with_profile(older).with_policy_params(params).build())
            .await
            .expect("quote");

        assert_eq!(result.eligibility, Eligibility::Ineligible);
        assert!(result.reason_texts()[0].contains("at issue age 60"));
        assert_not_rated(&result);
    }

    /// Limits of one product do not apply to another
    #[tokio::test]
    async fn test_limits_are_per_product() {
        let mut older = ProfileFixtures::healthy_male();
        older.age = 80;

        let result = limited_service()
            .quote(&RequestBuilder::new().with_profile(older).with_product(None).build())
            .await
            .expect("quote");

        assert_ne!(result.eligibility, Eligibility::Ineligible);
    }
}


// ============================================================================
// BATCH TESTS
// ============================================================================

mod batch_tests {
    use super::*;

    /// An invalid request fails only its own entry
    #[tokio::test]
    async fn test_invalid_request_fails_alone() {
        let mut too_old = ProfileFixtures::healthy_male();
        too_old.age = 130;
        let requests = vec![
            RequestBuilder::new().build(),
            RequestBuilder::new().with_profile(too_old).build(),
            RequestBuilder::new().with_profile(ProfileFixtures::diabetic(false)).build(),
        ];

        let results = service().quote_batch(&requests).await.expect("snapshot loads");

        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(
            matches!(&results[1], Err(QuoteError::Validation(message)) if message.contains("age")),
            "Expected an age validation error, got {:?}",
            results[1]
        );
        assert!(results[2].is_ok());
    }

    /// A zero face amount is a validation error
    #[tokio::test]
    async fn test_zero_face_is_rejected() {
        let request = RequestBuilder::new()
            .with_policy_params(PolicyParams::term(dec!(0), 20))
            .build();

        let result = service().quote(&request).await;

        assert!(matches!(result, Err(QuoteError::Validation(_))));
    }

    /// A snapshot that cannot be loaded fails the whole batch
    #[tokio::test]
    async fn test_snapshot_failure_fails_batch() {
        let service = QuoteService::new(Arc::new(UnavailableSnapshot), EngineConfig::default());

        let result = service.quote_batch(&[RequestBuilder::new().build()]).await;

        match result {
            Err(QuoteError::Snapshot(err)) => assert!(err.is_transient()),
            other => panic!("Expected a snapshot error, got {:?}", other.map(|r| r.len())),
        }
    }
}

// ============================================================================
// PORTFOLIO TESTS
// ============================================================================

mod portfolio_tests {
    use super::*;

    fn portfolio() -> Vec<domain_quoting::EvaluationRequest> {
        (0..40)
            .map(|i| {
                let profile = match i % 4 {
                    0 => ProfileFixtures::healthy_male(),
                    1 => ProfileFixtures::diabetic(true),
                    2 => ProfileFixtures::diabetic(false),
                    _ => ProfileFixtures::diabetic_unanswered().with_bmi(41.0),
                };
                RequestBuilder::new().with_profile(profile).build()
            })
            .collect()
    }

    /// Concurrent evaluation returns the sequential results in input order
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_portfolio_matches_batch() {
        let service = service();
        let requests = portfolio();

        let sequential = service.quote_batch(&requests).await.expect("batch");
        let concurrent = service.quote_portfolio(requests).await.expect("portfolio");

        assert_eq!(sequential.len(), concurrent.len());
        for (i, (a, b)) in sequential.iter().zip(concurrent.iter()).enumerate() {
            assert_eq!(a.as_ref().ok(), b.as_ref().ok(), "Entry {} differs", i);
        }
    }

    /// An empty portfolio is an empty result
    #[tokio::test]
    async fn test_empty_portfolio() {
        let results = service().quote_portfolio(Vec::new()).await.expect("portfolio");
        assert!(results.is_empty());
    }
}

// ============================================================================
// RANKING TESTS
// ============================================================================

mod ranking_tests {
    use super::*;

    /// Eligible and cheapest first, declines last
    #[tokio::test]
    async fn test_rank_orders_best_offer_first() {
        let requests = vec![
            RequestBuilder::new().with_profile(ProfileFixtures::diabetic(true)).build(),
            RequestBuilder::new().with_profile(ProfileFixtures::diabetic(false)).build(),
            RequestBuilder::new().build(),
        ];
        let mut results: Vec<_> = service()
            .quote_batch(&requests)
            .await
            .expect("batch")
            .into_iter()
            .map(|r| r.expect("valid request"))
            .collect();

        rank(&mut results);

        let classes: Vec<HealthClass> = results.iter().map(|r| r.health_class).collect();
        assert_eq!(
            classes,
            vec![HealthClass::Preferred, HealthClass::Standard, HealthClass::Decline]
        );
    }
}
