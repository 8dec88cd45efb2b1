//! Quote service
//!
//! Orchestrates one evaluation: validate the request, check the product's
//! issue-age and face-amount limits, underwrite the applicant against the
//! snapshot's rule sets, then price the verdict against its premium rows. Evaluation itself is synchronous and pure; the
//! only suspension point is loading the snapshot, which happens once per
//! call.

use std::sync::Arc;

use domain_rating::PremiumRateResolver;
use domain_underwriting::{
    combine_with, underwrite_with, Eligibility, FinalVerdict, HealthClass, Provenance, Verdict,
};
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::config::EngineConfig;
use crate::error::QuoteError;
use crate::product::constraints_for;
use crate::request::EvaluationRequest;
use crate::result::{PremiumOutcome, QuoteResult};
use crate::snapshot::{SnapshotPort, SnapshotScope, UnderwritingSnapshot};

/// Reason attached to quotes for requests that name no product
pub const NO_PRODUCT_REASON: &str = "no product selected; premiums are product specific";

/// Evaluates one request against a loaded snapshot
pub fn evaluate_request(
    snapshot: &UnderwritingSnapshot,
    request: &EvaluationRequest,
    config: &EngineConfig,
) -> Result<QuoteResult, QuoteError> {
    request.validate()?;

    let profile = &request.applicant_profile;
    if let Some(reason) = product_knockout(snapshot, request) {
        info!(carrier_id = %request.carrier_id, reason = %reason, "product limits exclude applicant");
        let verdict = knockout_verdict(&reason, config);
        return Ok(QuoteResult::new(
            request.carrier_id,
            request.product_id,
            verdict,
            PremiumOutcome::not_rated(reason),
            profile.input_hash(),
        ));
    }

    let selector = request.selector(&config.default_variant);
    let verdict = underwrite_with(
        &snapshot.rule_sets,
        &selector,
        profile,
        config.flat_extra_composition,
        config.clean_profile_class,
    );

    let premium: PremiumOutcome = match request.rating_scope() {
        Some(scope) => PremiumRateResolver::new(config.lookup_mode, config.currency)
            .resolve(&verdict, profile, &request.policy_params, &scope, &snapshot.premium_rows)
            .into(),
        None => PremiumOutcome::not_rated(NO_PRODUCT_REASON),
    };

    Ok(QuoteResult::new(
        request.carrier_id,
        request.product_id,
        verdict,
        premium,
        profile.input_hash(),
    ))
}

/// Why the product's limits exclude this request, if they do
fn product_knockout(snapshot: &UnderwritingSnapshot, request: &EvaluationRequest) -> Option<String> {
    let product_id = request.product_id?;
    constraints_for(&snapshot.products, request.carrier_id, product_id, request.imo_id)?.knockout(
        request.applicant_profile.age,
        request.policy_params.face_amount,
    )
}

fn knockout_verdict(reason: &str, config: &EngineConfig) -> FinalVerdict {
    let mut verdict = Verdict::refer(Provenance::default(), reason);
    verdict.eligibility = Eligibility::Ineligible;
    verdict.health_class = HealthClass::Decline;
    combine_with(&[verdict], config.flat_extra_composition)
}

/// Quotes requests against snapshots loaded through a [`SnapshotPort`]
#[derive(Clone)]
pub struct QuoteService {
    port: Arc<dyn SnapshotPort>,
    config: EngineConfig,
}

impl QuoteService {
    pub fn new(port: Arc<dyn SnapshotPort>, config: EngineConfig) -> Self {
        Self { port, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Quotes a single request
    #[instrument(skip(self, request), fields(carrier_id = %request.carrier_id))]
    pub async fn quote(&self, request: &EvaluationRequest) -> Result<QuoteResult, QuoteError> {
        let snapshot = self.load(std::slice::from_ref(request)).await?;
        let result = evaluate_request(&snapshot, request, &self.config);
        log_result(&result);
        result
    }

    /// Quotes requests in order against one snapshot
    ///
    /// An invalid request fails only its own entry. The outer error is a
    /// snapshot that could not be loaded.
    #[instrument(skip(self, requests), fields(requests = requests.len()))]
    pub async fn quote_batch(
        &self,
        requests: &[EvaluationRequest],
    ) -> Result<Vec<Result<QuoteResult, QuoteError>>, QuoteError> {
        let snapshot = self.load(requests).await?;
        Ok(requests
            .iter()
            .map(|request| {
                let result = evaluate_request(&snapshot, request, &self.config);
                log_result(&result);
                result
            })
            .collect())
    }

    /// Quotes requests across blocking worker tasks
    ///
    /// Results come back in input order and equal those of
    /// [`quote_batch`](Self::quote_batch) for the same input.
    #[instrument(skip(self, requests), fields(requests = requests.len()))]
    pub async fn quote_portfolio(
        &self,
        requests: Vec<EvaluationRequest>,
    ) -> Result<Vec<Result<QuoteResult, QuoteError>>, QuoteError> {
        let snapshot = Arc::new(self.load(&requests).await?);
        let workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);
        let chunk_size = requests.len().div_ceil(workers).max(1);

        let mut handles = Vec::new();
        let mut pending = requests.into_iter().peekable();
        while pending.peek().is_some() {
            let chunk: Vec<EvaluationRequest> = pending.by_ref().take(chunk_size).collect();
            let len = chunk.len();
            let snapshot = Arc::clone(&snapshot);
            let config = self.config.clone();
            let handle = tokio::task::spawn_blocking(move || {
                chunk
                    .iter()
                    .map(|request| evaluate_request(&snapshot, request, &config))
                    .collect::<Vec<_>>()
            });
            handles.push((len, handle));
        }

        let mut results = Vec::new();
        for (len, handle) in handles {
            match handle.await {
                Ok(chunk_results) => results.extend(chunk_results),
                Err(err) => {
                    warn!(error = %err, "evaluation task failed");
                    let message = err.to_string();
                    results.extend((0..len).map(|_| Err(QuoteError::Task(message.clone()))));
                }
            }
        }
        results.iter().for_each(log_result);
        Ok(results)
    }

    async fn load(&self, requests: &[EvaluationRequest]) -> Result<UnderwritingSnapshot, QuoteError> {
        let scope = SnapshotScope::for_requests(requests);
        let snapshot = self.port.load_snapshot(&scope).await?;
        Ok(snapshot)
    }
}

fn log_result(result: &Result<QuoteResult, QuoteError>) {
    match result {
        Ok(quote) => info!(
            carrier_id = %quote.carrier_id,
            eligibility = %quote.eligibility,
            health_class = %quote.health_class,
            priced = quote.is_priced(),
            "quote evaluated"
        ),
        Err(err) => warn!(error = %err, "quote request rejected"),
    }
}
