//! Underwriting snapshot and the port that loads it
//!
//! A snapshot is the immutable catalog one batch is evaluated against: the
//! rule sets, premium matrix rows and product constraints for the carriers
//! in scope. It is
//! loaded once per batch and shared read-only, behind an `Arc` when the
//! batch is fanned out across tasks.
//!
//! # Adapters
//!
//! - in-memory, for tests and embedding
//! - JSON file, for the command line tool
//!
//! ```rust,ignore
//! let port: Arc<dyn SnapshotPort> = Arc::new(JsonFileSnapshot::new("snapshot.json"));
//! let snapshot = port.load_snapshot(&SnapshotScope::all()).await?;
//! ```

use async_trait::async_trait;
use core_kernel::{CarrierId, DomainPort, ImoId, PortError, RuleSetId};
use domain_rating::PremiumMatrixRow;
use domain_underwriting::{ensure_valid, validate_rule_set, RuleSet, UnderwritingError, ValidationReport};
use serde::{Deserialize, Serialize};

use crate::product::ProductConstraints;
use crate::request::EvaluationRequest;

/// Rule sets, premium rows and product limits for one evaluation batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnderwritingSnapshot {
    #[serde(default)]
    pub rule_sets: Vec<RuleSet>,
    #[serde(default)]
    pub premium_rows: Vec<PremiumMatrixRow>,
    #[serde(default)]
    pub products: Vec<ProductConstraints>,
}

impl UnderwritingSnapshot {
    pub fn new(rule_sets: Vec<RuleSet>, premium_rows: Vec<PremiumMatrixRow>) -> Self {
        Self {
            rule_sets,
            premium_rows,
            products: Vec::new(),
        }
    }

    pub fn with_products(mut self, products: Vec<ProductConstraints>) -> Self {
        self.products = products;
        self
    }

    /// The part of the snapshot a scope can see
    pub fn restrict(&self, scope: &SnapshotScope) -> Self {
        Self {
            rule_sets: self
                .rule_sets
                .iter()
                .filter(|rs| scope.admits(rs.carrier_id, rs.imo_id))
                .cloned()
                .collect(),
            premium_rows: self
                .premium_rows
                .iter()
                .filter(|row| scope.admits(row.carrier_id, row.imo_id))
                .cloned()
                .collect(),
            products: self
                .products
                .iter()
                .filter(|product| scope.admits(product.carrier_id, product.imo_id))
                .cloned()
                .collect(),
        }
    }

    /// Validation reports for every rule set that has findings
    pub fn validate(&self) -> Vec<(RuleSetId, ValidationReport)> {
        self.rule_sets
            .iter()
            .map(|rs| (rs.id, validate_rule_set(rs)))
            .filter(|(_, report)| !report.errors.is_empty() || !report.warnings.is_empty())
            .collect()
    }

    /// Fails on the first rule set with validation errors
    pub fn ensure_valid(&self) -> Result<(), UnderwritingError> {
        self.rule_sets.iter().try_for_each(ensure_valid)
    }
}

/// Which part of the catalog to load
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotScope {
    /// Restrict IMO-owned data to this IMO; shared data is always included
    pub imo_id: Option<ImoId>,
    /// Carriers to load; empty loads every carrier
    pub carrier_ids: Vec<CarrierId>,
}

impl SnapshotScope {
    /// Every carrier and every IMO
    pub fn all() -> Self {
        Self::default()
    }

    /// The carriers a batch of requests touches
    ///
    /// The IMO is kept only when every request names the same one.
    pub fn for_requests(requests: &[EvaluationRequest]) -> Self {
        let mut carrier_ids: Vec<CarrierId> = requests.iter().map(|r| r.carrier_id).collect();
        carrier_ids.sort();
        carrier_ids.dedup();

        let imo_id = match requests.first().map(|r| r.imo_id) {
            Some(first) if requests.iter().all(|r| r.imo_id == first) => first,
            _ => None,
        };

        Self { imo_id, carrier_ids }
    }

    /// Whether data owned by `imo_id` for `carrier_id` is in scope
    ///
    /// Shared data is always in scope, IMO-owned data only for that IMO.
    /// Without a scope IMO every IMO's data is loaded, and the same
    /// shared-plus-own rule is applied per request at resolution.
    pub fn admits(&self, carrier_id: CarrierId, imo_id: Option<ImoId>) -> bool {
        let carrier_ok = self.carrier_ids.is_empty() || self.carrier_ids.contains(&carrier_id);
        let imo_ok = match (self.imo_id, imo_id) {
            (Some(scope), Some(owner)) => scope == owner,
            _ => true,
        };
        carrier_ok && imo_ok
    }
}

/// Source of underwriting snapshots
#[async_trait]
pub trait SnapshotPort: DomainPort {
    /// Loads the rule sets, premium rows and product limits visible to `scope`
    async fn load_snapshot(&self, scope: &SnapshotScope) -> Result<UnderwritingSnapshot, PortError>;
}
