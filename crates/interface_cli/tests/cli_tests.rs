//! Batch Quote CLI Tests
//!
//! Exercises the file-to-JSON path the `uw-quote` binary runs: reading a
//! request document, quoting it against a snapshot file and rendering the
//! results.

use std::io::Write;
use std::sync::Arc;

use domain_quoting::{EngineConfig, QuoteService};
use infra_snapshot::JsonFileSnapshot;
use interface_cli::{parse_requests, read_requests, render};
use tempfile::NamedTempFile;
use test_utils::{ProfileFixtures, RequestBuilder, SAMPLE_SNAPSHOT};

fn write_json(value: &impl serde::Serialize) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(serde_json::to_string(value).expect("serialize").as_bytes())
        .expect("write");
    file
}

// ============================================================================
// REQUEST DOCUMENT TESTS
// ============================================================================

mod request_document_tests {
    use super::*;

    /// A single request object is a batch of one
    #[test]
    fn test_single_request_document() {
        let request = RequestBuilder::new().build();
        let document = serde_json::to_string(&request).expect("serialize");

        let requests = parse_requests(&document).expect("parse");

        assert_eq!(requests, vec![request]);
    }

    /// An array keeps its order
    #[tokio::test]
    async fn test_array_document() {
        let batch = vec![
            RequestBuilder::new().build(),
            RequestBuilder::new().with_profile(ProfileFixtures::diabetic(true)).build(),
        ];
        let file = write_json(&batch);

        let requests = read_requests(file.path()).await.expect("read");

        assert_eq!(requests, batch);
    }
}

// ============================================================================
// END TO END TESTS
// ============================================================================

mod end_to_end_tests {
    use super::*;

    async fn run(ranked: bool) -> serde_json::Value {
        let snapshot = write_json(&*SAMPLE_SNAPSHOT);
        let mut too_old = ProfileFixtures::healthy_male();
        too_old.age = 130;
        let requests = write_json(&vec![
            RequestBuilder::new().with_profile(ProfileFixtures::diabetic(true)).build(),
            RequestBuilder::new().with_profile(too_old).build(),
            RequestBuilder::new().build(),
        ]);

        let service = QuoteService::new(
            Arc::new(JsonFileSnapshot::new(snapshot.path())),
            EngineConfig::default(),
        );
        let results = service
            .quote_portfolio(read_requests(requests.path()).await.expect("read"))
            .await
            .expect("snapshot loads");
        render(results, ranked).expect("render")
    }

    /// Unranked output keeps input order with errors in place
    #[tokio::test]
    async fn test_unranked_output() {
        let output = run(false).await;

        let entries = output.as_array().expect("array");
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0]["eligibility"], "ineligible");
        assert_eq!(entries[0]["premium"]["status"], "not_rated");
        assert_eq!(entries[1]["index"], 1);
        assert_eq!(entries[2]["eligibility"], "eligible");
        assert_eq!(entries[2]["premium"]["status"], "quoted");
    }

    /// Ranked output puts the best offer first and errors last
    #[tokio::test]
    async fn test_ranked_output() {
        let output = run(true).await;

        let entries = output.as_array().expect("array");
        assert_eq!(entries[0]["health_class"], "preferred");
        assert_eq!(entries[1]["health_class"], "decline");
        assert!(entries[2]["error"].is_string(), "The rejected request comes last");
    }
}
