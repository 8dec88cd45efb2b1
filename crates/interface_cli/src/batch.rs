//! Request files and result rendering

use std::path::Path;

use anyhow::Context;
use domain_quoting::{rank, EvaluationRequest, QuoteError, QuoteResult};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Deserialize)]
#[serde(untagged)]
enum RequestDocument {
    Batch(Vec<EvaluationRequest>),
    Single(Box<EvaluationRequest>),
}

/// Parses a request document: one request or an array of them
pub fn parse_requests(document: &str) -> anyhow::Result<Vec<EvaluationRequest>> {
    let parsed: RequestDocument =
        serde_json::from_str(document).context("request document is neither a request nor an array of requests")?;
    Ok(match parsed {
        RequestDocument::Batch(requests) => requests,
        RequestDocument::Single(request) => vec![*request],
    })
}

/// Reads a request file
pub async fn read_requests(path: &Path) -> anyhow::Result<Vec<EvaluationRequest>> {
    let document = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("cannot read requests from {}", path.display()))?;
    parse_requests(&document)
}

/// Renders batch results as a JSON array
///
/// Entries keep input order unless `ranked`, in which case quotes are
/// ordered best offer first and rejected requests follow. A rejected
/// request renders as `{"index", "error"}`.
pub fn render(results: Vec<Result<QuoteResult, QuoteError>>, ranked: bool) -> anyhow::Result<Value> {
    let mut quotes = Vec::new();
    let mut rendered = Vec::with_capacity(results.len());
    let mut errors = Vec::new();

    for (index, result) in results.into_iter().enumerate() {
        match result {
            Ok(quote) if ranked => quotes.push(quote),
            Ok(quote) => rendered.push(serde_json::to_value(&quote)?),
            Err(err) => {
                let entry = json!({ "index": index, "error": err.to_string() });
                if ranked {
                    errors.push(entry);
                } else {
                    rendered.push(entry);
                }
            }
        }
    }

    if ranked {
        rank(&mut quotes);
        for quote in &quotes {
            rendered.push(serde_json::to_value(quote)?);
        }
        rendered.extend(errors);
    }
    Ok(Value::Array(rendered))
}
