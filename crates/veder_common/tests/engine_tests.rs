//! Orchestration tests: report pipeline over the fake client, error classes,
//! sequence guard ordering and the market fallback.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use veder_common::config::Config;
use veder_common::llm_client::{
    FakeGenerativeClient, FakeReply, GenerationOutput, GenerationRequest, GenerativeClient,
};
use veder_common::{ResearchEngine, Submission};
use veder_shared::report::UNKNOWN_TOKEN_SYMBOL;
use veder_shared::{GroundingChunk, Language, Result, VederError};

fn engine_with(replies: Vec<FakeReply>) -> (Arc<FakeGenerativeClient>, ResearchEngine<FakeGenerativeClient>) {
    let client = Arc::new(FakeGenerativeClient::new(replies));
    let engine = ResearchEngine::new(client.clone(), Config::default());
    (client, engine)
}

fn named_report(name: &str) -> String {
    format!(r#"{{"tokenName": "{}", "tokenSymbol": "{}", "totalScore": 70}}"#, name, name.to_uppercase())
}

/// Client whose replies are released by the test, keyed by a marker in the prompt
struct GatedClient {
    gates: Mutex<HashMap<&'static str, oneshot::Receiver<Result<GenerationOutput>>>>,
    seen: AtomicUsize,
}

impl GatedClient {
    fn new() -> Self {
        Self {
            gates: Mutex::new(HashMap::new()),
            seen: AtomicUsize::new(0),
        }
    }

    fn gate(&self, marker: &'static str) -> oneshot::Sender<Result<GenerationOutput>> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(marker, rx);
        tx
    }

    fn seen(&self) -> usize {
        self.seen.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerativeClient for GatedClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationOutput> {
        let rx = {
            let mut gates = self.gates.lock().unwrap();
            let marker = gates.keys().find(|m| request.prompt.contains(**m)).copied();
            marker.and_then(|m| gates.remove(m))
        };
        self.seen.fetch_add(1, Ordering::SeqCst);
        match rx {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(VederError::Service("gate dropped".to_string()))),
            None => Err(VederError::EmptyResponse),
        }
    }
}

async fn wait_for_calls(client: &GatedClient, n: usize) {
    while client.seen() < n {
        tokio::task::yield_now().await;
    }
}

// ============================================================================
// Report pipeline
// ============================================================================

#[tokio::test]
async fn test_fenced_report_with_grounding() {
    let text = "Here is the report:\n```json\n{\"tokenName\": \"Aave\", \"tokenSymbol\": \"AAVE\", \"totalScore\": 82, \"verdict\": \"Buy\",}\n```";
    let output = GenerationOutput::text(text).with_grounding(vec![
        GroundingChunk::web("Aave", "https://aave.com"),
        GroundingChunk::default(),
        GroundingChunk::web("Docs", "https://docs.aave.com"),
    ]);
    let (client, engine) = engine_with(vec![FakeReply::Output(output)]);

    let report = engine.generate_report("aave", Language::En).await.unwrap();

    assert_eq!(report.token_name, "Aave");
    assert_eq!(report.total_score, 82.0);
    assert_eq!(report.verdict, "Buy");
    assert_eq!(report.language, Language::En);
    assert_eq!(report.sources.len(), 2);
    assert_eq!(report.sources[1].uri, "https://docs.aave.com");
    assert_eq!(client.call_count(), 1);
}

#[tokio::test]
async fn test_language_follows_request() {
    let (_, engine) = engine_with(vec![FakeReply::text(r#"{"language": "en", "tokenName": "Sui"}"#)]);
    let report = engine.generate_report("sui", Language::Zh).await.unwrap();
    assert_eq!(report.language, Language::Zh);
}

#[tokio::test]
async fn test_prose_only_is_malformed() {
    let (_, engine) = engine_with(vec![FakeReply::text("I could not find that token.")]);
    let err = engine.generate_report("nothing", Language::En).await.unwrap_err();
    assert!(matches!(err, VederError::MalformedResponse { .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_empty_and_whitespace_text() {
    let (_, engine) = engine_with(vec![FakeReply::Empty, FakeReply::text("   \n")]);
    for _ in 0..2 {
        let err = engine.generate_report("x", Language::En).await.unwrap_err();
        assert!(matches!(err, VederError::EmptyResponse));
    }
}

#[tokio::test]
async fn test_service_error_propagates() {
    let (_, engine) = engine_with(vec![FakeReply::ServiceError("HTTP 429".to_string())]);
    let err = engine.generate_report("x", Language::En).await.unwrap_err();
    assert!(matches!(err, VederError::Service(_)));
}

#[tokio::test]
async fn test_sparse_document_is_degraded_not_failed() {
    let (_, engine) = engine_with(vec![FakeReply::text("{}")]);
    let report = engine.generate_report("x", Language::En).await.unwrap();
    assert_eq!(report.token_symbol, UNKNOWN_TOKEN_SYMBOL);
    assert!(report.is_degraded());
}

#[tokio::test]
async fn test_holder_validation_does_not_fail_report() {
    let mut config = Config::default();
    config.validation.check_holder_percentages = true;
    let client = Arc::new(FakeGenerativeClient::always_text(
        r#"{"deepDive": {"addressProfile": [{"type": "Staking", "percentage": 30}]}}"#,
    ));
    let engine = ResearchEngine::new(client, config);

    let report = engine.generate_report("x", Language::En).await.unwrap();
    assert_eq!(report.deep_dive.address_profile_total(), 30.0);
}

// ============================================================================
// Submission and sequence guard
// ============================================================================

#[tokio::test]
async fn test_submit_stores_latest() {
    let (_, engine) = engine_with(vec![FakeReply::text(named_report("Aave"))]);

    let submission = engine.submit("aave", Language::En).await.unwrap();
    match submission {
        Submission::Current(report) => assert_eq!(report.token_name, "Aave"),
        Submission::Superseded => panic!("single submission cannot be superseded"),
    }
    assert_eq!(engine.latest().status(), "complete");
    assert_eq!(engine.latest().report().unwrap().token_symbol, "AAVE");
}

#[tokio::test]
async fn test_submit_failure_recorded() {
    let (_, engine) = engine_with(vec![FakeReply::text("no json here")]);
    let err = engine.submit("x", Language::En).await.unwrap_err();
    assert!(matches!(err, VederError::MalformedResponse { .. }));
    assert_eq!(engine.latest().status(), "error");
    assert!(engine.latest().report().is_none());
}

#[tokio::test]
async fn test_late_older_response_is_discarded() {
    let client = Arc::new(GatedClient::new());
    let release_a = client.gate("QUERY_ALPHA");
    let release_b = client.gate("QUERY_BRAVO");
    let engine = Arc::new(ResearchEngine::new(client.clone(), Config::default()));

    let e = engine.clone();
    let task_a = tokio::spawn(async move { e.submit("QUERY_ALPHA", Language::En).await });
    wait_for_calls(&client, 1).await;

    let e = engine.clone();
    let task_b = tokio::spawn(async move { e.submit("QUERY_BRAVO", Language::En).await });
    wait_for_calls(&client, 2).await;

    release_b.send(Ok(GenerationOutput::text(named_report("Bravo")))).unwrap();
    let b = task_b.await.unwrap().unwrap();
    assert!(matches!(b, Submission::Current(_)));

    release_a.send(Ok(GenerationOutput::text(named_report("Alpha")))).unwrap();
    let a = task_a.await.unwrap().unwrap();
    assert_eq!(a, Submission::Superseded);

    assert_eq!(engine.latest().report().unwrap().token_name, "Bravo");
}

#[tokio::test]
async fn test_late_older_error_is_discarded() {
    let client = Arc::new(GatedClient::new());
    let release_a = client.gate("QUERY_ALPHA");
    let release_b = client.gate("QUERY_BRAVO");
    let engine = Arc::new(ResearchEngine::new(client.clone(), Config::default()));

    let e = engine.clone();
    let task_a = tokio::spawn(async move { e.submit("QUERY_ALPHA", Language::En).await });
    wait_for_calls(&client, 1).await;
    let e = engine.clone();
    let task_b = tokio::spawn(async move { e.submit("QUERY_BRAVO", Language::En).await });
    wait_for_calls(&client, 2).await;

    release_b.send(Ok(GenerationOutput::text(named_report("Bravo")))).unwrap();
    task_b.await.unwrap().unwrap();

    release_a.send(Err(VederError::Service("timeout".to_string()))).unwrap();
    assert_eq!(task_a.await.unwrap().unwrap(), Submission::Superseded);
    assert_eq!(engine.latest().status(), "complete");
}

#[tokio::test]
async fn test_in_order_responses_keep_newest() {
    let client = Arc::new(GatedClient::new());
    let release_a = client.gate("QUERY_ALPHA");
    let release_b = client.gate("QUERY_BRAVO");
    let engine = Arc::new(ResearchEngine::new(client.clone(), Config::default()));

    let e = engine.clone();
    let task_a = tokio::spawn(async move { e.submit("QUERY_ALPHA", Language::En).await });
    wait_for_calls(&client, 1).await;
    let e = engine.clone();
    let task_b = tokio::spawn(async move { e.submit("QUERY_BRAVO", Language::En).await });
    wait_for_calls(&client, 2).await;

    // A resolves first but B was already issued, so A is still superseded
    release_a.send(Ok(GenerationOutput::text(named_report("Alpha")))).unwrap();
    assert_eq!(task_a.await.unwrap().unwrap(), Submission::Superseded);
    assert_eq!(engine.latest().status(), "pending");

    release_b.send(Ok(GenerationOutput::text(named_report("Bravo")))).unwrap();
    assert!(matches!(task_b.await.unwrap().unwrap(), Submission::Current(_)));
    assert_eq!(engine.latest().report().unwrap().token_name, "Bravo");
}

// ============================================================================
// Market intelligence
// ============================================================================

#[tokio::test]
async fn test_market_intelligence_parses_lists() {
    let text = r#"```json
{
  "newListings": [ { "name": "Berachain", "symbol": "BERA", "price": "$7.10", "platform": "Binance", "description": "L1", "trend": "Up" } ]
  "upcomingProjects": [ { "name": "Monad", "symbol": "MON", "launchDate": "Q3", "platform": "Monad", "description": "EVM L1" } ]
}
```"#;
    let (client, engine) = engine_with(vec![FakeReply::text(text)]);

    let market = engine.market_intelligence(Language::En).await.unwrap();
    assert_eq!(market.new_listings.len(), 1);
    assert_eq!(market.new_listings[0].symbol, "BERA");
    assert_eq!(market.upcoming_projects[0].launch_date.as_deref(), Some("Q3"));

    let request = &client.requests()[0];
    assert_eq!(request.temperature, 0.1);
    assert!(request.system_instruction.is_none());
}

#[tokio::test]
async fn test_market_failure_falls_back_to_empty() {
    let (_, engine) = engine_with(vec![FakeReply::ServiceError("quota".to_string())]);

    assert!(engine.market_intelligence(Language::Zh).await.is_err());
    let market = engine.market_intelligence_or_empty(Language::Zh).await;
    assert!(market.is_empty());
    assert!(!market.generated_at.is_empty());
}
