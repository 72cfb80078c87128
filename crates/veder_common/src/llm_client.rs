//! Generative service client abstraction.
//!
//! Provides a generic interface for calling the external generative model.
//! Supports the real HTTP implementation (Gemini `generateContent`) and a
//! scripted fake client for testing. Clients are constructed explicitly and
//! passed to the engine; there is no process-wide client.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, warn};
use veder_shared::error::truncate_snippet;
use veder_shared::{GroundingChunk, Result, VederError};

use crate::config::ServiceConfig;

/// One call to the generative service
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub system_instruction: Option<String>,
    pub prompt: String,
    pub temperature: f32,
    pub search_grounding: bool,
}

/// Raw service output: model text plus grounding side channel
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationOutput {
    pub text: Option<String>,
    pub grounding: Vec<GroundingChunk>,
}

impl GenerationOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            grounding: Vec::new(),
        }
    }

    pub fn with_grounding(mut self, grounding: Vec<GroundingChunk>) -> Self {
        self.grounding = grounding;
        self
    }
}

/// Generic generative client trait
#[async_trait]
pub trait GenerativeClient: Send + Sync {
    /// Send one request and wait for the full response
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationOutput>;
}

// ============================================================================
// HTTP client
// ============================================================================

/// Real client for the Gemini REST API
pub struct HttpGenerativeClient {
    config: ServiceConfig,
    api_key: String,
    client: reqwest::Client,
}

impl HttpGenerativeClient {
    /// Create a client, reading the API key from the configured environment variable
    pub fn new(config: ServiceConfig) -> Result<Self> {
        let api_key = config.api_key()?;
        Self::with_api_key(config, api_key)
    }

    pub fn with_api_key(config: ServiceConfig, api_key: impl Into<String>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| VederError::Service(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            api_key: api_key.into(),
            client,
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl GenerativeClient for HttpGenerativeClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationOutput> {
        let body = build_request_body(request);
        debug!(
            "Generative call: model={} prompt={} bytes grounding={}",
            self.config.model,
            request.prompt.len(),
            request.search_grounding
        );

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    VederError::Service(format!(
                        "Request timeout after {} seconds",
                        self.config.timeout_secs.unwrap_or_default()
                    ))
                } else {
                    VederError::Service(format!("Request failed: {}", e))
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| VederError::Service(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            warn!("Generative service returned HTTP {}", status);
            return Err(VederError::Service(format!(
                "HTTP {} from generative service: {}",
                status,
                truncate_snippet(&text)
            )));
        }

        parse_generate_response(&text)
    }
}

/// Request body for `generateContent`
pub fn build_request_body(request: &GenerationRequest) -> Value {
    let mut body = json!({
        "contents": [{"role": "user", "parts": [{"text": request.prompt}]}],
        "generationConfig": {"temperature": request.temperature},
    });
    if let Some(instruction) = &request.system_instruction {
        body["systemInstruction"] = json!({"parts": [{"text": instruction}]});
    }
    if request.search_grounding {
        body["tools"] = json!([{"google_search": {}}]);
    }
    body
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Default, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
    /// Reasoning parts are not part of the answer
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

/// Extract text and grounding from a `generateContent` response body
pub fn parse_generate_response(body: &str) -> Result<GenerationOutput> {
    let envelope: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| VederError::Service(format!("Unexpected response envelope: {}", e)))?;

    let Some(candidate) = envelope.candidates.into_iter().next() else {
        return Ok(GenerationOutput::default());
    };

    let parts: Vec<String> = candidate
        .content
        .map(|c| c.parts)
        .unwrap_or_default()
        .into_iter()
        .filter(|p| !p.thought)
        .filter_map(|p| p.text)
        .collect();
    let text = if parts.is_empty() { None } else { Some(parts.concat()) };

    let grounding = candidate
        .grounding_metadata
        .map(|g| g.grounding_chunks)
        .unwrap_or_default();

    Ok(GenerationOutput { text, grounding })
}

// ============================================================================
// Fake client
// ============================================================================

/// Scripted reply for the fake client
#[derive(Debug, Clone)]
pub enum FakeReply {
    Output(GenerationOutput),
    Empty,
    ServiceError(String),
}

impl FakeReply {
    pub fn text(text: impl Into<String>) -> Self {
        FakeReply::Output(GenerationOutput::text(text))
    }

    fn into_result(self) -> Result<GenerationOutput> {
        match self {
            FakeReply::Output(output) => Ok(output),
            FakeReply::Empty => Ok(GenerationOutput::default()),
            FakeReply::ServiceError(message) => Err(VederError::Service(message)),
        }
    }
}

/// Fake generative client for testing
pub struct FakeGenerativeClient {
    replies: Mutex<Vec<FakeReply>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl FakeGenerativeClient {
    /// Create a fake client with pre-defined replies, served in order.
    /// The last reply repeats once the others are used up.
    pub fn new(replies: Vec<FakeReply>) -> Self {
        Self {
            replies: Mutex::new(replies),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn always_text(text: impl Into<String>) -> Self {
        Self::new(vec![FakeReply::text(text)])
    }

    pub fn always_error(message: impl Into<String>) -> Self {
        Self::new(vec![FakeReply::ServiceError(message.into())])
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl GenerativeClient for FakeGenerativeClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationOutput> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());

        let mut replies = self.replies.lock().unwrap_or_else(|e| e.into_inner());
        let reply = match replies.len() {
            0 => FakeReply::Empty,
            1 => replies[0].clone(),
            _ => replies.remove(0),
        };
        reply.into_result()
    }
}
