//! Error types for Veder.

use thiserror::Error;

use crate::report::Language;

/// Maximum number of characters of offending text kept for diagnostics
pub const SNIPPET_MAX_CHARS: usize = 200;

#[derive(Error, Debug)]
pub enum VederError {
    /// The model's text could not be turned into a JSON document.
    #[error("Malformed response: {reason} (near: {snippet})")]
    MalformedResponse { reason: String, snippet: String },

    #[error("Service returned an empty response")]
    EmptyResponse,

    #[error("Service error: {0}")]
    Service(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl VederError {
    /// Build a `MalformedResponse`, keeping only the head of the offending text
    pub fn malformed(reason: impl Into<String>, text: &str) -> Self {
        VederError::MalformedResponse {
            reason: reason.into(),
            snippet: truncate_snippet(text),
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            VederError::MalformedResponse { .. } => -32700,
            VederError::EmptyResponse => -32001,
            VederError::Service(_) => -32002,
            VederError::Config(_) => -32003,
            VederError::Io(_) => -32006,
            VederError::Json(_) => -32603,
        }
    }

    /// Whether re-submitting the same query can plausibly succeed.
    /// Nothing retries automatically; callers use this to offer a retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            VederError::MalformedResponse { .. } | VederError::EmptyResponse | VederError::Service(_)
        )
    }

    /// Single user-facing message for display, one per failure class
    pub fn user_message(&self, language: Language) -> &'static str {
        match (self, language) {
            (VederError::MalformedResponse { .. }, Language::En) => {
                "Failed to parse the generated report. Please try again."
            }
            (VederError::MalformedResponse { .. }, Language::Zh) => {
                "数据解析严重失败 (JSON Error)，请重试。"
            }
            (VederError::EmptyResponse, Language::En) => {
                "The research service returned no content. Please try again."
            }
            (VederError::EmptyResponse, Language::Zh) => "研究服务未返回任何内容，请重试。",
            (VederError::Service(_), Language::En) => {
                "The research service is unreachable. Please try again later."
            }
            (VederError::Service(_), Language::Zh) => "审计生成失败，请稍后重试。",
            (_, Language::En) => "Failed to generate report. Please try again.",
            (_, Language::Zh) => "审计生成失败，请稍后重试。",
        }
    }
}

/// Truncate text for diagnostics on a char boundary
pub fn truncate_snippet(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(SNIPPET_MAX_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

pub type Result<T> = std::result::Result<T, VederError>;
