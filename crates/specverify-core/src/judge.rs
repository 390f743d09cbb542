//! The judge: an external oracle that scores spec/code alignment and
//! extracts routes from code

use crate::route::RouteCategory;
use crate::summary::Verification;
use async_trait::async_trait;
use serde::Deserialize;

/// Errors from a judge call
#[derive(Debug, thiserror::Error)]
pub enum JudgeError {
    #[error("request failed: {0}")]
    Http(String),

    #[error("API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("empty response from {0}")]
    EmptyResponse(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("cancelled")]
    Cancelled,

    #[error("no API key configured for {0}")]
    MissingApiKey(String),
}

/// A route as reported by the judge, before it is tagged with its source
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ExtractedRoute {
    #[serde(default)]
    pub method: String,
    pub path: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Overrides the source's category when set
    #[serde(default)]
    pub category: Option<RouteCategory>,
}

/// The oracle consulted for verification and framework route extraction.
///
/// One instance is shared by every concurrent verification, so
/// implementations must tolerate concurrent calls.
#[async_trait]
pub trait Judge: Send + Sync {
    /// Provider name, for logs and reports
    fn name(&self) -> &str;

    /// Score how well `code` (file path, file text) implements `spec_text`.
    async fn verify(
        &self,
        spec_text: &str,
        code: &[(String, String)],
        focus_hints: &[String],
    ) -> Result<Verification, JudgeError>;

    /// Pull routes out of framework code.
    ///
    /// `code_text` is a batch of files, each behind a `=== File: path ===` header.
    async fn extract_routes(
        &self,
        source_type: &str,
        category: RouteCategory,
        code_text: &str,
    ) -> Result<Vec<ExtractedRoute>, JudgeError>;
}
