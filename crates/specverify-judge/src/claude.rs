//! Anthropic Messages API

use crate::completion::{ApiError, Completion, post_json};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use specverify_core::JudgeError;

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

#[derive(Serialize)]
struct Request<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct Response {
    #[serde(default)]
    content: Vec<ContentBlock>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

/// Claude via the Anthropic Messages API
pub struct Claude {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl Claude {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

fn response_text(body: &str) -> Result<String, JudgeError> {
    let resp: Response = serde_json::from_str(body)
        .map_err(|e| JudgeError::MalformedResponse(format!("failed to parse response: {}", e)))?;
    if let Some(error) = resp.error {
        return Err(JudgeError::Api {
            status: 200,
            body: error.message,
        });
    }
    resp.content
        .into_iter()
        .next()
        .map(|block| block.text)
        .ok_or_else(|| JudgeError::EmptyResponse("claude".to_string()))
}

#[async_trait]
impl Completion for Claude {
    fn name(&self) -> &str {
        "claude"
    }

    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, JudgeError> {
        let request = Request {
            model: &self.model,
            max_tokens,
            messages: [Message {
                role: "user",
                content: prompt,
            }],
        };

        tracing::debug!(model = %self.model, max_tokens, "calling anthropic");
        let body = post_json(
            self.client
                .post(API_URL)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", API_VERSION),
            &request,
        )
        .await?;
        response_text(&body)
    }
}
