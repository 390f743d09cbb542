//! Google Gemini generateContent API

use crate::completion::{ApiError, Completion, post_json};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use specverify_core::JudgeError;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Request<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct Response {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

pub struct Gemini {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl Gemini {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    fn url(&self) -> String {
        format!("{}/{}:generateContent", API_BASE, self.model)
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
    resp.candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().next())
        .map(|part| part.text)
        .ok_or_else(|| JudgeError::EmptyResponse("gemini".to_string()))
}

#[async_trait]
impl Completion for Gemini {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, JudgeError> {
        let request = Request {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: max_tokens,
                temperature: 0.1,
            },
        };

        tracing::debug!(model = %self.model, max_tokens, "calling gemini");
        let body = post_json(
            self.client
                .post(self.url())
                .query(&[("key", self.api_key.as_str())]),
            &request,
        )
        .await?;
        response_text(&body)
    }
}
