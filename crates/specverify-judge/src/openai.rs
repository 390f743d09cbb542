//! OpenAI Chat Completions API

use crate::completion::{ApiError, Completion, post_json};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use specverify_core::JudgeError;

const API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o";

#[derive(Serialize)]
struct Request<'a> {
    model: &'a str,
    messages: [Message<'a>; 1],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct Response {
    #[serde(default)]
    choices: Vec<Choice>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct OpenAi {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAi {
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
    resp.choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| JudgeError::EmptyResponse("openai".to_string()))
}

#[async_trait]
impl Completion for OpenAi {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, JudgeError> {
        let request = Request {
            model: &self.model,
            messages: [Message {
                role: "user",
                content: prompt,
            }],
            max_tokens,
            temperature: 0.1,
        };

        tracing::debug!(model = %self.model, max_tokens, "calling openai");
        let body = post_json(
            self.client.post(API_URL).bearer_auth(&self.api_key),
            &request,
        )
        .await?;
        response_text(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_text() {
        let body = r#"{"choices": [{"index": 0, "message": {"role": "assistant", "content": "[]"}}]}"#;
        assert_eq!(response_text(body).unwrap(), "[]");
    }

    #[test]
    fn test_response_without_choices() {
        assert!(matches!(
            response_text(r#"{"choices": []}"#),
            Err(JudgeError::EmptyResponse(_))
        ));
        assert!(matches!(
            response_text(r#"{"error": {"message": "bad key", "type": "invalid_request_error"}}"#),
            Err(JudgeError::Api { .. })
        ));
    }
}
