//! Text completion providers and the judge built on top of them

use crate::prompt::{route_extraction_prompt, verification_prompt};
use crate::response::{parse_routes, parse_verification};
use async_trait::async_trait;
use serde::Serialize;
use specverify_core::{ExtractedRoute, Judge, JudgeError, RouteCategory, Verification};

/// Token budget for a verification answer
pub const VERIFY_MAX_TOKENS: u32 = 2000;

/// Token budget for a route list
pub const EXTRACT_MAX_TOKENS: u32 = 4000;

/// A model that turns a prompt into text
#[async_trait]
pub trait Completion: Send + Sync {
    fn name(&self) -> &str;

    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, JudgeError>;
}

/// A [`Judge`] that prompts a completion model and parses its JSON answers
pub struct PromptJudge<C> {
    model: C,
}

impl<C: Completion> PromptJudge<C> {
    pub fn new(model: C) -> Self {
        Self { model }
    }
}

#[async_trait]
impl<C: Completion> Judge for PromptJudge<C> {
    fn name(&self) -> &str {
        self.model.name()
    }

    async fn verify(
        &self,
        spec_text: &str,
        code: &[(String, String)],
        focus_hints: &[String],
    ) -> Result<Verification, JudgeError> {
        let prompt = verification_prompt(spec_text, code, focus_hints);
        let text = self.model.complete(&prompt, VERIFY_MAX_TOKENS).await?;
        parse_verification(&text)
    }

    async fn extract_routes(
        &self,
        source_type: &str,
        category: RouteCategory,
        code_text: &str,
    ) -> Result<Vec<ExtractedRoute>, JudgeError> {
        let prompt = route_extraction_prompt(source_type, category, code_text);
        let text = self.model.complete(&prompt, EXTRACT_MAX_TOKENS).await?;
        parse_routes(&text)
    }
}

pub(crate) fn transport(e: reqwest::Error) -> JudgeError {
    JudgeError::Http(e.to_string())
}

/// POST a JSON body and return the response text, mapping non-2xx statuses
/// to [`JudgeError::Api`].
pub(crate) async fn post_json<B: Serialize + ?Sized>(
    request: reqwest::RequestBuilder,
    body: &B,
) -> Result<String, JudgeError> {
    let resp = request.json(body).send().await.map_err(transport)?;
    let status = resp.status();
    let text = resp.text().await.map_err(transport)?;
    if !status.is_success() {
        return Err(JudgeError::Api {
            status: status.as_u16(),
            body: text,
        });
    }
    Ok(text)
}

/// The `{"error": {"message": ...}}` envelope shared by the providers
#[derive(serde::Deserialize)]
pub(crate) struct ApiError {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Canned {
        answer: String,
        prompts: Mutex<Vec<(String, u32)>>,
    }

    impl Canned {
        fn new(answer: &str) -> Self {
            Self {
                answer: answer.to_string(),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Completion for Canned {
        fn name(&self) -> &str {
            "canned"
        }

        async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, JudgeError> {
            self.prompts
                .lock()
                .unwrap()
                .push((prompt.to_string(), max_tokens));
            Ok(self.answer.clone())
        }
    }

    #[tokio::test]
    async fn test_verify_through_completion() {
        let judge = PromptJudge::new(Canned::new(
            "```json\n{\"matchPercentage\": 66, \"notes\": \"partial\"}\n```",
        ));
        let code = vec![("src/a.ts".to_string(), "x".to_string())];
        let verdict = judge.verify("# Spec", &code, &[]).await.unwrap();

        assert_eq!(verdict.match_percentage, 66);
        assert_eq!(judge.name(), "canned");
        let prompts = judge.model.prompts.lock().unwrap();
        assert_eq!(prompts[0].1, VERIFY_MAX_TOKENS);
        assert!(prompts[0].0.contains("### src/a.ts"));
    }

    #[tokio::test]
    async fn test_extract_through_completion() {
        let judge = PromptJudge::new(Canned::new("[{\"method\": \"GET\", \"path\": \"/a\"}]"));
        let routes = judge
            .extract_routes("express", RouteCategory::Api, "=== File: a.js ===\napp.get('/a')")
            .await
            .unwrap();

        assert_eq!(routes.len(), 1);
        let prompts = judge.model.prompts.lock().unwrap();
        assert_eq!(prompts[0].1, EXTRACT_MAX_TOKENS);
        assert!(prompts[0].0.contains("Express.js"));
    }
}
