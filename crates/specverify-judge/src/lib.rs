//! specverify-judge - LLM-backed [`Judge`] implementations
//!
//! Each provider is a [`Completion`] (prompt in, text out) wrapped in a
//! [`PromptJudge`], which builds the verification and route-extraction
//! prompts and parses the JSON the model answers with.
//!
//! ```no_run
//! use specverify_judge::new_judge;
//!
//! let judge = new_judge("claude", "sk-ant-...").unwrap();
//! assert_eq!(judge.name(), "claude");
//! ```

mod claude;
mod completion;
mod gemini;
mod openai;
pub mod prompt;
mod response;

pub use claude::Claude;
pub use completion::{Completion, EXTRACT_MAX_TOKENS, PromptJudge, VERIFY_MAX_TOKENS};
pub use gemini::Gemini;
pub use openai::OpenAi;
pub use response::{parse_routes, parse_verification};

use specverify_core::{Judge, JudgeError};
use std::sync::Arc;

/// Known LLM providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Claude,
    OpenAi,
    Gemini,
}

impl Provider {
    /// Resolve a provider name. Unrecognized names fall back to Claude.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "openai" | "gpt" => Provider::OpenAi,
            "gemini" | "google" => Provider::Gemini,
            _ => Provider::Claude,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Claude => "claude",
            Provider::OpenAi => "openai",
            Provider::Gemini => "gemini",
        }
    }

    /// Environment variable conventionally holding this provider's key
    pub fn api_key_env(&self) -> &'static str {
        match self {
            Provider::Claude => "ANTHROPIC_API_KEY",
            Provider::OpenAi => "OPENAI_API_KEY",
            Provider::Gemini => "GOOGLE_API_KEY",
        }
    }
}

/// Build a judge for a provider name
pub fn new_judge(provider: &str, api_key: &str) -> Result<Arc<dyn Judge>, JudgeError> {
    let provider = Provider::from_name(provider);
    if api_key.trim().is_empty() {
        return Err(JudgeError::MissingApiKey(provider.as_str().to_string()));
    }

    let judge: Arc<dyn Judge> = match provider {
        Provider::Claude => Arc::new(PromptJudge::new(Claude::new(api_key))),
        Provider::OpenAi => Arc::new(PromptJudge::new(OpenAi::new(api_key))),
        Provider::Gemini => Arc::new(PromptJudge::new(Gemini::new(api_key))),
    };
    Ok(judge)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_aliases() {
        assert_eq!(Provider::from_name("claude"), Provider::Claude);
        assert_eq!(Provider::from_name("Anthropic"), Provider::Claude);
        assert_eq!(Provider::from_name("gpt"), Provider::OpenAi);
        assert_eq!(Provider::from_name("google"), Provider::Gemini);
        assert_eq!(Provider::from_name("mystery"), Provider::Claude);
    }

    #[test]
    fn test_new_judge() {
        assert_eq!(new_judge("gemini", "key").unwrap().name(), "gemini");
        assert_eq!(new_judge("openai", "key").unwrap().name(), "openai");
        assert!(matches!(
            new_judge("openai", "  "),
            Err(JudgeError::MissingApiKey(name)) if name == "openai"
        ));
    }
}
