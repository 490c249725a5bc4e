//! Blocking client for an OpenAI-compatible chat completions endpoint.

use super::{
    types::{ChatMessage, ChatRequest, ChatResponse},
    Completer, LlmError,
};
use crate::config::{Credentials, Llm};
use crate::error::{Error, Result};
use std::time::Duration;
use tracing::debug;

pub struct OpenAiCompleter {
    client: reqwest::blocking::Client,
    endpoint: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl OpenAiCompleter {
    pub fn new(cfg: &Llm, creds: &Credentials) -> Result<Self> {
        let mut builder = reqwest::blocking::Client::builder()
            .user_agent(concat!("proofread/", env!("CARGO_PKG_VERSION")));
        if cfg.timeout_seconds > 0 {
            builder = builder.timeout(Duration::from_secs(cfg.timeout_seconds));
        }
        let client = builder
            .build()
            .map_err(|e| Error::Configuration(format!("building HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: chat_endpoint(&cfg.base_url),
            api_key: creds.api_key().to_string(),
            model: cfg.model.clone(),
            max_tokens: cfg.max_tokens,
            temperature: cfg.temperature,
        })
    }
}

fn chat_endpoint(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

impl Completer for OpenAiCompleter {
    fn complete(&self, prompt: &str) -> std::result::Result<String, LlmError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| LlmError::Malformed(e.to_string()))?;

        if let Some(usage) = &parsed.usage {
            debug!(
                "completion usage prompt_tokens={} completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::Malformed("response has no choices".into()))?;
        if let Some(reason) = choice.finish_reason.as_deref() {
            if reason == "length" {
                debug!("completion truncated at max_tokens={}", self.max_tokens);
            }
        }
        Ok(choice.message.content.unwrap_or_default())
    }
}
