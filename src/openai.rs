//! Minimal OpenAI client — the provider gateway.
//!
//! We only call chat.completions. The gateway returns the provider's raw
//! message text; parsing and validation happen downstream, because the reply
//! is untrusted regardless of what the request asked for. Calls are
//! instrumented and log model names, latencies, and response sizes (not
//! contents).
//!
//! NOTE: We never log the API key and we keep payload truncations short.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::PipelineError;

/// Fixed invocation parameters for one task. Lower temperatures for
/// evaluative tasks, higher for creative generation; max_tokens sized to the
/// largest valid payload the task can produce.
#[derive(Clone, Copy, Debug)]
pub struct CallOpts {
  pub temperature: f32,
  pub max_tokens: u32,
  /// Ask the provider for a machine-parseable JSON object where supported.
  pub json_object: bool,
}

pub const OPTS_QUESTIONS: CallOpts = CallOpts { temperature: 0.9, max_tokens: 4096, json_object: true };
pub const OPTS_ROUTE: CallOpts = CallOpts { temperature: 0.8, max_tokens: 4096, json_object: true };
pub const OPTS_ANSWER_EVAL: CallOpts = CallOpts { temperature: 0.2, max_tokens: 512, json_object: true };
pub const OPTS_REASONING_EVAL: CallOpts = CallOpts { temperature: 0.2, max_tokens: 1024, json_object: true };
pub const OPTS_MOTIVATION: CallOpts = CallOpts { temperature: 0.9, max_tokens: 128, json_object: false };

#[derive(Clone)]
pub struct OpenAI {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub model: String,
}

impl OpenAI {
  /// Construct the client if we find OPENAI_API_KEY; otherwise return None.
  pub fn from_env() -> Option<Self> {
    let api_key = std::env::var("OPENAI_API_KEY").ok()?;
    let base_url =
      std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
    let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());

    // Timeout bounds the single suspension point of every pipeline run.
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(20))
      .build()
      .ok()?;

    Some(Self { client, api_key, base_url, model })
  }

  /// One chat completion. Returns the raw message text; no retries here.
  #[instrument(level = "info", skip(self, system, user), fields(model = %self.model, temp = opts.temperature))]
  pub async fn chat(
    &self,
    system: &str,
    user: &str,
    opts: CallOpts,
  ) -> Result<String, PipelineError> {
    let url = format!("{}/chat/completions", self.base_url);
    let req = ChatCompletionRequest {
      model: self.model.clone(),
      messages: vec![
        ChatMessageReq { role: "system".into(), content: system.into() },
        ChatMessageReq { role: "user".into(), content: user.into() },
      ],
      temperature: opts.temperature,
      response_format: opts
        .json_object
        .then(|| ResponseFormat { r#type: "json_object".into() }),
      max_tokens: Some(opts.max_tokens),
    };

    let start = std::time::Instant::now();
    let res = self
      .client
      .post(&url)
      .header(USER_AGENT, "edugen-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(&req)
      .send()
      .await
      .map_err(|e| PipelineError::ProviderUnavailable(e.to_string()))?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let msg = extract_openai_error(&body).unwrap_or(body);
      return Err(PipelineError::ProviderUnavailable(format!("HTTP {}: {}", status, msg)));
    }

    let body: ChatCompletionResponse = res
      .json()
      .await
      .map_err(|e| PipelineError::ProviderUnavailable(e.to_string()))?;
    if let Some(usage) = &body.usage {
      info!(prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "OpenAI usage");
    }
    let text = body
      .choices
      .first()
      .and_then(|c| c.message.content.clone())
      .unwrap_or_default();

    info!(elapsed = ?start.elapsed(), reply_bytes = text.len(), "OpenAI reply received");
    Ok(text)
  }
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
  temperature: f32,
  #[serde(skip_serializing_if = "Option::is_none")]
  response_format: Option<ResponseFormat>,
  #[serde(skip_serializing_if = "Option::is_none")]
  max_tokens: Option<u32>,
}
#[derive(Serialize)]
struct ChatMessageReq { role: String, content: String }
#[derive(Serialize)]
struct ResponseFormat { #[serde(rename = "type")] r#type: String }

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice { message: ChatMessageResp }
#[derive(Deserialize)]
struct ChatMessageResp { content: Option<String> }
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] prompt_tokens: Option<u32>,
  #[serde(default)] completion_tokens: Option<u32>,
  #[serde(default)] total_tokens: Option<u32>,
}

/// Try to extract a clean error message from an OpenAI error body.
fn extract_openai_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  match serde_json::from_str::<EWrap>(body) {
    Ok(w) => Some(w.error.message),
    Err(_) => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn extracts_openai_error_message() {
    let body = r#"{"error":{"message":"Rate limit reached","type":"rate_limit"}}"#;
    assert_eq!(extract_openai_error(body).as_deref(), Some("Rate limit reached"));
    assert_eq!(extract_openai_error("not json"), None);
  }
}
