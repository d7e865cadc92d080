use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use shopmate_core::{
    GenError, GenerationParams, LLMProvider, LLMResponse, PromptContext, Role, Usage,
};
use tracing::{debug, info};

use crate::retry::{RetryPolicy, retry_with_backoff};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Generation backend backed by the Gemini `generateContent` API.
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    retry: RetryPolicy,
}

impl GeminiProvider {
    pub fn new(api_key: String, timeout: Duration) -> anyhow::Result<Self> {
        info!("Creating GeminiProvider");
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            retry: RetryPolicy::default(),
        })
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    #[must_use]
    pub const fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Return the first candidate model that accepts a tiny request.
    ///
    /// A successful HTTP exchange counts as working even when the reply is
    /// empty, since a five-token budget may be used up before any text.
    pub async fn probe_models(&self, candidates: &[String]) -> Option<String> {
        if !self.has_api_key() {
            return None;
        }

        let body = json!({
            "contents": [{"role": "user", "parts": [{"text": "hello"}]}],
            "generationConfig": {"maxOutputTokens": 5},
        });

        for model in candidates {
            match self.try_send(model, &body).await {
                Ok(_) => {
                    info!("Model probe succeeded: {model}");
                    return Some(model.clone());
                }
                Err(e) => debug!("Model probe failed for {model}: {e}"),
            }
        }

        None
    }

    /// Helper method to send a single request
    async fn try_send(&self, model: &str, body: &Value) -> Result<Value, GenError> {
        if !self.has_api_key() {
            return Err(GenError::MissingApiKey);
        }

        let response = self
            .client
            .post(format!("{}/models/{model}:generateContent", self.base_url))
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| map_transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(map_status(status.as_u16(), text));
        }

        response.json::<Value>().await.map_err(|e| {
            if e.is_timeout() {
                GenError::Timeout
            } else {
                GenError::Parse(e.to_string())
            }
        })
    }
}

#[async_trait]
impl LLMProvider for GeminiProvider {
    async fn generate(
        &self,
        prompt: &PromptContext,
        params: &GenerationParams,
    ) -> Result<LLMResponse, GenError> {
        let request = build_request(prompt, params);

        info!(
            "Sending request to Gemini API: model={}, history={}, search_context={}",
            self.model,
            prompt.history.len(),
            prompt.has_search_context()
        );

        let model = self.model.as_str();
        let request = &request;
        let response = retry_with_backoff(
            move || async move {
                let raw = self.try_send(model, request).await?;
                parse_response(&raw)
            },
            &self.retry,
            GenError::is_retryable,
        )
        .await?;

        info!("Received response from Gemini API");
        Ok(response)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Build the `generateContent` body: persona as system instruction,
/// history as role-tagged contents, search block plus query last.
fn build_request(prompt: &PromptContext, params: &GenerationParams) -> Value {
    let mut contents: Vec<Value> = prompt
        .history
        .iter()
        .map(|msg| {
            json!({
                "role": match msg.role {
                    Role::User => "user",
                    Role::Assistant => "model",
                },
                "parts": [{"text": msg.content}],
            })
        })
        .collect();

    contents.push(json!({
        "role": "user",
        "parts": [{"text": prompt.user_block()}],
    }));

    let mut request = json!({
        "contents": contents,
        "generationConfig": {
            "temperature": params.temperature,
            "maxOutputTokens": params.max_output_tokens,
            "topP": params.top_p,
            "topK": params.top_k,
        },
    });

    if !prompt.system.is_empty() {
        request["systemInstruction"] = json!({"parts": [{"text": prompt.system}]});
    }

    request
}

fn parse_response(response: &Value) -> Result<LLMResponse, GenError> {
    let Some(candidate) = response["candidates"].as_array().and_then(|c| c.first()) else {
        if let Some(reason) = response["promptFeedback"]["blockReason"].as_str() {
            return Err(GenError::InvalidRequest(format!("prompt blocked: {reason}")));
        }
        return Err(GenError::Parse("No candidates in response".to_string()));
    };

    let content: String = candidate["content"]["parts"]
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p["text"].as_str())
                .collect::<String>()
        })
        .unwrap_or_default();

    if content.trim().is_empty() {
        return Err(GenError::EmptyResponse);
    }

    let usage = response["usageMetadata"].as_object().map(|u| Usage {
        prompt_tokens: token_count(u.get("promptTokenCount")),
        completion_tokens: token_count(u.get("candidatesTokenCount")),
        total_tokens: token_count(u.get("totalTokenCount")),
    });

    Ok(LLMResponse { content, usage })
}

fn token_count(value: Option<&Value>) -> u32 {
    value
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(0)
}

fn map_status(status: u16, body: String) -> GenError {
    match status {
        400 | 404 => GenError::InvalidRequest(body),
        401 | 403 => GenError::Auth(body),
        429 => GenError::RateLimited,
        _ => GenError::Unavailable(format!("Gemini API error ({status}): {body}")),
    }
}

fn map_transport_error(e: &reqwest::Error) -> GenError {
    if e.is_timeout() {
        GenError::Timeout
    } else {
        GenError::Network(e.to_string())
    }
}
