use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use super::{model_for, temperature, ModelTier, Provider, ProviderKind};
use crate::errors::ProviderError;
use crate::wire::PromptPayload;

/// GPT-family adapter. Sends system + user messages and forces a JSON object
/// response via `response_format`.
pub struct OpenAiProvider {
    api_key: String,
    api_base: String,
    client: Client,
    timeout_secs: u64,
}

impl OpenAiProvider {
    pub fn new(api_key: String, api_base: String, timeout_secs: u64) -> Self {
        Self {
            api_key,
            api_base,
            client: Client::new(),
            timeout_secs,
        }
    }
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[async_trait]
impl Provider for OpenAiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    async fn generate(
        &self,
        payload: &PromptPayload,
        creativity: f32,
        tier: ModelTier,
    ) -> Result<String, ProviderError> {
        let model = model_for(ProviderKind::OpenAi, tier);
        let url = format!("{}/v1/chat/completions", self.api_base.trim_end_matches('/'));

        let body = json!({
            "model": model,
            "messages": [
                { "role": "system", "content": payload.system },
                { "role": "user", "content": payload.user }
            ],
            "temperature": temperature(creativity),
            // Force a valid JSON object in the response.
            "response_format": { "type": "json_object" }
        });

        debug!(model, url = %url, "openai: POST chat completion");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .timeout(Duration::from_secs(self.timeout_secs))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(self.timeout_secs)
                } else {
                    ProviderError::Http(e)
                }
            })?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(ProviderError::Api { status: status.as_u16(), body: text });
        }

        let parsed: ChatResponse = serde_json::from_str(&text).map_err(|e| ProviderError::Api {
            status: status.as_u16(),
            body: format!("unexpected completion shape: {e}"),
        })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(ProviderError::EmptyContent);
        }

        Ok(content)
    }
}
