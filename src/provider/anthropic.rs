use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{model_for, temperature, ModelTier, Provider, ProviderKind};
use crate::errors::ProviderError;
use crate::wire::PromptPayload;

/// Claude-family adapter. The Messages API has no JSON response mode, so the
/// prompt itself carries the JSON-only instruction and the validator copes
/// with whatever comes back.
pub struct AnthropicProvider {
    api_key: String,
    api_base: String,
    api_version: String,
    client: Client,
    timeout_secs: u64,
}

impl AnthropicProvider {
    pub fn new(api_key: String, api_base: String, api_version: String, timeout_secs: u64) -> Self {
        Self {
            api_key,
            api_base,
            api_version,
            client: Client::new(),
            timeout_secs,
        }
    }
}

#[derive(Serialize)]
struct MsgRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<Msg<'a>>,
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MsgResponse {
    content: Vec<Block>,
}

#[derive(Deserialize)]
struct Block {
    #[serde(default)]
    text: String,
    #[serde(default)]
    r#type: String,
}

#[async_trait]
impl Provider for AnthropicProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }

    async fn generate(
        &self,
        payload: &PromptPayload,
        creativity: f32,
        tier: ModelTier,
    ) -> Result<String, ProviderError> {
        let model = model_for(ProviderKind::Anthropic, tier);
        let url = format!("{}/v1/messages", self.api_base.trim_end_matches('/'));

        let body = MsgRequest {
            model,
            max_tokens: 4096,
            temperature: temperature(creativity),
            system: &payload.system,
            messages: vec![Msg { role: "user", content: &payload.user }],
        };

        debug!(model, url = %url, "anthropic: POST messages");

        let resp = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.api_version)
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

        let parsed: MsgResponse = serde_json::from_str(&text).map_err(|e| ProviderError::Api {
            status: status.as_u16(),
            body: format!("unexpected message shape: {e}"),
        })?;

        let content = parsed
            .content
            .into_iter()
            .find(|b| b.r#type == "text" || !b.text.is_empty())
            .map(|b| b.text)
            .ok_or(ProviderError::EmptyContent)?;

        if content.trim().is_empty() {
            return Err(ProviderError::EmptyContent);
        }

        Ok(content)
    }
}
