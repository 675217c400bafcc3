use async_trait::async_trait;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;
use crate::wire::PromptPayload;

pub mod anthropic;
pub mod openai;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[value(name = "openai")]
    OpenAi,
    Anthropic,
}

impl ProviderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
        }
    }
}

/// Which capability class of model to use within a provider. Paid callers get
/// the provider's higher-capability model, everyone else the lower-cost one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelTier {
    Standard,
    Premium,
}

/// Single shared (provider, tier) -> model lookup so adapters never diverge
/// on hardcoded model strings.
pub fn model_for(kind: ProviderKind, tier: ModelTier) -> &'static str {
    match (kind, tier) {
        (ProviderKind::OpenAi, ModelTier::Premium) => "gpt-4o",
        (ProviderKind::OpenAi, ModelTier::Standard) => "gpt-4o-mini",
        (ProviderKind::Anthropic, ModelTier::Premium) => "claude-3-5-sonnet-20241022",
        (ProviderKind::Anthropic, ModelTier::Standard) => "claude-3-5-haiku-20241022",
    }
}

/// Sampling temperature from the user-facing creativity knob. Callers pass
/// already-clamped creativity; clamp again so adapters stay safe in
/// isolation.
pub fn temperature(creativity: f32) -> f32 {
    creativity.clamp(0.1, 1.0)
}

/// Uniform contract over one external LLM backend. Adapters send the prompt,
/// request JSON output where the provider supports it, and hand back the raw
/// completion text. Parsing the model's JSON is the validator's job, never
/// the adapter's.
#[async_trait]
pub trait Provider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    async fn generate(
        &self,
        payload: &PromptPayload,
        creativity: f32,
        tier: ModelTier,
    ) -> Result<String, ProviderError>;
}

pub type DynProvider = std::sync::Arc<dyn Provider + Send + Sync>;

/// Build an adapter from environment credentials. The composition root owns
/// the returned instance for the life of the process; nothing here is a
/// hidden singleton.
pub fn make_provider(
    kind: ProviderKind,
    cfg: &crate::config::Config,
) -> Result<DynProvider, ProviderError> {
    match kind {
        ProviderKind::OpenAi => {
            let key = std::env::var("OPENAI_API_KEY")
                .map_err(|_| ProviderError::MissingCredentials("OPENAI_API_KEY".into()))?;
            Ok(std::sync::Arc::new(openai::OpenAiProvider::new(
                key,
                cfg.openai_api_base.clone(),
                cfg.provider_timeout_secs,
            )))
        }
        ProviderKind::Anthropic => {
            let key = std::env::var("ANTHROPIC_API_KEY")
                .map_err(|_| ProviderError::MissingCredentials("ANTHROPIC_API_KEY".into()))?;
            Ok(std::sync::Arc::new(anthropic::AnthropicProvider::new(
                key,
                cfg.anthropic_api_base.clone(),
                cfg.anthropic_version.clone(),
                cfg.provider_timeout_secs,
            )))
        }
    }
}
