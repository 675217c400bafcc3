use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use crate::constraints::{ContentStyle, Platform};
use crate::errors::MediaError;
use crate::provider::{DynProvider, ModelTier};
use crate::wire::PromptPayload;

/// ========================================
/// Media augmenters
/// ========================================
///
/// Best-effort enrichment of already-generated text. The orchestrator wraps
/// every call here so a failure degrades to "no media attached"; nothing in
/// this module can fail the overall request.

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate_image(
        &self,
        content: &str,
        platform: Platform,
        style: ContentStyle,
    ) -> Result<String, MediaError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct VideoConcept {
    pub url: String,
    pub concept: String,
    /// True when the url points at a staging asset and only the concept text
    /// was generated. No rendering pipeline exists yet; this keeps the
    /// simplification visible instead of silently returning a fixed url.
    pub concept_only: bool,
}

#[async_trait]
pub trait VideoGenerator: Send + Sync {
    async fn generate_video(
        &self,
        content: &str,
        platform: Platform,
    ) -> Result<VideoConcept, MediaError>;
}

/// Feed the image model a summary of the post, not the whole thing.
fn summarize(content: &str, max_chars: usize) -> String {
    let trimmed = content.trim();
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }
    trimmed.chars().take(max_chars).collect()
}

fn image_prompt(content: &str, platform: Platform, style: ContentStyle) -> String {
    format!(
        "Social media visual for a {platform} post. Style: {style}. No text overlays, no watermarks.\n\nThe post says: {summary}",
        platform = platform.as_str(),
        style = style.directive(),
        summary = summarize(content, 400),
    )
}

/// Square for feed platforms, landscape for the long-form ones.
fn image_size(platform: Platform) -> &'static str {
    match platform {
        Platform::Instagram | Platform::Twitter => "1024x1024",
        Platform::Linkedin | Platform::Facebook => "1792x1024",
    }
}

pub struct OpenAiImageGenerator {
    api_key: String,
    api_base: String,
    model: String,
    client: Client,
    timeout_secs: u64,
}

impl OpenAiImageGenerator {
    pub fn new(api_key: String, api_base: String, model: String, timeout_secs: u64) -> Self {
        Self {
            api_key,
            api_base,
            model,
            client: Client::new(),
            timeout_secs,
        }
    }

    pub fn from_env(cfg: &crate::config::Config) -> Result<Self, MediaError> {
        let key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| MediaError::MissingCredentials("OPENAI_API_KEY".into()))?;
        Ok(Self::new(
            key,
            cfg.openai_api_base.clone(),
            cfg.image_model.clone(),
            cfg.media_timeout_secs,
        ))
    }
}

#[derive(Deserialize)]
struct ImageResponse {
    data: Vec<ImageDatum>,
}

#[derive(Deserialize)]
struct ImageDatum {
    #[serde(default)]
    url: Option<String>,
}

#[async_trait]
impl ImageGenerator for OpenAiImageGenerator {
    async fn generate_image(
        &self,
        content: &str,
        platform: Platform,
        style: ContentStyle,
    ) -> Result<String, MediaError> {
        let url = format!("{}/v1/images/generations", self.api_base.trim_end_matches('/'));
        let body = json!({
            "model": self.model,
            "prompt": image_prompt(content, platform, style),
            "n": 1,
            "size": image_size(platform),
        });

        debug!(model = %self.model, url = %url, "image: POST generation");

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
                    MediaError::Timeout(self.timeout_secs)
                } else {
                    MediaError::Http(e)
                }
            })?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(MediaError::Api { status: status.as_u16(), body: text });
        }

        let parsed: ImageResponse = serde_json::from_str(&text).map_err(|e| MediaError::Api {
            status: status.as_u16(),
            body: format!("unexpected image response shape: {e}"),
        })?;

        parsed
            .data
            .into_iter()
            .find_map(|d| d.url)
            .ok_or(MediaError::MissingUrl)
    }
}

/// Concept-only video augmenter: asks the text provider for a short video
/// concept and pairs it with a staging asset url. `concept_only` stays true
/// until a real rendering pipeline exists.
pub struct ConceptOnlyVideoGenerator {
    provider: DynProvider,
    placeholder_url: String,
}

impl ConceptOnlyVideoGenerator {
    pub fn new(provider: DynProvider, placeholder_url: String) -> Self {
        Self { provider, placeholder_url }
    }
}

#[derive(Deserialize)]
struct ConceptEnvelope {
    #[serde(default)]
    concept: Option<String>,
}

#[async_trait]
impl VideoGenerator for ConceptOnlyVideoGenerator {
    async fn generate_video(
        &self,
        content: &str,
        platform: Platform,
    ) -> Result<VideoConcept, MediaError> {
        let payload = PromptPayload {
            system: r#"You write short-form video concepts. Return EXACTLY ONE JSON object (no markdown, no prose, no code fences): { "concept": string }"#.to_string(),
            user: format!(
                "Describe a 15-30 second {platform} video concept (scenes, pacing, on-screen text) for this post:\n\n{summary}",
                platform = platform.as_str(),
                summary = summarize(content, 400),
            ),
        };

        let raw = self
            .provider
            .generate(&payload, 0.7, ModelTier::Standard)
            .await?;

        // The concept is descriptive text; a malformed envelope just means we
        // keep the raw completion.
        let concept = serde_json::from_str::<ConceptEnvelope>(&raw)
            .ok()
            .and_then(|e| e.concept)
            .unwrap_or_else(|| raw.trim().to_string());

        if concept.is_empty() {
            return Err(MediaError::MissingUrl);
        }

        Ok(VideoConcept {
            url: self.placeholder_url.clone(),
            concept,
            concept_only: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_prompt_carries_platform_style_and_summary() {
        let p = image_prompt("Visit our new shop downtown!", Platform::Instagram, ContentStyle::Friendly);
        assert!(p.contains("instagram"));
        assert!(p.contains("casual"));
        assert!(p.contains("Visit our new shop"));
    }

    #[test]
    fn long_content_is_summarized_for_the_image_model() {
        let long = "x".repeat(2_000);
        let p = image_prompt(&long, Platform::Facebook, ContentStyle::Balanced);
        assert!(p.len() < 700);
    }

    #[test]
    fn feed_platforms_get_square_images() {
        assert_eq!(image_size(Platform::Instagram), "1024x1024");
        assert_eq!(image_size(Platform::Linkedin), "1792x1024");
    }
}
