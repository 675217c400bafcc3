use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::constraints::{resolve, AdvancedOptions, ContentType, Platform};
use crate::errors::{DenyReason, GenerateError, ProviderError, ValidationError};
use crate::fallback;
use crate::log::ArtifactLog;
use crate::media::{ImageGenerator, VideoGenerator};
use crate::normalize;
use crate::prompt;
use crate::provider::{DynProvider, ModelTier, ProviderKind};
use crate::store::{category_for, ContentStore};
use crate::usage::{Admission, UsageGate, UsageStore};
use crate::wire::{
    ContentVariation, GenerationRequest, GenerationResult, PersistedContent, PromptPayload,
};

/// ========================================
/// Generation orchestrator
/// ========================================
///
/// Pipeline per request: admit → resolve constraints → build prompt → call
/// provider → normalize → attach media (best-effort) → persist (write-behind)
/// → return. Any failure after admission lands on the fallback synthesizer;
/// the caller always gets either usable content or a reason-coded denial.

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Generated {
        result: GenerationResult,
        /// None when the write-behind persistence failed; the content itself
        /// is unaffected.
        content_id: Option<Uuid>,
    },
    Denied {
        reason: DenyReason,
        used: u32,
        limit: u32,
    },
}

/// Composition root. Owns explicitly constructed adapter and store instances
/// for the life of the process; everything is injectable for tests.
pub struct Orchestrator {
    config: Config,
    providers: HashMap<ProviderKind, DynProvider>,
    image: Option<Arc<dyn ImageGenerator>>,
    video: Option<Arc<dyn VideoGenerator>>,
    gate: UsageGate,
    content_store: Arc<dyn ContentStore>,
    artifacts: Option<ArtifactLog>,
}

impl Orchestrator {
    pub fn new(
        config: Config,
        usage_store: Arc<dyn UsageStore>,
        content_store: Arc<dyn ContentStore>,
    ) -> Self {
        let gate = UsageGate::new(usage_store, config.guest_limit, config.free_limit);
        let artifacts = config.artifacts_root.clone().map(ArtifactLog::new);
        Self {
            config,
            providers: HashMap::new(),
            image: None,
            video: None,
            gate,
            content_store,
            artifacts,
        }
    }

    pub fn with_provider(mut self, provider: DynProvider) -> Self {
        self.providers.insert(provider.kind(), provider);
        self
    }

    pub fn with_image_generator(mut self, generator: Arc<dyn ImageGenerator>) -> Self {
        self.image = Some(generator);
        self
    }

    pub fn with_video_generator(mut self, generator: Arc<dyn VideoGenerator>) -> Self {
        self.video = Some(generator);
        self
    }

    /// Client-input checks. Run before admission so a rejected request never
    /// consumes quota.
    fn validate(&self, req: &GenerationRequest) -> Result<(), ValidationError> {
        if req.topic.trim().chars().count() < self.config.min_topic_chars {
            return Err(ValidationError::TopicTooShort { min: self.config.min_topic_chars });
        }
        if !req.options.creativity.is_finite() || req.options.creativity <= 0.0 {
            return Err(ValidationError::CreativityOutOfRange(req.options.creativity));
        }
        if req.options.max_length == 0 {
            return Err(ValidationError::ZeroMaxLength);
        }
        Ok(())
    }

    pub async fn generate(&self, req: GenerationRequest) -> Result<Outcome, GenerateError> {
        self.validate(&req)?;

        match self.gate.admit(&req.caller).await? {
            Admission::Denied { reason, used, limit } => {
                return Ok(Outcome::Denied { reason, used, limit });
            }
            Admission::Allowed { used } => {
                debug!(used, "admitted");
            }
        }

        let tx = Uuid::new_v4();
        let constraints = resolve(req.platform, &req.options);
        let tier = if req.caller.is_paid() { ModelTier::Premium } else { ModelTier::Standard };

        let payload = prompt::build(&req, &constraints, req.options.provider);
        debug!(%tx, provider = req.options.provider.as_str(), "prompted");

        let mut result = match self
            .call_provider(req.options.provider, &payload, constraints.creativity, tier, tx, "generate")
            .await
        {
            Ok(raw) => normalize::normalize(
                &raw,
                &req.topic,
                req.platform,
                req.content_type,
                constraints.effective_max_length,
            ),
            Err(e) => {
                warn!(%tx, error = %e, "provider call failed, synthesizing fallback");
                fallback::synthesize(
                    &req.topic,
                    req.platform,
                    req.content_type,
                    constraints.effective_max_length,
                )
            }
        };
        debug!(%tx, "normalized");

        self.attach_media(&mut result, &req).await;

        let content_id = self.persist(&req, &result).await;
        debug!(%tx, persisted = content_id.is_some(), "returned");

        Ok(Outcome::Generated { result, content_id })
    }

    /// Continuation of an already-admitted session: builds a variations-only
    /// prompt and reuses the provider/validator path without re-running the
    /// usage gate. Degrades to synthesized variations, never to an empty
    /// list.
    pub async fn generate_more_variations(
        &self,
        platform: Platform,
        content_type: ContentType,
        base_content: &str,
        options: &AdvancedOptions,
    ) -> Result<Vec<ContentVariation>, GenerateError> {
        if base_content.trim().is_empty() {
            return Err(ValidationError::EmptyBaseContent.into());
        }

        let tx = Uuid::new_v4();
        let constraints = resolve(platform, options);
        let payload = prompt::build_more_variations(
            platform,
            content_type,
            base_content,
            &constraints,
            options.provider,
        );

        let variations = match self
            .call_provider(
                options.provider,
                &payload,
                constraints.creativity,
                ModelTier::Standard,
                tx,
                "variations",
            )
            .await
        {
            Ok(raw) => normalize::classify_variations(&raw),
            Err(e) => {
                warn!(%tx, error = %e, "variations call failed, synthesizing fallback");
                Vec::new()
            }
        };

        if variations.is_empty() {
            return Ok(fallback::synthesize(
                base_content,
                platform,
                content_type,
                constraints.effective_max_length,
            )
            .variations);
        }
        Ok(variations)
    }

    async fn call_provider(
        &self,
        kind: ProviderKind,
        payload: &PromptPayload,
        creativity: f32,
        tier: ModelTier,
        tx: Uuid,
        stage: &str,
    ) -> Result<String, ProviderError> {
        let provider = self
            .providers
            .get(&kind)
            .ok_or_else(|| ProviderError::NotConfigured(kind.as_str().into()))?;

        let timeout = Duration::from_secs(self.config.provider_timeout_secs);
        let raw = match tokio::time::timeout(timeout, provider.generate(payload, creativity, tier)).await
        {
            Ok(result) => result?,
            Err(_) => return Err(ProviderError::Timeout(self.config.provider_timeout_secs)),
        };

        if let Some(artifacts) = &self.artifacts {
            if let Err(e) = artifacts.save_stage(stage, tx, payload, &raw) {
                warn!(%tx, error = %e, "failed to save stage artifacts");
            }
        }

        Ok(raw)
    }

    /// Image and video are independent; when both are wanted they run
    /// concurrently, and both finish (or fail) before the result returns.
    /// No failure in here touches the text content.
    async fn attach_media(&self, result: &mut GenerationResult, req: &GenerationRequest) {
        let want_image = req.content_type.wants_image();
        let want_video = req.content_type.wants_video();
        if !want_image && !want_video {
            return;
        }

        let summary = result.main_content.content.clone();
        let timeout = Duration::from_secs(self.config.media_timeout_secs);

        let image_fut = async {
            if !want_image {
                return None;
            }
            let generator = self.image.as_deref()?;
            match tokio::time::timeout(
                timeout,
                generator.generate_image(&summary, req.platform, req.options.style),
            )
            .await
            {
                Ok(Ok(url)) => Some(url),
                Ok(Err(e)) => {
                    warn!(error = %e, "image augmentation failed, continuing without image");
                    None
                }
                Err(_) => {
                    warn!("image augmentation timed out, continuing without image");
                    None
                }
            }
        };

        let video_fut = async {
            if !want_video {
                return None;
            }
            let generator = self.video.as_deref()?;
            match tokio::time::timeout(timeout, generator.generate_video(&summary, req.platform))
                .await
            {
                Ok(Ok(concept)) => Some(concept),
                Ok(Err(e)) => {
                    warn!(error = %e, "video augmentation failed, continuing without video");
                    None
                }
                Err(_) => {
                    warn!("video augmentation timed out, continuing without video");
                    None
                }
            }
        };

        let (image, video) = tokio::join!(image_fut, video_fut);

        result.main_content.image_url = image;
        if let Some(concept) = video {
            result.main_content.video_url = Some(concept.url);
            result.main_content.video_concept_only = concept.concept_only;
        }
    }

    /// Write-behind: a persistence failure is logged and leaves the already
    /// computed response untouched.
    async fn persist(&self, req: &GenerationRequest, result: &GenerationResult) -> Option<Uuid> {
        let record = PersistedContent {
            id: Uuid::new_v4(),
            user_id: req.caller.user_id().map(str::to_string),
            platform: req.platform,
            content_type: req.content_type,
            title: result.main_content.title.clone(),
            content: result.main_content.content.clone(),
            image_url: result.main_content.image_url.clone(),
            video_url: result.main_content.video_url.clone(),
            category: category_for(req.platform, req.content_type),
            created_at: Utc::now(),
        };

        match self.content_store.create_content(record).await {
            Ok(id) => Some(id),
            Err(e) => {
                error!(error = %e, "content persistence failed; response unchanged");
                None
            }
        }
    }
}
