use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::constraints::{AdvancedOptions, ContentType, Platform};

/// ========================================
/// Request/Response wire types
/// ========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Free,
    Active,
    Canceled,
}

/// Who is asking. Guests are keyed by an opaque session id; authenticated
/// users carry their current subscription status (fed by the billing
/// collaborator upstream of the orchestrator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Caller {
    Guest { session_id: String },
    User { id: String, status: SubscriptionStatus },
}

impl Caller {
    /// Store key for usage records. Guests and users live in the same keyed
    /// store under distinct prefixes.
    pub fn usage_key(&self) -> String {
        match self {
            Caller::Guest { session_id } => format!("guest:{session_id}"),
            Caller::User { id, .. } => format!("user:{id}"),
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        match self {
            Caller::Guest { .. } => None,
            Caller::User { id, .. } => Some(id.as_str()),
        }
    }

    pub fn is_paid(&self) -> bool {
        matches!(
            self,
            Caller::User { status: SubscriptionStatus::Active, .. }
        )
    }
}

/// One orchestration call. Ephemeral; nothing here outlives the request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub topic: String,
    pub platform: Platform,
    pub content_type: ContentType,
    pub audience: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    pub options: AdvancedOptions,
    pub caller: Caller,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainContent {
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    /// True when the attached video url is a staging asset and only the
    /// concept text was actually generated. See the video augmenter.
    #[serde(default)]
    pub video_concept_only: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentVariation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub content: String,
}

/// Never empty: fallback synthesis guarantees a populated main content and
/// three variations even on total provider failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub main_content: MainContent,
    pub variations: Vec<ContentVariation>,
}

/// Provider-family-specific instruction block built by the prompt builder.
/// The semantic requirements are identical across providers; only the wording
/// differs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptPayload {
    pub system: String,
    pub user: String,
}

/// ========================================
/// Untrusted LLM response envelope
/// ========================================
///
/// What we *ask* the model to return. Parsed defensively by the validator:
/// every field is optional and `variations` is kept as a raw `Value` because
/// models occasionally return an object or a string where a list belongs.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEnvelope {
    #[serde(default)]
    pub main_content: Option<RawMainContent>,
    #[serde(default)]
    pub variations: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawMainContent {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Saved record of an accepted generation. Created once per successful
/// orchestration; the orchestrator never mutates it afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedContent {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub platform: Platform,
    pub content_type: ContentType,
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    pub category: String,
    pub created_at: DateTime<Utc>,
}
