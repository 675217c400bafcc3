//! Generation orchestrator for a social content dashboard: admission-
//! controlled, multi-provider LLM post generation with best-effort media
//! augmentation, fallback synthesis and write-behind persistence.

pub mod cli;
pub mod config;
pub mod constraints;
pub mod errors;
pub mod fallback;
pub mod log;
pub mod media;
pub mod normalize;
pub mod orchestrator;
pub mod prompt;
pub mod provider;
pub mod store;
pub mod usage;
pub mod ux;
pub mod wire;

pub use config::Config;
pub use constraints::{resolve, AdvancedOptions, ContentStyle, ContentType, Platform};
pub use errors::{DenyReason, GenerateError, MediaError, ProviderError, ValidationError};
pub use orchestrator::{Orchestrator, Outcome};
pub use provider::{make_provider, model_for, ModelTier, Provider, ProviderKind};
pub use wire::{Caller, GenerationRequest, GenerationResult, SubscriptionStatus};
