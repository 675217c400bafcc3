use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub openai_api_base: String,
    pub anthropic_api_base: String,
    pub anthropic_version: String,
    pub image_model: String,
    /// Staging asset paired with generated video concepts while no rendering
    /// pipeline exists.
    pub video_placeholder_url: String,
    pub provider_timeout_secs: u64,
    pub media_timeout_secs: u64,
    pub guest_limit: u32,
    pub free_limit: u32,
    pub reset_period_days: i64,
    pub min_topic_chars: usize,
    /// When set, provider prompts and raw completions are saved per
    /// transaction under this directory.
    pub artifacts_root: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openai_api_base: "https://api.openai.com".into(),
            anthropic_api_base: "https://api.anthropic.com".into(),
            anthropic_version: "2023-06-01".into(),
            image_model: "dall-e-3".into(),
            video_placeholder_url:
                "https://storage.googleapis.com/gtv-videos-bucket/sample/ForBiggerJoyrides.mp4"
                    .into(),
            provider_timeout_secs: 60,
            media_timeout_secs: 90,
            guest_limit: 1,
            free_limit: 5,
            reset_period_days: 30,
            min_topic_chars: 3,
            artifacts_root: None,
        }
    }
}
