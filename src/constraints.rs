use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::provider::ProviderKind;

/// ========================================
/// Platform limits & option resolution
/// ========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Twitter,
    Linkedin,
    Instagram,
    Facebook,
}

impl Platform {
    /// Hard character cap enforced by the network itself. The resolver never
    /// lets a requested max length exceed this.
    pub fn char_limit(self) -> usize {
        match self {
            Platform::Twitter => 280,
            Platform::Linkedin => 3_000,
            Platform::Instagram => 2_200,
            Platform::Facebook => 63_206,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Twitter => "twitter",
            Platform::Linkedin => "linkedin",
            Platform::Instagram => "instagram",
            Platform::Facebook => "facebook",
        }
    }

    pub const ALL: [Platform; 4] = [
        Platform::Twitter,
        Platform::Linkedin,
        Platform::Instagram,
        Platform::Facebook,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "camelCase")]
pub enum ContentType {
    TextOnly,
    ImagePost,
    VideoPost,
    Carousel,
    Story,
}

impl ContentType {
    pub fn wants_image(self) -> bool {
        matches!(self, ContentType::ImagePost | ContentType::Carousel)
    }

    pub fn wants_video(self) -> bool {
        matches!(self, ContentType::VideoPost | ContentType::Story)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::TextOnly => "text-only post",
            ContentType::ImagePost => "post with image",
            ContentType::VideoPost => "post with video",
            ContentType::Carousel => "carousel post",
            ContentType::Story => "story",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ContentStyle {
    Balanced,
    Formal,
    Friendly,
    Persuasive,
    Educational,
    Storytelling,
}

impl ContentStyle {
    /// Tone instruction handed to the prompt builder.
    pub fn directive(self) -> &'static str {
        match self {
            ContentStyle::Balanced => "balanced and versatile, mixing information with personality",
            ContentStyle::Formal => "formal and professional, no slang",
            ContentStyle::Friendly => "warm, casual and conversational",
            ContentStyle::Persuasive => "persuasive and action-oriented",
            ContentStyle::Educational => "educational, clear and fact-focused",
            ContentStyle::Storytelling => "narrative-driven, told as a short story",
        }
    }
}

/// User-supplied knobs merged with the platform cap by [`resolve`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvancedOptions {
    pub creativity: f32,
    pub max_length: usize,
    pub include_emojis: bool,
    pub include_cta: bool,
    pub include_hashtags: bool,
    pub custom_hashtags: Vec<String>,
    pub avoid_words: Vec<String>,
    pub style: ContentStyle,
    pub provider: ProviderKind,
}

impl Default for AdvancedOptions {
    fn default() -> Self {
        Self {
            creativity: 0.7,
            max_length: 2_000,
            include_emojis: true,
            include_cta: true,
            include_hashtags: true,
            custom_hashtags: Vec::new(),
            avoid_words: Vec::new(),
            style: ContentStyle::Balanced,
            provider: ProviderKind::OpenAi,
        }
    }
}

/// Everything the prompt builder and provider adapters need, with the
/// platform cap already applied. Pure data; no network or store access.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConstraints {
    pub effective_max_length: usize,
    pub creativity: f32,
    pub style_directive: &'static str,
    pub include_emojis: bool,
    pub include_cta: bool,
    pub include_hashtags: bool,
    pub required_hashtags: Vec<String>,
    pub forbidden_words: Vec<String>,
}

/// effective_max_length = min(requested, platform hard cap); the smaller of
/// the two always wins. Creativity is clamped to the nominal 0.1-1.0 range.
pub fn resolve(platform: Platform, options: &AdvancedOptions) -> ResolvedConstraints {
    let required_hashtags = if options.include_hashtags {
        options
            .custom_hashtags
            .iter()
            .filter(|h| !h.trim().is_empty())
            .cloned()
            .collect()
    } else {
        Vec::new()
    };

    ResolvedConstraints {
        effective_max_length: options.max_length.min(platform.char_limit()),
        creativity: options.creativity.clamp(0.1, 1.0),
        style_directive: options.style.directive(),
        include_emojis: options.include_emojis,
        include_cta: options.include_cta,
        include_hashtags: options.include_hashtags,
        required_hashtags,
        forbidden_words: options
            .avoid_words
            .iter()
            .filter(|w| !w.trim().is_empty())
            .cloned()
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_max_length_is_min_of_request_and_platform_cap() {
        for platform in Platform::ALL {
            for requested in [1usize, 100, 280, 500, 3_000, 100_000] {
                let options = AdvancedOptions { max_length: requested, ..Default::default() };
                let resolved = resolve(platform, &options);
                assert_eq!(
                    resolved.effective_max_length,
                    requested.min(platform.char_limit()),
                    "platform={platform:?} requested={requested}"
                );
            }
        }
    }

    #[test]
    fn twitter_cap_wins_over_requested_500() {
        let options = AdvancedOptions { max_length: 500, ..Default::default() };
        assert_eq!(resolve(Platform::Twitter, &options).effective_max_length, 280);
    }

    #[test]
    fn hashtags_off_clears_required_hashtags() {
        let options = AdvancedOptions {
            include_hashtags: false,
            custom_hashtags: vec!["#launch".into(), "#coffee".into()],
            ..Default::default()
        };
        let resolved = resolve(Platform::Instagram, &options);
        assert!(!resolved.include_hashtags);
        assert!(resolved.required_hashtags.is_empty());
    }

    #[test]
    fn creativity_clamped_to_nominal_range() {
        let low = AdvancedOptions { creativity: 0.0, ..Default::default() };
        let high = AdvancedOptions { creativity: 3.5, ..Default::default() };
        assert_eq!(resolve(Platform::Twitter, &low).creativity, 0.1);
        assert_eq!(resolve(Platform::Twitter, &high).creativity, 1.0);
    }

    #[test]
    fn blank_avoid_words_and_hashtags_are_dropped() {
        let options = AdvancedOptions {
            custom_hashtags: vec!["  ".into(), "#real".into()],
            avoid_words: vec!["".into(), "cheap".into()],
            ..Default::default()
        };
        let resolved = resolve(Platform::Facebook, &options);
        assert_eq!(resolved.required_hashtags, vec!["#real".to_string()]);
        assert_eq!(resolved.forbidden_words, vec!["cheap".to_string()]);
    }
}
