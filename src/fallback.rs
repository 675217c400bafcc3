use crate::constraints::{ContentType, Platform};
use crate::wire::{ContentVariation, GenerationResult, MainContent};

/// ========================================
/// Fallback synthesizer
/// ========================================
///
/// Deterministic, network-free content derived from the original topic.
/// Used whenever the real provider path fails; guarantees the result is
/// never empty. This path must never fail.

fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    // Leave room for the ellipsis.
    let keep = max.saturating_sub(1);
    let mut out: String = s.chars().take(keep).collect();
    out.push('…');
    out
}

pub fn synthesize(
    topic: &str,
    platform: Platform,
    content_type: ContentType,
    effective_max_length: usize,
) -> GenerationResult {
    let topic = topic.trim();

    let title = truncate_chars(topic, 80);
    let body = format!(
        "{topic} — here's something worth talking about. We're putting together a {content_type} for {platform} on exactly this. Stay tuned for the full story.",
        content_type = content_type.as_str(),
        platform = platform.as_str(),
    );

    let variations = [
        format!("Big things around {topic}. More on this soon — watch this space."),
        format!("Quick take: {topic}. What's your view? Tell us in the comments."),
        format!(
            "{topic} is on our radar this week. Follow along for the details as they land."
        ),
    ];

    GenerationResult {
        main_content: MainContent {
            title,
            content: truncate_chars(&body, effective_max_length),
            image_url: None,
            video_url: None,
            video_concept_only: false,
        },
        variations: variations
            .into_iter()
            .map(|content| ContentVariation {
                title: None,
                content: truncate_chars(&content, effective_max_length),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthesized_result_embeds_topic_and_has_three_variations() {
        let result = synthesize("coffee shop launch", Platform::Twitter, ContentType::TextOnly, 280);
        assert!(result.main_content.content.contains("coffee shop launch"));
        assert_eq!(result.variations.len(), 3);
        for v in &result.variations {
            assert!(!v.content.is_empty());
        }
    }

    #[test]
    fn synthesized_content_respects_the_ceiling() {
        let result = synthesize(
            "a very long topic that keeps going and going well past any sane headline length",
            Platform::Twitter,
            ContentType::TextOnly,
            60,
        );
        assert!(result.main_content.content.chars().count() <= 60);
        for v in &result.variations {
            assert!(v.content.chars().count() <= 60);
        }
    }

    #[test]
    fn synthesis_is_deterministic() {
        let a = synthesize("t", Platform::Facebook, ContentType::Story, 500);
        let b = synthesize("t", Platform::Facebook, ContentType::Story, 500);
        assert_eq!(a, b);
    }
}
