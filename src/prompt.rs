use crate::constraints::{ContentType, Platform, ResolvedConstraints};
use crate::provider::ProviderKind;
use crate::wire::{GenerationRequest, PromptPayload};

/// ========================================
/// Prompt construction
/// ========================================
///
/// Wording differs per provider family (Claude prefers one terse block, GPT
/// gets a fuller system message), but the semantic requirements are identical
/// and the validator relies on the response contract below regardless of
/// which adapter ran.

fn response_contract() -> &'static str {
    r#"Return EXACTLY ONE JSON object (no markdown, no prose, no code fences) that conforms to:

{
  "mainContent": { "title": string, "content": string },
  "variations": [
    { "content": string },
    { "content": string },
    { "content": string }
  ]
}

The "variations" array MUST contain exactly 3 items, each a distinct rewrite of the main content."#
}

fn variations_contract() -> &'static str {
    r#"Return EXACTLY ONE JSON object (no markdown, no prose, no code fences) that conforms to:

{
  "variations": [
    { "content": string },
    { "content": string },
    { "content": string }
  ]
}"#
}

/// One explicit instruction line per boolean directive, plus the verbatim
/// hashtag and forbidden-word lists when present.
fn directive_block(c: &ResolvedConstraints) -> String {
    let mut lines = Vec::new();

    lines.push(format!(
        "- Hard limit: the post content must be at most {} characters.",
        c.effective_max_length
    ));
    lines.push(format!("- Tone: {}.", c.style_directive));

    if c.include_emojis {
        lines.push("- Include 2-3 fitting emojis.".to_string());
    } else {
        lines.push("- Do not use any emojis.".to_string());
    }

    if c.include_cta {
        lines.push("- End with a clear call to action.".to_string());
    } else {
        lines.push("- Do not add a call to action.".to_string());
    }

    if c.include_hashtags {
        if c.required_hashtags.is_empty() {
            lines.push("- Include 2-4 relevant hashtags.".to_string());
        } else {
            lines.push(format!(
                "- Include these hashtags verbatim: {}.",
                c.required_hashtags.join(" ")
            ));
        }
    } else {
        lines.push("- Do not use hashtags.".to_string());
    }

    if !c.forbidden_words.is_empty() {
        lines.push(format!(
            "- Never use these words: {}.",
            c.forbidden_words.join(", ")
        ));
    }

    lines.join("\n")
}

fn task_block(req: &GenerationRequest, c: &ResolvedConstraints) -> String {
    let keywords = match &req.keywords {
        Some(k) if !k.trim().is_empty() => format!("\nWork in these keywords naturally: {k}."),
        _ => String::new(),
    };

    format!(
        "Write a {content_type} for {platform} about:\n{topic}\n\nTarget audience: {audience}.{keywords}\n\nConstraints:\n{directives}",
        content_type = req.content_type.as_str(),
        platform = req.platform.as_str(),
        topic = req.topic.trim(),
        audience = req.audience.trim(),
        keywords = keywords,
        directives = directive_block(c),
    )
}

pub fn build(
    req: &GenerationRequest,
    constraints: &ResolvedConstraints,
    kind: ProviderKind,
) -> PromptPayload {
    let task = task_block(req, constraints);

    match kind {
        ProviderKind::OpenAi => PromptPayload {
            system: format!(
                "You are a social media copywriter for a content dashboard. You write platform-native posts that respect every constraint exactly.\n\n{}",
                response_contract()
            ),
            user: task,
        },
        // Claude responds best to a single compact block with the schema at
        // the end, closest to the user request.
        ProviderKind::Anthropic => PromptPayload {
            system: "You are a social media copywriter. Respond with JSON only.".to_string(),
            user: format!("{task}\n\n{}", response_contract()),
        },
    }
}

pub fn build_more_variations(
    platform: Platform,
    content_type: ContentType,
    base_content: &str,
    constraints: &ResolvedConstraints,
    kind: ProviderKind,
) -> PromptPayload {
    let task = format!(
        "Here is an existing {content_type} for {platform}:\n\n{base}\n\nWrite 3 fresh variations of it, each with a different angle.\n\nConstraints:\n{directives}",
        content_type = content_type.as_str(),
        platform = platform.as_str(),
        base = base_content.trim(),
        directives = directive_block(constraints),
    );

    match kind {
        ProviderKind::OpenAi => PromptPayload {
            system: format!(
                "You are a social media copywriter producing alternative takes on an existing post.\n\n{}",
                variations_contract()
            ),
            user: task,
        },
        ProviderKind::Anthropic => PromptPayload {
            system: "You are a social media copywriter. Respond with JSON only.".to_string(),
            user: format!("{task}\n\n{}", variations_contract()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::{resolve, AdvancedOptions};
    use crate::wire::Caller;

    fn request(platform: Platform, options: AdvancedOptions) -> GenerationRequest {
        GenerationRequest {
            topic: "coffee shop launch".into(),
            platform,
            content_type: ContentType::TextOnly,
            audience: "young professionals".into(),
            keywords: None,
            options,
            caller: Caller::Guest { session_id: "s1".into() },
        }
    }

    #[test]
    fn prompt_states_the_effective_ceiling() {
        let options = AdvancedOptions { max_length: 500, ..Default::default() };
        let req = request(Platform::Twitter, options.clone());
        let constraints = resolve(Platform::Twitter, &options);
        for kind in [ProviderKind::OpenAi, ProviderKind::Anthropic] {
            let payload = build(&req, &constraints, kind);
            let full = format!("{}\n{}", payload.system, payload.user);
            assert!(full.contains("at most 280 characters"), "kind={kind:?}");
            assert!(full.contains("coffee shop launch"));
            assert!(full.contains("mainContent"));
        }
    }

    #[test]
    fn hashtags_off_never_instructs_inclusion() {
        let options = AdvancedOptions {
            include_hashtags: false,
            custom_hashtags: vec!["#grandopening".into()],
            ..Default::default()
        };
        let req = request(Platform::Instagram, options.clone());
        let constraints = resolve(Platform::Instagram, &options);
        let payload = build(&req, &constraints, ProviderKind::OpenAi);
        assert!(payload.user.contains("Do not use hashtags"));
        assert!(!payload.user.contains("Include these hashtags"));
        assert!(!payload.user.contains("#grandopening"));
    }

    #[test]
    fn custom_hashtags_listed_verbatim() {
        let options = AdvancedOptions {
            custom_hashtags: vec!["#CoffeeTime".into(), "#GrandOpening".into()],
            avoid_words: vec!["cheap".into()],
            ..Default::default()
        };
        let req = request(Platform::Linkedin, options.clone());
        let constraints = resolve(Platform::Linkedin, &options);
        let payload = build(&req, &constraints, ProviderKind::Anthropic);
        assert!(payload.user.contains("#CoffeeTime #GrandOpening"));
        assert!(payload.user.contains("Never use these words: cheap"));
    }

    #[test]
    fn variations_prompt_embeds_base_content() {
        let options = AdvancedOptions::default();
        let constraints = resolve(Platform::Twitter, &options);
        let payload = build_more_variations(
            Platform::Twitter,
            ContentType::TextOnly,
            "Our doors open Monday!",
            &constraints,
            ProviderKind::OpenAi,
        );
        assert!(payload.user.contains("Our doors open Monday!"));
        assert!(payload.system.contains("variations"));
    }
}
