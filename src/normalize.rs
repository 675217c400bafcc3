use serde_json::Value;
use tracing::warn;

use crate::constraints::{ContentType, Platform};
use crate::fallback;
use crate::wire::{ContentVariation, GenerationResult, MainContent, RawEnvelope};

/// ========================================
/// Response validation / normalization
/// ========================================
///
/// Provider output is untrusted input. We classify it explicitly instead of
/// assuming shape; anything unusable becomes deterministic fallback content.
/// No network I/O anywhere in this module.

#[derive(Debug)]
pub enum ParsedOutput {
    Parsed { title: String, content: String, variations: Vec<ContentVariation> },
    Malformed(String),
}

/// Extracts the first top-level JSON object substring from a string.
/// Handles nested braces and braces inside string values (honoring `\"`
/// escapes); returns None if not found. Models occasionally wrap the object
/// in prose or code fences despite instructions.
fn extract_first_json_object(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    let mut start = None;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate() {
        // Quotes in the surrounding prose don't count; string tracking
        // starts at the first brace.
        if start.is_none() && b != b'{' {
            continue;
        }
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => {
                if start.is_none() {
                    start = Some(i);
                }
                depth += 1;
            }
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return start.map(|st| &s[st..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// If `variations` is anything other than a list, substitute an empty list.
/// List items may be `{ "content": ..., "title": ... }` objects or bare
/// strings; anything else is skipped.
fn coerce_variations(value: &Value) -> Vec<ContentVariation> {
    let Value::Array(items) = value else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) if !s.trim().is_empty() => Some(ContentVariation {
                title: None,
                content: s.clone(),
            }),
            Value::Object(map) => {
                let content = map.get("content").and_then(Value::as_str)?;
                if content.trim().is_empty() {
                    return None;
                }
                Some(ContentVariation {
                    title: map
                        .get("title")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                    content: content.to_string(),
                })
            }
            _ => None,
        })
        .collect()
}

/// Tagged classification of a raw provider completion. Pure; exposed for
/// direct testing with literal JSON fixtures.
pub fn classify(raw: &str) -> ParsedOutput {
    let envelope: RawEnvelope = match serde_json::from_str(raw) {
        Ok(e) => e,
        Err(first_err) => {
            let Some(obj) = extract_first_json_object(raw) else {
                return ParsedOutput::Malformed(format!("not a JSON object: {first_err}"));
            };
            match serde_json::from_str(obj) {
                Ok(e) => e,
                Err(e) => return ParsedOutput::Malformed(format!("embedded object invalid: {e}")),
            }
        }
    };

    let Some(main) = envelope.main_content else {
        return ParsedOutput::Malformed("missing mainContent".into());
    };
    let title = main.title.unwrap_or_default();
    let content = main.content.unwrap_or_default();
    if title.trim().is_empty() || content.trim().is_empty() {
        return ParsedOutput::Malformed("mainContent missing title or content".into());
    }

    ParsedOutput::Parsed {
        title,
        content,
        variations: coerce_variations(&envelope.variations),
    }
}

/// Total function: always yields a presentable result. Malformed output
/// degrades to the fallback synthesizer instead of propagating an error.
/// Idempotent over the same raw input.
pub fn normalize(
    raw: &str,
    topic: &str,
    platform: Platform,
    content_type: ContentType,
    effective_max_length: usize,
) -> GenerationResult {
    match classify(raw) {
        ParsedOutput::Parsed { title, content, variations } => GenerationResult {
            main_content: MainContent {
                title,
                content,
                image_url: None,
                video_url: None,
                video_concept_only: false,
            },
            variations,
        },
        ParsedOutput::Malformed(reason) => {
            warn!(%reason, "provider output unusable, synthesizing fallback");
            fallback::synthesize(topic, platform, content_type, effective_max_length)
        }
    }
}

/// Variations-only parse used by `generate_more_variations`. An unusable
/// completion yields an empty list for the caller to top up.
pub fn classify_variations(raw: &str) -> Vec<ContentVariation> {
    let value: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(_) => match extract_first_json_object(raw).and_then(|o| serde_json::from_str(o).ok()) {
            Some(v) => v,
            None => return Vec::new(),
        },
    };
    value
        .get("variations")
        .map(coerce_variations)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD: &str = r#"{
        "mainContent": { "title": "Grand Opening", "content": "We open Monday!" },
        "variations": [
            { "content": "Doors open Monday." },
            { "content": "Monday is the day.", "title": "Save the date" },
            { "content": "See you Monday!" }
        ]
    }"#;

    #[test]
    fn well_formed_output_parses_fully() {
        let result = normalize(GOOD, "opening", Platform::Twitter, ContentType::TextOnly, 280);
        assert_eq!(result.main_content.title, "Grand Opening");
        assert_eq!(result.variations.len(), 3);
        assert_eq!(result.variations[1].title.as_deref(), Some("Save the date"));
    }

    #[test]
    fn prose_wrapped_json_is_recovered() {
        let raw = format!("Sure! Here is the post you asked for:\n{GOOD}\nHope that helps.");
        let result = normalize(&raw, "opening", Platform::Twitter, ContentType::TextOnly, 280);
        assert_eq!(result.main_content.title, "Grand Opening");
    }

    #[test]
    fn invalid_json_falls_back_and_never_panics() {
        let result = normalize(
            "the model rambled instead of returning JSON",
            "coffee shop launch",
            Platform::Twitter,
            ContentType::TextOnly,
            280,
        );
        assert!(!result.main_content.content.is_empty());
        assert!(result.main_content.content.contains("coffee shop launch"));
        assert_eq!(result.variations.len(), 3);
    }

    #[test]
    fn missing_main_content_falls_back() {
        let raw = r#"{ "variations": [ { "content": "orphaned" } ] }"#;
        let result = normalize(raw, "topic", Platform::Linkedin, ContentType::TextOnly, 3000);
        assert!(result.main_content.content.contains("topic"));
    }

    #[test]
    fn variations_not_a_list_becomes_empty_list() {
        let raw = r#"{
            "mainContent": { "title": "T", "content": "C" },
            "variations": "oops, a string"
        }"#;
        let result = normalize(raw, "t", Platform::Facebook, ContentType::TextOnly, 1000);
        assert_eq!(result.main_content.title, "T");
        assert!(result.variations.is_empty());
    }

    #[test]
    fn junk_variation_items_are_skipped() {
        let raw = r#"{
            "mainContent": { "title": "T", "content": "C" },
            "variations": [ { "content": "keep" }, 42, { "title": "no content" }, "also keep" ]
        }"#;
        let result = normalize(raw, "t", Platform::Facebook, ContentType::TextOnly, 1000);
        assert_eq!(result.variations.len(), 2);
        assert_eq!(result.variations[0].content, "keep");
        assert_eq!(result.variations[1].content, "also keep");
    }

    #[test]
    fn normalize_is_idempotent() {
        for raw in [GOOD, "not json at all", r#"{"mainContent":{}}"#] {
            let a = normalize(raw, "t", Platform::Twitter, ContentType::TextOnly, 280);
            let b = normalize(raw, "t", Platform::Twitter, ContentType::TextOnly, 280);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn extract_handles_nested_braces() {
        let s = r#"prefix {"a": {"b": 1}, "c": "}"} suffix"#;
        let obj = extract_first_json_object(s).unwrap();
        assert!(serde_json::from_str::<Value>(obj).is_ok());
    }

    #[test]
    fn extract_ignores_braces_inside_strings() {
        let s = r#"note: {"title": "use {} sparingly", "content": ":}"} done"#;
        let obj = extract_first_json_object(s).unwrap();
        let value: Value = serde_json::from_str(obj).unwrap();
        assert_eq!(value["content"], ":}");
    }

    #[test]
    fn extract_honors_escaped_quotes() {
        let s = r#"x {"a": "he said \"}\" loudly"} y"#;
        let obj = extract_first_json_object(s).unwrap();
        let value: Value = serde_json::from_str(obj).unwrap();
        assert_eq!(value["a"], "he said \"}\" loudly");
    }

    #[test]
    fn prose_wrapped_json_with_brace_in_content_is_recovered() {
        let raw = r#"Here you go: {"mainContent": {"title": "Launch :}", "content": "Smile :} and join us"}, "variations": []} enjoy!"#;
        let result = normalize(raw, "launch", Platform::Twitter, ContentType::TextOnly, 280);
        assert_eq!(result.main_content.title, "Launch :}");
        assert_eq!(result.main_content.content, "Smile :} and join us");
        assert!(result.variations.is_empty());
    }

    #[test]
    fn classify_variations_parses_and_degrades() {
        let raw = r#"{ "variations": [ { "content": "v1" }, { "content": "v2" } ] }"#;
        assert_eq!(classify_variations(raw).len(), 2);
        assert!(classify_variations("garbage").is_empty());
    }
}
