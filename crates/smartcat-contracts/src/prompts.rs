//! Prompt framing for the vision path.

use crate::i18n::{localized, Language, MessageId};

/// Caller prompts longer than this many characters are cut.
pub const MAX_PROMPT_CHARS: usize = 200;

pub fn build_system_instruction(language: &str) -> String {
    localized(MessageId::VisionSystem, Language::detect(language)).to_string()
}

/// Caller prompt (trimmed, truncated) followed by the JSON-only caution.
pub fn build_user_instruction(prompt: &str, language: &str) -> String {
    let caution = localized(MessageId::VisionCaution, Language::detect(language));
    let trimmed = truncate_text(prompt.trim(), MAX_PROMPT_CHARS);
    if trimmed.is_empty() {
        return caution.to_string();
    }
    format!("{trimmed}\n\n{caution}")
}

/// Keep the first `max_chars` characters, marking a cut with `…`.
pub fn truncate_text(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    value.chars().take(max_chars).collect::<String>() + "…"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::JSON_SHAPE;

    #[test]
    fn empty_prompt_yields_caution_only() {
        let text = build_user_instruction("   \n", "en");
        assert_eq!(text, localized(MessageId::VisionCaution, Language::English));
    }

    #[test]
    fn prompt_is_trimmed_and_followed_by_caution() {
        let text = build_user_instruction("  Is the litter box clean?  ", "en");
        let caution = localized(MessageId::VisionCaution, Language::English);
        assert_eq!(text, format!("Is the litter box clean?\n\n{caution}"));
    }

    #[test]
    fn long_prompt_is_cut_at_200_chars_with_ellipsis() {
        let prompt = "貓".repeat(250);
        let text = build_user_instruction(&prompt, "zh-TW");
        let (head, tail) = text.split_once("\n\n").unwrap_or_default();
        assert_eq!(head.chars().count(), MAX_PROMPT_CHARS + 1);
        assert!(head.ends_with('…'));
        assert_eq!(tail, localized(MessageId::VisionCaution, Language::Chinese));
    }

    #[test]
    fn exactly_200_chars_is_not_truncated() {
        let prompt = "a".repeat(MAX_PROMPT_CHARS);
        let text = build_user_instruction(&prompt, "en");
        assert!(text.starts_with(&format!("{prompt}\n\n")));
        assert!(!text.contains('…'));
    }

    #[test]
    fn truncate_text_counts_characters_not_bytes() {
        assert_eq!(truncate_text("短文", 2), "短文");
        assert_eq!(truncate_text("貓咪在睡覺", 2), "貓咪…");
        assert_eq!(truncate_text("", 0), "");
    }

    #[test]
    fn json_shape_clause_is_always_present() {
        let long = "x".repeat(1000);
        let inputs = ["", "hello", long.as_str(), "{\"catVisible\": 1}"];
        for prompt in inputs {
            for language in ["en", "zh", "ZH-hant", "fr", ""] {
                let text = build_user_instruction(prompt, language);
                assert!(text.contains(JSON_SHAPE), "{prompt:?} / {language:?}");
            }
        }
    }

    #[test]
    fn system_instruction_switches_on_language() {
        assert!(build_system_instruction("en").starts_with("You are the Smart Cat Home"));
        assert!(build_system_instruction("zh").starts_with("你是 Smart Cat Home"));
        assert!(build_system_instruction("EN").contains(JSON_SHAPE));
    }
}
