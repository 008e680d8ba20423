//! Rendering of the vision model's JSON verdict into caller-facing text.

use serde_json::{Map, Value};

use crate::i18n::{localized, Language, MessageId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatVerdict {
    pub cat_visible: bool,
    pub summary: String,
    pub care_tips: String,
}

impl CatVerdict {
    pub fn parse(text: &str) -> Option<Self> {
        let object = extract_json_object_from_text(text)?;
        Some(Self {
            cat_visible: object.get("catVisible").map(is_truthy).unwrap_or(false),
            summary: string_field(&object, "summary"),
            care_tips: string_field(&object, "careTips"),
        })
    }
}

/// Turn the answer channel into the message shown to the user.
pub fn render_verdict(answer: &str, language: Language) -> String {
    let Some(verdict) = CatVerdict::parse(answer) else {
        return localized(MessageId::Unreadable, language).to_string();
    };
    if !verdict.cat_visible {
        return localized(MessageId::NoSubject, language).to_string();
    }
    let combined = [verdict.summary.as_str(), verdict.care_tips.as_str()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<&str>>()
        .join("\n\n");
    if combined.is_empty() {
        return localized(MessageId::LimitedInfo, language).to_string();
    }
    combined
}

fn string_field(object: &Map<String, Value>, key: &str) -> String {
    object
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default()
        .to_string()
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(raw) => *raw,
        Value::Number(raw) => raw.as_f64().map(|value| value != 0.0).unwrap_or(false),
        Value::String(raw) => {
            let lowered = raw.trim().to_ascii_lowercase();
            !matches!(lowered.as_str(), "" | "0" | "false" | "no" | "off")
        }
        Value::Array(items) => !items.is_empty(),
        Value::Object(obj) => !obj.is_empty(),
        Value::Null => false,
    }
}

fn strip_code_fence(text: &str) -> String {
    let raw = text.trim();
    if !(raw.starts_with("```") && raw.ends_with("```")) {
        return raw.to_string();
    }
    let lines: Vec<&str> = raw.lines().collect();
    if lines.len() < 2 {
        return raw.trim_matches('`').trim().to_string();
    }
    let mut body = lines[1..lines.len() - 1].join("\n").trim().to_string();
    let opener = lines[0].trim_start_matches('`').trim();
    if opener.eq_ignore_ascii_case("json") {
        return body;
    }
    if body.to_ascii_lowercase().starts_with("json") {
        body = body[4..].trim().to_string();
    }
    body
}

fn extract_json_object_from_text(text: &str) -> Option<Map<String, Value>> {
    let raw = strip_code_fence(text);
    if raw.trim().is_empty() {
        return None;
    }
    let mut candidates = vec![raw.clone()];
    if let (Some(start), Some(end)) = (raw.find('{'), raw.rfind('}')) {
        if end > start {
            candidates.push(raw[start..=end].to_string());
        }
    }
    for candidate in candidates {
        if let Ok(parsed) = serde_json::from_str::<Value>(&candidate) {
            if let Some(object) = parsed.as_object() {
                return Some(object.clone());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visible_cat_joins_summary_and_tips() {
        let answer = r#"{"catVisible": true, "summary": " Sleeping on the sofa. ", "careTips": "Refill water."}"#;
        assert_eq!(
            render_verdict(answer, Language::English),
            "Sleeping on the sofa.\n\nRefill water."
        );
    }

    #[test]
    fn fenced_json_is_accepted() {
        let answer = "```json\n{\"catVisible\": true, \"summary\": \"Grooming.\", \"careTips\": \"\"}\n```";
        assert_eq!(render_verdict(answer, Language::English), "Grooming.");
    }

    #[test]
    fn json_embedded_in_prose_is_accepted() {
        let answer = "Here you go: {\"catVisible\": 1, \"summary\": \"\", \"careTips\": \"Brush weekly.\"} done";
        assert_eq!(render_verdict(answer, Language::Chinese), "Brush weekly.");
    }

    #[test]
    fn empty_verdict_literal_means_no_cat() {
        let answer = crate::i18n::EMPTY_VERDICT;
        assert_eq!(
            render_verdict(answer, Language::Chinese),
            localized(MessageId::NoSubject, Language::Chinese)
        );
        assert_eq!(
            render_verdict(r#"{"summary": "x"}"#, Language::English),
            localized(MessageId::NoSubject, Language::English)
        );
    }

    #[test]
    fn visible_cat_without_text_is_limited_info() {
        let answer = r#"{"catVisible": "true", "summary": "  ", "careTips": null}"#;
        assert_eq!(
            render_verdict(answer, Language::English),
            localized(MessageId::LimitedInfo, Language::English)
        );
    }

    #[test]
    fn prose_answer_is_unreadable() {
        assert_eq!(
            render_verdict("It is too dark to tell.", Language::English),
            localized(MessageId::Unreadable, Language::English)
        );
        assert_eq!(
            render_verdict("[1, 2]", Language::Chinese),
            localized(MessageId::Unreadable, Language::Chinese)
        );
    }

    #[test]
    fn truthiness_follows_json_semantics() {
        assert!(is_truthy(&Value::Bool(true)));
        assert!(!is_truthy(&Value::Bool(false)));
        assert!(!is_truthy(&serde_json::json!(0)));
        assert!(is_truthy(&serde_json::json!(2)));
        assert!(!is_truthy(&serde_json::json!("false")));
        assert!(!is_truthy(&Value::Null));
    }
}
