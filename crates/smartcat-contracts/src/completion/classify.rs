use serde_json::Value;

use super::segments::SegmentRole;
use super::shape::{flatten_text, ContentShape};

const MESSAGE_REASONING_KEYS: &[&str] = &["thinking", "reasoning", "analysis", "internal", "thought"];
const CHOICE_REASONING_KEYS: &[&str] = &["thinking", "reasoning", "analysis"];

/// A single reasoning location on a raw choice.
pub type ReasoningSource = fn(&Value) -> String;

/// Locations searched for reasoning text when the content itself carried
/// none, in priority order. The first non-empty result wins.
pub const REASONING_SOURCES: &[(&str, ReasoningSource)] = &[
    ("message", reasoning_on_message),
    ("choice", reasoning_on_choice),
    ("metadata", reasoning_in_metadata),
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifiedResponse {
    pub answer: String,
    pub reasoning: String,
}

impl ClassifiedResponse {
    pub fn is_empty(&self) -> bool {
        self.answer.is_empty() && self.reasoning.is_empty()
    }
}

/// Split one completion choice into answer and reasoning text.
///
/// Never fails: missing or mistyped fields collapse to empty strings.
pub fn classify(choice: &Value) -> ClassifiedResponse {
    let message = choice.get("message").filter(|value| value.is_object());
    let content = message.and_then(|value| value.get("content"));

    let (answer, mut reasoning) = match ContentShape::of(content) {
        ContentShape::PlainText(text) => (text.trim().to_string(), String::new()),
        ContentShape::SegmentList(segments) => split_segments(segments),
        ContentShape::NestedText(text) => {
            let nested = flatten_text(text);
            // An empty `text` still lets the remaining content keys answer.
            let answer = match (nested.is_empty(), content) {
                (true, Some(whole)) => flatten_text(whole),
                _ => nested,
            };
            (answer, String::new())
        }
        ContentShape::Unknown(Some(value)) => (flatten_text(value), String::new()),
        ContentShape::Unknown(None) => (String::new(), String::new()),
    };

    if reasoning.is_empty() {
        reasoning = REASONING_SOURCES
            .iter()
            .map(|(_, source)| source(choice))
            .find(|text| !text.is_empty())
            .unwrap_or_default();
    }

    ClassifiedResponse {
        answer: answer.trim().to_string(),
        reasoning: reasoning.trim().to_string(),
    }
}

fn split_segments(segments: &[Value]) -> (String, String) {
    let mut answer_parts: Vec<String> = Vec::new();
    let mut reasoning_parts: Vec<String> = Vec::new();

    for segment in segments {
        let role = SegmentRole::of_segment(segment);
        if role == SegmentRole::Skip {
            continue;
        }
        let text = segment_text(segment);
        if text.is_empty() {
            continue;
        }
        match role {
            SegmentRole::Reasoning => reasoning_parts.push(text),
            SegmentRole::Answer | SegmentRole::Unclassified => answer_parts.push(text),
            SegmentRole::Skip => {}
        }
    }

    let answer = if answer_parts.is_empty() {
        let kept: Vec<Value> = segments
            .iter()
            .filter(|segment| SegmentRole::of_segment(segment) != SegmentRole::Skip)
            .cloned()
            .collect();
        flatten_text(&Value::Array(kept))
    } else {
        answer_parts.join("\n")
    };
    (answer, reasoning_parts.join("\n"))
}

/// Prefer a nested `text` field, fall back to the whole segment.
fn segment_text(segment: &Value) -> String {
    if let Some(text) = segment.get("text") {
        let flattened = flatten_text(text);
        if !flattened.is_empty() {
            return flattened;
        }
    }
    flatten_text(segment)
}

fn first_reasoning(holder: Option<&Value>, keys: &[&str]) -> String {
    let Some(obj) = holder.and_then(Value::as_object) else {
        return String::new();
    };
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .map(flatten_text)
        .find(|text| !text.is_empty())
        .unwrap_or_default()
}

fn reasoning_on_message(choice: &Value) -> String {
    first_reasoning(choice.get("message"), MESSAGE_REASONING_KEYS)
}

fn reasoning_on_choice(choice: &Value) -> String {
    first_reasoning(Some(choice), CHOICE_REASONING_KEYS)
}

fn reasoning_in_metadata(choice: &Value) -> String {
    first_reasoning(choice.get("metadata"), CHOICE_REASONING_KEYS)
}
