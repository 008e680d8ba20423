use serde_json::Value;

/// Routing decision for one element of a segmented `content` array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentRole {
    Skip,
    Reasoning,
    Answer,
    Unclassified,
}

const ROLE_TABLE: &[(&str, SegmentRole)] = &[
    ("tool", SegmentRole::Skip),
    ("tool_result", SegmentRole::Skip),
    ("function", SegmentRole::Skip),
    ("function_call", SegmentRole::Skip),
    ("tool_call", SegmentRole::Skip),
    ("thinking", SegmentRole::Reasoning),
    ("reasoning", SegmentRole::Reasoning),
    ("analysis", SegmentRole::Reasoning),
    ("internal", SegmentRole::Reasoning),
    ("chain_of_thought", SegmentRole::Reasoning),
    ("cot", SegmentRole::Reasoning),
    ("reflection", SegmentRole::Reasoning),
    ("thought", SegmentRole::Reasoning),
    ("", SegmentRole::Answer),
    ("text", SegmentRole::Answer),
    ("output", SegmentRole::Answer),
    ("message", SegmentRole::Answer),
    ("assistant", SegmentRole::Answer),
    ("assistant_response", SegmentRole::Answer),
    ("final", SegmentRole::Answer),
    ("reply", SegmentRole::Answer),
];

impl SegmentRole {
    /// Exact table lookup on a normalized type tag.
    pub fn lookup(type_tag: &str) -> Self {
        ROLE_TABLE
            .iter()
            .find(|(tag, _)| *tag == type_tag)
            .map(|(_, role)| *role)
            .unwrap_or(SegmentRole::Unclassified)
    }

    /// Table lookup, then the keyword heuristic for unknown tags.
    ///
    /// Expects a tag already trimmed and lowercased, as `of_segment`
    /// produces. Never returns `Unclassified`.
    pub fn resolve(type_tag: &str) -> Self {
        match Self::lookup(type_tag) {
            SegmentRole::Unclassified => {
                if type_tag.contains("think") || type_tag.contains("reason") {
                    SegmentRole::Reasoning
                } else {
                    SegmentRole::Answer
                }
            }
            known => known,
        }
    }

    /// Role of a raw segment. Bare values (strings, nested arrays) are
    /// untyped and therefore answer text.
    pub fn of_segment(segment: &Value) -> Self {
        match segment {
            Value::Object(obj) => Self::resolve(&type_tag(obj.get("type"))),
            _ => SegmentRole::Answer,
        }
    }
}

/// Missing or null type is the empty tag; scalars are stringified.
fn type_tag(value: Option<&Value>) -> String {
    let raw = match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    };
    raw.trim().to_lowercase()
}
