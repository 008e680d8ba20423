use serde_json::Value;

/// Keys probed, in order, when an object has to be reduced to text.
const FLATTEN_KEYS: &[&str] = &[
    "text",
    "content",
    "value",
    "message",
    "reasoning",
    "thinking",
    "thought",
];

/// Shape of `choice.message.content`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContentShape<'a> {
    PlainText(&'a str),
    SegmentList(&'a [Value]),
    NestedText(&'a Value),
    Unknown(Option<&'a Value>),
}

impl<'a> ContentShape<'a> {
    pub fn of(content: Option<&'a Value>) -> Self {
        match content {
            Some(Value::String(text)) => ContentShape::PlainText(text),
            Some(Value::Array(segments)) => ContentShape::SegmentList(segments),
            Some(Value::Object(obj)) => match obj.get("text") {
                Some(text) => ContentShape::NestedText(text),
                None => ContentShape::Unknown(content),
            },
            other => ContentShape::Unknown(other),
        }
    }
}

/// Reduce an arbitrary JSON value to trimmed text.
///
/// Strings trim to themselves, arrays join their non-empty parts with a
/// newline, objects recurse into the first of `FLATTEN_KEYS` that yields
/// text. Everything else is empty.
pub fn flatten_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.trim().to_string(),
        Value::Array(items) => items
            .iter()
            .map(flatten_text)
            .filter(|part| !part.is_empty())
            .collect::<Vec<String>>()
            .join("\n")
            .trim()
            .to_string(),
        Value::Object(obj) => {
            for key in FLATTEN_KEYS {
                if let Some(inner) = obj.get(*key) {
                    let flattened = flatten_text(inner);
                    if !flattened.is_empty() {
                        return flattened;
                    }
                }
            }
            String::new()
        }
        _ => String::new(),
    }
}
