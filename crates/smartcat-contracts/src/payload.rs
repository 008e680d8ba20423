//! Inbound request bodies read from stdin.

use serde_json::{Map, Value};

use crate::errors::RelayError;
use crate::i18n::Language;

pub const DEFAULT_MIME_TYPE: &str = "image/png";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisionPayload {
    pub image_base64: String,
    pub prompt: String,
    pub language: String,
    pub mime_type: String,
}

impl VisionPayload {
    pub fn parse(raw: &str) -> Result<Self, RelayError> {
        if raw.trim().is_empty() {
            return Err(RelayError::input("No JSON payload provided on stdin"));
        }
        let data: Value = serde_json::from_str(raw)
            .map_err(|err| RelayError::input(format!("Failed to parse JSON payload: {err}")))?;
        let Some(object) = data.as_object() else {
            return Err(RelayError::input("JSON payload must be an object"));
        };

        let image_base64 = text_field(object, "imageBase64").trim().to_string();
        if image_base64.is_empty() {
            return Err(RelayError::input("imageBase64 must be provided"));
        }
        let mime_type = text_field(object, "mimeType");
        Ok(Self {
            image_base64,
            prompt: text_field(object, "prompt"),
            language: text_field(object, "language"),
            mime_type: if mime_type.is_empty() {
                DEFAULT_MIME_TYPE.to_string()
            } else {
                mime_type
            },
        })
    }

    pub fn language(&self) -> Language {
        Language::detect(&self.language)
    }
}

/// Parse and shape-check a chat transcript. Messages are forwarded verbatim.
pub fn parse_chat_messages(raw: &str) -> Result<Vec<Value>, RelayError> {
    if raw.trim().is_empty() {
        return Err(RelayError::input("No messages provided on stdin"));
    }
    let data: Value = serde_json::from_str(raw)
        .map_err(|err| RelayError::input(format!("Failed to parse messages JSON: {err}")))?;
    let Value::Array(messages) = data else {
        return Err(RelayError::input("Messages JSON must be a list"));
    };
    if messages.is_empty() {
        return Err(RelayError::input("Messages JSON must not be empty"));
    }
    for (idx, message) in messages.iter().enumerate() {
        let Some(object) = message.as_object() else {
            return Err(RelayError::input(format!("Message {idx} must be an object")));
        };
        if !object.get("role").map(Value::is_string).unwrap_or(false) {
            return Err(RelayError::input(format!("Message {idx} is missing a role")));
        }
        if !object.contains_key("content") {
            return Err(RelayError::input(format!("Message {idx} is missing content")));
        }
    }
    Ok(messages)
}

/// Strings pass through; other non-null scalars are stringified.
fn text_field(object: &Map<String, Value>, key: &str) -> String {
    match object.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}
