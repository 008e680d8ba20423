use serde_json::{json, Map, Value};
use smartcat_contracts::prompts::{build_system_instruction, build_user_instruction};
use smartcat_contracts::sampling::SamplingParams;

use crate::imaging::EncodedImage;

/// Body for a single vision turn: system framing, then one user message whose
/// content is the image reference followed by the instruction text.
pub fn build_vision_request(
    model: &str,
    image: &EncodedImage,
    prompt: &str,
    language: &str,
    sampling: &SamplingParams,
) -> Value {
    let messages = json!([
        {
            "role": "system",
            "content": build_system_instruction(language),
        },
        {
            "role": "user",
            "content": [
                {
                    "type": "image_url",
                    "image_url": { "url": image.data_url() },
                },
                {
                    "type": "text",
                    "text": build_user_instruction(prompt, language),
                },
            ],
        },
    ]);
    assemble(model, messages, sampling)
}

/// Body for a chat turn; messages go out exactly as the caller sent them.
pub fn build_chat_request(model: &str, messages: Vec<Value>, sampling: &SamplingParams) -> Value {
    assemble(model, Value::Array(messages), sampling)
}

fn assemble(model: &str, messages: Value, sampling: &SamplingParams) -> Value {
    let mut body = Map::new();
    body.insert("model".to_string(), Value::String(model.to_string()));
    body.insert("messages".to_string(), messages);
    sampling.apply_to(&mut body);
    Value::Object(body)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use smartcat_contracts::i18n::JSON_SHAPE;

    use super::*;
    use crate::imaging::WireFormat;

    fn tiny_image() -> EncodedImage {
        EncodedImage {
            format: WireFormat::Jpeg,
            bytes: vec![0xFF, 0xD8, 0xFF],
        }
    }

    #[test]
    fn vision_request_puts_image_before_instruction() {
        let body = build_vision_request(
            "qwen-vl",
            &tiny_image(),
            "  is the bowl empty?  ",
            "en",
            &SamplingParams::default(),
        );
        assert_eq!(body["model"], json!("qwen-vl"));
        let messages = body["messages"].as_array().cloned().unwrap_or_default();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], json!("system"));
        assert_eq!(messages[1]["role"], json!("user"));

        let parts = messages[1]["content"].as_array().cloned().unwrap_or_default();
        assert_eq!(parts[0]["type"], json!("image_url"));
        assert_eq!(parts[0]["image_url"]["url"], json!("data:image/jpeg;base64,/9j/"));
        assert_eq!(parts[1]["type"], json!("text"));
        let text = parts[1]["text"].as_str().unwrap_or_default();
        assert!(text.starts_with("is the bowl empty?\n\n"));
        assert!(text.contains(JSON_SHAPE));
        assert!(body.get("temperature").is_none());
    }

    #[test]
    fn chat_request_forwards_messages_and_valid_sampling() {
        let messages = vec![
            json!({"role": "system", "content": "Be brief."}),
            json!({"role": "user", "content": "hi", "name": "owner"}),
        ];
        let sampling = SamplingParams {
            temperature: Some(0.2),
            top_k: Some(0),
            enable_thinking: Some(true),
            ..SamplingParams::default()
        };
        let body = build_chat_request("qwen3", messages.clone(), &sampling);
        assert_eq!(
            body,
            json!({
                "model": "qwen3",
                "messages": messages,
                "temperature": 0.2,
                "enable_thinking": true,
            })
        );
    }
}
