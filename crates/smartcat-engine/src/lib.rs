//! One relay cycle: gate, normalize, frame, send once, classify, compose.

pub mod imaging;
pub mod quality;
pub mod request;
pub mod transport;

use std::path::PathBuf;

use serde_json::{json, Map, Value};
use smartcat_contracts::completion::{classify, compose, ClassifiedResponse};
use smartcat_contracts::errors::RelayError;
use smartcat_contracts::events::{
    EventPayload, EventTrail, COMPLETION_RECEIVED, QUALITY_CHECKED, REQUEST_FAILED,
    REQUEST_FINISHED, REQUEST_SENT, REQUEST_STARTED,
};
use smartcat_contracts::i18n::localized;
use smartcat_contracts::payload::VisionPayload;
use smartcat_contracts::sampling::SamplingParams;
use smartcat_contracts::verdict::render_verdict;

use crate::quality::QualityVerdict;
use crate::transport::{first_choice, CompletionTransport};

pub const DEFAULT_MAX_IMAGE_SIDE: u32 = 640;

/// Result of a cycle that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Completed(String),
    /// The image never left the process; `message` is the localized refusal.
    Rejected {
        verdict: QualityVerdict,
        message: String,
    },
}

impl Outcome {
    pub fn text(&self) -> &str {
        match self {
            Outcome::Completed(text) => text,
            Outcome::Rejected { message, .. } => message,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Outcome::Completed(_) => "completed",
            Outcome::Rejected { .. } => "rejected",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RelayOptions {
    pub model: String,
    pub sampling: SamplingParams,
    pub max_image_side: u32,
    /// Print the composed completion instead of the rendered vision verdict.
    pub raw_output: bool,
}

impl RelayOptions {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            sampling: SamplingParams::default(),
            max_image_side: DEFAULT_MAX_IMAGE_SIDE,
            raw_output: false,
        }
    }
}

pub struct Relay {
    transport: Box<dyn CompletionTransport>,
    options: RelayOptions,
    events_path: Option<PathBuf>,
}

impl Relay {
    pub fn new(transport: Box<dyn CompletionTransport>, options: RelayOptions) -> Self {
        Self {
            transport,
            options,
            events_path: None,
        }
    }

    pub fn with_events(mut self, path: impl Into<PathBuf>) -> Self {
        self.events_path = Some(path.into());
        self
    }

    pub fn options(&self) -> &RelayOptions {
        &self.options
    }

    pub fn run_vision(&self, payload: &VisionPayload) -> Result<Outcome, RelayError> {
        let trail = self.open_trail();
        note(
            trail.as_ref(),
            REQUEST_STARTED,
            json!({
                "mode": "vision",
                "model": self.options.model,
                "transport": self.transport.name(),
                "language": payload.language().as_str(),
            }),
        );
        let result = self.vision_cycle(payload, trail.as_ref());
        finish(trail.as_ref(), result)
    }

    pub fn run_chat(&self, messages: Vec<Value>) -> Result<Outcome, RelayError> {
        let trail = self.open_trail();
        note(
            trail.as_ref(),
            REQUEST_STARTED,
            json!({
                "mode": "chat",
                "model": self.options.model,
                "transport": self.transport.name(),
                "messages": messages.len(),
            }),
        );
        let result = self.chat_cycle(messages, trail.as_ref());
        finish(trail.as_ref(), result)
    }

    fn vision_cycle(
        &self,
        payload: &VisionPayload,
        trail: Option<&EventTrail>,
    ) -> Result<Outcome, RelayError> {
        let language = payload.language();
        let image = imaging::decode_base64_image(&payload.image_base64)?;
        let verdict = quality::evaluate(&image);
        note(
            trail,
            QUALITY_CHECKED,
            json!({
                "verdict": verdict.as_str(),
                "width": image.width(),
                "height": image.height(),
            }),
        );
        if let Some(message_id) = verdict.message_id() {
            log::info!("image rejected before inference: {}", verdict.as_str());
            return Ok(Outcome::Rejected {
                verdict,
                message: localized(message_id, language).to_string(),
            });
        }

        let image = imaging::resize_to_max_side(image, self.options.max_image_side);
        let encoded = imaging::encode_image(&image, &payload.mime_type)?;
        let body = request::build_vision_request(
            &self.options.model,
            &encoded,
            &payload.prompt,
            &payload.language,
            &self.options.sampling,
        );
        note(
            trail,
            REQUEST_SENT,
            json!({
                "mime_type": encoded.format.mime(),
                "image_sha256": encoded.sha256_hex(),
                "image_bytes": encoded.bytes.len(),
                "width": image.width(),
                "height": image.height(),
            }),
        );

        let classified = self.send(&body, trail)?;
        let composed = compose(&classified.answer, &classified.reasoning)
            .ok_or(RelayError::EmptyCompletion)?;
        if self.options.raw_output {
            return Ok(Outcome::Completed(composed));
        }
        let visible = if classified.answer.is_empty() {
            &classified.reasoning
        } else {
            &classified.answer
        };
        Ok(Outcome::Completed(render_verdict(visible, language)))
    }

    fn chat_cycle(
        &self,
        messages: Vec<Value>,
        trail: Option<&EventTrail>,
    ) -> Result<Outcome, RelayError> {
        let body = request::build_chat_request(&self.options.model, messages, &self.options.sampling);
        note(
            trail,
            REQUEST_SENT,
            json!({ "sampling": sampling_keys(&body) }),
        );
        let classified = self.send(&body, trail)?;
        compose(&classified.answer, &classified.reasoning)
            .map(Outcome::Completed)
            .ok_or(RelayError::EmptyCompletion)
    }

    fn send(&self, body: &Value, trail: Option<&EventTrail>) -> Result<ClassifiedResponse, RelayError> {
        let response = self.transport.complete(body)?;
        let classified = classify(first_choice(&response)?);
        log::debug!(
            "classified completion: answer={} chars, reasoning={} chars",
            classified.answer.chars().count(),
            classified.reasoning.chars().count()
        );
        note(
            trail,
            COMPLETION_RECEIVED,
            json!({
                "answer_chars": classified.answer.chars().count(),
                "reasoning_chars": classified.reasoning.chars().count(),
            }),
        );
        Ok(classified)
    }

    fn open_trail(&self) -> Option<EventTrail> {
        self.events_path
            .as_ref()
            .map(|path| EventTrail::new(path, uuid::Uuid::new_v4().to_string()))
    }
}

fn finish(
    trail: Option<&EventTrail>,
    result: Result<Outcome, RelayError>,
) -> Result<Outcome, RelayError> {
    match &result {
        Ok(outcome) => note(trail, REQUEST_FINISHED, json!({ "outcome": outcome.label() })),
        Err(err) => note(
            trail,
            REQUEST_FAILED,
            json!({ "kind": err.kind(), "error": err.to_string() }),
        ),
    }
    result
}

fn note(trail: Option<&EventTrail>, event_type: &str, payload: Value) {
    if let Some(trail) = trail {
        trail.record(event_type, map_object(payload));
    }
}

fn sampling_keys(body: &Value) -> Vec<String> {
    body.as_object()
        .map(|object| {
            object
                .keys()
                .filter(|key| !matches!(key.as_str(), "model" | "messages"))
                .cloned()
                .collect()
        })
        .unwrap_or_default()
}

fn map_object(value: Value) -> EventPayload {
    value.as_object().cloned().unwrap_or_else(Map::new)
}
