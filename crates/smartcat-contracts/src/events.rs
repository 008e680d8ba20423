use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};

pub type EventPayload = Map<String, Value>;

pub const REQUEST_STARTED: &str = "request_started";
pub const QUALITY_CHECKED: &str = "quality_checked";
pub const REQUEST_SENT: &str = "request_sent";
pub const COMPLETION_RECEIVED: &str = "completion_received";
pub const REQUEST_FINISHED: &str = "request_finished";
pub const REQUEST_FAILED: &str = "request_failed";

/// Append-only diagnostic trail for one relay cycle.
///
/// Each line is one compact JSON object carrying `type`, `request_id` and
/// `ts`; caller payload keys are merged last and may override them. Prompt
/// and answer text are never written, only sizes and verdicts.
#[derive(Debug, Clone)]
pub struct EventTrail {
    path: PathBuf,
    request_id: String,
}

impl EventTrail {
    pub fn new(path: impl Into<PathBuf>, request_id: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            request_id: request_id.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn emit(&self, event_type: &str, payload: EventPayload) -> anyhow::Result<Value> {
        let mut event = Map::new();
        event.insert("type".to_string(), Value::String(event_type.to_string()));
        event.insert(
            "request_id".to_string(),
            Value::String(self.request_id.clone()),
        );
        event.insert("ts".to_string(), Value::String(now_utc_iso()));
        for (key, value) in payload {
            event.insert(key, value);
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let line = serde_json::to_string(&event)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        file.write_all(b"\n")?;
        Ok(Value::Object(event))
    }

    /// Emit, logging instead of failing: the trail must never break a relay.
    pub fn record(&self, event_type: &str, payload: EventPayload) {
        if let Err(err) = self.emit(event_type, payload) {
            log::warn!(
                "event trail write to {} failed: {err:#}",
                self.path.display()
            );
        }
    }
}

fn now_utc_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false)
}
