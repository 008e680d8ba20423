//! The single remote call of a relay cycle.
//!
//! There is no retry or backoff: a failed call is reported once and the
//! cycle ends.

use std::time::Duration;

use reqwest::blocking::{Client as HttpClient, Response as HttpResponse};
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use smartcat_contracts::errors::RelayError;
use smartcat_contracts::prompts::truncate_text;

const ERROR_DETAIL_CHARS: usize = 512;
const COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// Sends one request body and returns the decoded response body.
pub trait CompletionTransport {
    fn name(&self) -> &str;
    fn complete(&self, body: &Value) -> Result<Value, RelayError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpTransportConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    /// `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Dump the raw response body to stderr before decoding.
    pub debug_raw: bool,
}

pub struct HttpTransport {
    http: HttpClient,
    endpoint: String,
    api_key: Option<String>,
    debug_raw: bool,
}

impl HttpTransport {
    pub fn new(config: HttpTransportConfig) -> Result<Self, RelayError> {
        let http = HttpClient::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| RelayError::Transport(format!("HTTP client setup failed: {err}")))?;
        let api_key = config
            .api_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());
        Ok(Self {
            http,
            endpoint: completions_endpoint(&config.base_url),
            api_key,
            debug_raw: config.debug_raw,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl CompletionTransport for HttpTransport {
    fn name(&self) -> &str {
        "http"
    }

    fn complete(&self, body: &Value) -> Result<Value, RelayError> {
        log::debug!(
            "POST {} model={}",
            self.endpoint,
            body.get("model").and_then(Value::as_str).unwrap_or("")
        );
        let mut request = self
            .http
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .json(body);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }
        let response = request.send().map_err(|err| {
            let reason = if err.is_timeout() {
                "timed out".to_string()
            } else {
                err.to_string()
            };
            RelayError::Transport(format!("{} ({reason})", self.endpoint))
        })?;
        response_json_or_error(response, self.debug_raw)
    }
}

/// `<base>/v1/chat/completions`, tolerating trailing slashes on the base.
pub fn completions_endpoint(base_url: &str) -> String {
    format!("{}{COMPLETIONS_PATH}", base_url.trim().trim_end_matches('/'))
}

fn response_json_or_error(response: HttpResponse, debug_raw: bool) -> Result<Value, RelayError> {
    let status = response.status();
    let body = response
        .text()
        .map_err(|err| RelayError::Transport(format!("response body read failed: {err}")))?;
    if debug_raw {
        eprintln!("[smartcat-relay] raw response: {body}");
    }
    decode_body(status.as_u16(), &body)
}

fn decode_body(status: u16, body: &str) -> Result<Value, RelayError> {
    if !(200..300).contains(&status) {
        return Err(RelayError::Http {
            status,
            detail: truncate_text(body.trim(), ERROR_DETAIL_CHARS),
        });
    }
    serde_json::from_str(body).map_err(|_| RelayError::decode("Failed to decode response JSON."))
}

/// `choices[0]` of a completion body.
pub fn first_choice(response: &Value) -> Result<&Value, RelayError> {
    response
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .ok_or_else(|| RelayError::decode("Response did not contain any choices."))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn endpoint_ignores_trailing_slashes() {
        assert_eq!(
            completions_endpoint("http://127.0.0.1:18181/"),
            "http://127.0.0.1:18181/v1/chat/completions"
        );
        assert_eq!(
            completions_endpoint(" http://gpu-box:8080// "),
            "http://gpu-box:8080/v1/chat/completions"
        );
    }

    #[test]
    fn non_success_status_keeps_truncated_detail() {
        let long = "x".repeat(600);
        let err = decode_body(502, &long).err();
        match err {
            Some(RelayError::Http { status, detail }) => {
                assert_eq!(status, 502);
                assert_eq!(detail.chars().count(), ERROR_DETAIL_CHARS + 1);
                assert!(detail.ends_with('…'));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn invalid_json_is_a_decode_error() {
        assert!(matches!(
            decode_body(200, "<html>oops</html>"),
            Err(RelayError::Decode(message)) if message == "Failed to decode response JSON."
        ));
    }

    #[test]
    fn first_choice_requires_a_choice() -> anyhow::Result<()> {
        let body = decode_body(200, r#"{"choices": [{"index": 0}, {"index": 1}]}"#)?;
        assert_eq!(first_choice(&body)?, &json!({"index": 0}));
        assert!(matches!(
            first_choice(&json!({"choices": []})),
            Err(RelayError::Decode(_))
        ));
        assert!(matches!(first_choice(&json!({})), Err(RelayError::Decode(_))));
        Ok(())
    }

    #[test]
    fn blank_api_key_is_dropped() -> anyhow::Result<()> {
        let transport = HttpTransport::new(HttpTransportConfig {
            base_url: "http://localhost:1".to_string(),
            api_key: Some("   ".to_string()),
            timeout: Some(Duration::from_secs(10)),
            debug_raw: false,
        })?;
        assert!(transport.api_key.is_none());
        assert_eq!(transport.endpoint(), "http://localhost:1/v1/chat/completions");
        assert_eq!(transport.name(), "http");
        Ok(())
    }
}
