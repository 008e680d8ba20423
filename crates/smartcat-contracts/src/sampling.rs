use std::fmt;
use std::str::FromStr;

use serde_json::{json, Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReasoningEffort {
    Low,
    Medium,
    High,
}

impl ReasoningEffort {
    pub fn as_str(self) -> &'static str {
        match self {
            ReasoningEffort::Low => "low",
            ReasoningEffort::Medium => "medium",
            ReasoningEffort::High => "high",
        }
    }
}

impl FromStr for ReasoningEffort {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(ReasoningEffort::Low),
            "medium" => Ok(ReasoningEffort::Medium),
            "high" => Ok(ReasoningEffort::High),
            other => Err(format!(
                "invalid reasoning effort '{other}' (expected low, medium or high)"
            )),
        }
    }
}

impl fmt::Display for ReasoningEffort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional sampling knobs forwarded to the server.
///
/// Values failing the range checks (including NaN and infinities) are
/// dropped rather than rejected, so the server falls back to its own
/// defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SamplingParams {
    pub max_tokens: Option<i64>,
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub top_k: Option<i64>,
    pub min_p: Option<f64>,
    pub enable_thinking: Option<bool>,
    pub reasoning_effort: Option<ReasoningEffort>,
}

impl SamplingParams {
    pub fn apply_to(&self, body: &mut Map<String, Value>) {
        if let Some(value) = self.max_tokens.filter(|value| *value > 0) {
            body.insert("max_tokens".to_string(), json!(value));
        }
        if let Some(value) = self.temperature.filter(|value| value.is_finite() && *value >= 0.0) {
            body.insert("temperature".to_string(), json!(value));
        }
        if let Some(value) = self.top_p.filter(|value| *value > 0.0 && *value <= 1.0) {
            body.insert("top_p".to_string(), json!(value));
        }
        if let Some(value) = self.top_k.filter(|value| *value > 0) {
            body.insert("top_k".to_string(), json!(value));
        }
        if let Some(value) = self.min_p.filter(|value| value.is_finite() && *value >= 0.0) {
            body.insert("min_p".to_string(), json!(value));
        }
        if let Some(value) = self.enable_thinking {
            body.insert("enable_thinking".to_string(), Value::Bool(value));
        }
        if let Some(value) = self.reasoning_effort {
            body.insert(
                "reasoning_effort".to_string(),
                Value::String(value.as_str().to_string()),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Map, Value};

    use super::*;

    fn applied(params: &SamplingParams) -> Value {
        let mut body = Map::new();
        params.apply_to(&mut body);
        Value::Object(body)
    }

    #[test]
    fn unset_params_add_nothing() {
        assert_eq!(applied(&SamplingParams::default()), json!({}));
    }

    #[test]
    fn valid_params_are_forwarded() {
        let params = SamplingParams {
            max_tokens: Some(256),
            temperature: Some(0.0),
            top_p: Some(1.0),
            top_k: Some(40),
            min_p: Some(0.05),
            enable_thinking: Some(false),
            reasoning_effort: Some(ReasoningEffort::High),
        };
        assert_eq!(
            applied(&params),
            json!({
                "max_tokens": 256,
                "temperature": 0.0,
                "top_p": 1.0,
                "top_k": 40,
                "min_p": 0.05,
                "enable_thinking": false,
                "reasoning_effort": "high",
            })
        );
    }

    #[test]
    fn out_of_range_params_are_dropped() {
        let params = SamplingParams {
            max_tokens: Some(0),
            temperature: Some(-0.1),
            top_p: Some(0.0),
            top_k: Some(-1),
            min_p: Some(-0.5),
            enable_thinking: None,
            reasoning_effort: None,
        };
        assert_eq!(applied(&params), json!({}));

        let too_high = SamplingParams {
            top_p: Some(1.01),
            ..SamplingParams::default()
        };
        assert_eq!(applied(&too_high), json!({}));
    }

    #[test]
    fn non_finite_floats_are_dropped() {
        let params = SamplingParams {
            temperature: Some(f64::INFINITY),
            top_p: Some(f64::NAN),
            min_p: Some(f64::INFINITY),
            ..SamplingParams::default()
        };
        assert_eq!(applied(&params), json!({}));
    }

    #[test]
    fn reasoning_effort_parses_case_insensitively() {
        assert_eq!("HIGH".parse::<ReasoningEffort>(), Ok(ReasoningEffort::High));
        assert_eq!(" low".parse::<ReasoningEffort>(), Ok(ReasoningEffort::Low));
        assert!("extreme".parse::<ReasoningEffort>().is_err());
        assert_eq!(ReasoningEffort::Medium.to_string(), "medium");
    }
}
