//! Flag / environment / default resolution for both subcommands.

use std::env;
use std::time::Duration;

use anyhow::{bail, Result};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:18181";

pub const VISION_BASE_URL_ENV: &[&str] = &[
    "LOCAL_VISION_SERVER_URL",
    "LOCAL_LLM_SERVER_URL",
    "NEXA_BASE_URL",
];
pub const CHAT_BASE_URL_ENV: &[&str] = &["LOCAL_LLM_SERVER_URL", "NEXA_BASE_URL"];
pub const VISION_API_KEY_ENV: &[&str] = &["LOCAL_VISION_SERVER_KEY", "LOCAL_LLM_SERVER_KEY"];
pub const CHAT_API_KEY_ENV: &[&str] = &["LOCAL_LLM_SERVER_KEY"];

pub const DEBUG_RAW_ENV: &str = "LOCAL_LLM_DEBUG_RAW";
pub const MAX_IMAGE_SIDE_ENV: &str = "LOCAL_VISION_MAX_IMAGE_SIDE";

const DEFAULT_MAX_IMAGE_SIDE: u32 = 640;
const MIN_IMAGE_SIDE: u32 = 256;
const MAX_IMAGE_SIDE: u32 = 2048;
const MIN_TIMEOUT_SECS: f64 = 10.0;

/// Timeout read from a millisecond env var, with the cap for one subcommand.
#[derive(Debug, Clone, Copy)]
pub struct TimeoutPolicy {
    pub env_key: &'static str,
    pub default_ms: i64,
    pub max_secs: f64,
}

pub const VISION_TIMEOUT: TimeoutPolicy = TimeoutPolicy {
    env_key: "LOCAL_VISION_TIMEOUT_MS",
    default_ms: 240_000,
    max_secs: 360.0,
};

pub const CHAT_TIMEOUT: TimeoutPolicy = TimeoutPolicy {
    env_key: "LOCAL_LLM_TIMEOUT_MS",
    default_ms: 120_000,
    max_secs: 300.0,
};

/// Source of environment values; the process environment outside tests.
pub trait EnvSource {
    fn get(&self, key: &str) -> Option<String>;
}

pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }
}

pub fn first_non_empty_env(source: &dyn EnvSource, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(value) = source.get(key) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

/// Explicit flag, then the env list, then the built-in default.
pub fn resolve_string(
    flag: Option<String>,
    source: &dyn EnvSource,
    keys: &[&str],
) -> Option<String> {
    flag.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .or_else(|| first_non_empty_env(source, keys))
}

pub fn resolve_base_url(flag: Option<String>, source: &dyn EnvSource, keys: &[&str]) -> String {
    resolve_string(flag, source, keys).unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
}

/// A flag is taken as given in seconds; the env value is milliseconds and is
/// clamped. Non-positive values disable the timeout. A flag too large to
/// represent as a duration is rejected.
pub fn resolve_timeout(
    flag_secs: Option<f64>,
    source: &dyn EnvSource,
    policy: TimeoutPolicy,
) -> Result<Option<Duration>> {
    if let Some(secs) = flag_secs {
        if secs.is_nan() || secs <= 0.0 {
            return Ok(None);
        }
        let Ok(timeout) = Duration::try_from_secs_f64(secs) else {
            bail!("--timeout {secs} is out of range");
        };
        return Ok(Some(timeout));
    }
    let value_ms = first_non_empty_env(source, &[policy.env_key])
        .and_then(|raw| raw.parse::<i64>().ok())
        .unwrap_or(policy.default_ms);
    if value_ms <= 0 {
        return Ok(None);
    }
    let secs = (value_ms as f64 / 1000.0).clamp(MIN_TIMEOUT_SECS, policy.max_secs);
    Ok(Some(Duration::from_secs_f64(secs)))
}

pub fn resolve_max_image_side(flag: Option<i64>, source: &dyn EnvSource) -> u32 {
    let requested = match flag {
        Some(value) => Some(value),
        None => first_non_empty_env(source, &[MAX_IMAGE_SIDE_ENV]).and_then(|raw| raw.parse().ok()),
    };
    match requested {
        Some(value) => value.clamp(i64::from(MIN_IMAGE_SIDE), i64::from(MAX_IMAGE_SIDE)) as u32,
        None => DEFAULT_MAX_IMAGE_SIDE,
    }
}

pub fn env_int(source: &dyn EnvSource, key: &str) -> Option<i64> {
    first_non_empty_env(source, &[key]).and_then(|raw| raw.parse().ok())
}

pub fn env_float(source: &dyn EnvSource, key: &str) -> Option<f64> {
    first_non_empty_env(source, &[key]).and_then(|raw| raw.parse().ok())
}

pub fn env_flag(source: &dyn EnvSource, key: &str) -> bool {
    first_non_empty_env(source, &[key])
        .map(|raw| matches!(raw.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}
