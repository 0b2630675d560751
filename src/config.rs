//! Server configuration parsed from environment variables.
//!
//! `.env` is loaded by `main` before this runs. Provider settings live in
//! [`crate::llm::config`]; this covers the listener, request body size,
//! seeding, the AI retry policy and rate limits.

use std::time::Duration;

use crate::rate_limit::{self, RateLimitConfig};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_AI_MAX_ATTEMPTS: u32 = 2;
pub const DEFAULT_AI_RETRY_BACKOFF_MS: u64 = 500;
pub const DEFAULT_AI_CALL_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_COPILOT_HISTORY_CAP: usize = 20;
/// Request body ceiling for routes that carry base64 photos or video.
pub const DEFAULT_MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config parse failed: {key}={value}")]
    ConfigParse { key: String, value: String },
}

impl crate::error::ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        "E_CONFIG_PARSE"
    }
}

/// Retry and timeout policy at the AI boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AiPolicy {
    pub max_attempts: u32,
    pub retry_backoff: Duration,
    pub call_timeout: Duration,
    pub copilot_history_cap: usize,
}

impl Default for AiPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_AI_MAX_ATTEMPTS,
            retry_backoff: Duration::from_millis(DEFAULT_AI_RETRY_BACKOFF_MS),
            call_timeout: Duration::from_secs(DEFAULT_AI_CALL_TIMEOUT_SECS),
            copilot_history_cap: DEFAULT_COPILOT_HISTORY_CAP,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub max_body_bytes: usize,
    pub seed: bool,
    pub ai: AiPolicy,
    pub rate_limit: RateLimitConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: DEFAULT_PORT,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            seed: true,
            ai: AiPolicy::default(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl AppConfig {
    /// Build typed config from environment variables.
    ///
    /// - `HOST` (default `0.0.0.0`), `PORT` (default 3000)
    /// - `MAX_BODY_BYTES`: body limit on media routes (default 25 MiB)
    /// - `ECOCLEAR_SEED`: load demo records at start-up (default `true`)
    /// - `AI_MAX_ATTEMPTS` (2), `AI_RETRY_BACKOFF_MS` (500), `AI_CALL_TIMEOUT_SECS` (30)
    /// - `COPILOT_HISTORY_CAP` (20)
    /// - `RATE_LIMIT_PER_CLIENT`, `RATE_LIMIT_PER_CLIENT_WINDOW_SECS`,
    ///   `RATE_LIMIT_GLOBAL`, `RATE_LIMIT_GLOBAL_WINDOW_SECS`,
    ///   `RATE_LIMIT_TOKEN_BUDGET`, `RATE_LIMIT_TOKEN_WINDOW_SECS`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ConfigParse`] when a set variable does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`], reading values through `lookup`.
    ///
    /// # Errors
    ///
    /// See [`AppConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let ai = AiPolicy {
            max_attempts: parse(&get, "AI_MAX_ATTEMPTS", DEFAULT_AI_MAX_ATTEMPTS)?.max(1),
            retry_backoff: Duration::from_millis(parse(&get, "AI_RETRY_BACKOFF_MS", DEFAULT_AI_RETRY_BACKOFF_MS)?),
            call_timeout: Duration::from_secs(parse(&get, "AI_CALL_TIMEOUT_SECS", DEFAULT_AI_CALL_TIMEOUT_SECS)?),
            copilot_history_cap: parse(&get, "COPILOT_HISTORY_CAP", DEFAULT_COPILOT_HISTORY_CAP)?,
        };

        let rate_limit = RateLimitConfig {
            per_client_limit: parse(&get, "RATE_LIMIT_PER_CLIENT", rate_limit::DEFAULT_PER_CLIENT_LIMIT)?,
            per_client_window: Duration::from_secs(parse(
                &get,
                "RATE_LIMIT_PER_CLIENT_WINDOW_SECS",
                rate_limit::DEFAULT_PER_CLIENT_WINDOW_SECS,
            )?),
            global_limit: parse(&get, "RATE_LIMIT_GLOBAL", rate_limit::DEFAULT_GLOBAL_LIMIT)?,
            global_window: Duration::from_secs(parse(
                &get,
                "RATE_LIMIT_GLOBAL_WINDOW_SECS",
                rate_limit::DEFAULT_GLOBAL_WINDOW_SECS,
            )?),
            token_budget: parse(&get, "RATE_LIMIT_TOKEN_BUDGET", rate_limit::DEFAULT_TOKEN_BUDGET)?,
            token_window: Duration::from_secs(parse(
                &get,
                "RATE_LIMIT_TOKEN_WINDOW_SECS",
                rate_limit::DEFAULT_TOKEN_WINDOW_SECS,
            )?),
        };

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse(&get, "PORT", DEFAULT_PORT)?,
            max_body_bytes: parse(&get, "MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES)?,
            seed: parse_bool(&get, "ECOCLEAR_SEED", true)?,
            ai,
            rate_limit,
        })
    }

    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<T: std::str::FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError> {
    match get(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::ConfigParse { key: key.into(), value: raw }),
    }
}

fn parse_bool(get: &impl Fn(&str) -> Option<String>, key: &str, default: bool) -> Result<bool, ConfigError> {
    match get(key) {
        None => Ok(default),
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::ConfigParse { key: key.into(), value: raw }),
        },
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
