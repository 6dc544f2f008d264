//! Process configuration.
//!
//! [`Settings`] gathers everything needed to build the model client, the data
//! store and the conversation loop. Values come from the environment (see
//! [`Settings::from_env`]) and are validated once at start-up; a missing API
//! key is fatal.

use std::path::PathBuf;

use url::Url;

/// Default OpenRouter-compatible API base URL.
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";

/// Default application label sent as `X-Title`.
pub const DEFAULT_APP_NAME: &str = "DataAnalysisAPI";

/// Default SQLite database path.
pub const DEFAULT_DATABASE_PATH: &str = "data/uploads.db";

/// Default number of model round trips per exchange.
pub const DEFAULT_MAX_ITERATIONS: usize = 7;

/// Default cap on caller-supplied history messages.
pub const DEFAULT_MAX_HISTORY_MESSAGES: usize = 50;

/// Default per-exchange timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Configuration errors, all fatal at start-up.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("{0} environment variable not set")]
    Missing(&'static str),

    /// A variable is set but cannot be used.
    #[error("invalid value for {key}: {reason}")]
    Invalid {
        /// The variable name.
        key: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

impl ConfigError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Application settings.
#[derive(Clone)]
pub struct Settings {
    /// API credential for the model provider.
    pub api_key: String,
    /// Base URL of the OpenAI-compatible API.
    pub base_url: String,
    /// Model identifier used for every exchange.
    pub model: String,
    /// Application label sent to the provider.
    pub app_name: String,
    /// Path of the SQLite database file.
    pub database_path: PathBuf,
    /// Iteration budget per exchange.
    pub max_iterations: usize,
    /// Most recent caller-supplied history messages kept when seeding a transcript.
    pub max_history_messages: usize,
    /// Per-exchange timeout in seconds.
    pub request_timeout_secs: u64,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("app_name", &self.app_name)
            .field("database_path", &self.database_path)
            .field("max_iterations", &self.max_iterations)
            .field("max_history_messages", &self.max_history_messages)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl Settings {
    /// Create settings with defaults for everything but the API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            model: DEFAULT_MODEL.to_owned(),
            app_name: DEFAULT_APP_NAME.to_owned(),
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_history_messages: DEFAULT_MAX_HISTORY_MESSAGES,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }

    /// Load settings from process environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OPENROUTER_API_KEY` (required)
    /// - `OPENROUTER_BASE_URL`, `MODEL_NAME`, `APP_NAME`, `DATABASE_PATH`,
    ///   `MAX_ITERATIONS`, `MAX_HISTORY_MESSAGES`, `REQUEST_TIMEOUT_SECS` (optional)
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the key is missing or any value fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the key is missing or any value fails validation.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get("OPENROUTER_API_KEY").ok_or(ConfigError::Missing("OPENROUTER_API_KEY"))?;
        let mut settings = Self::new(api_key);

        if let Some(v) = get("OPENROUTER_BASE_URL") {
            settings.base_url = v;
        }
        if let Some(v) = get("MODEL_NAME") {
            settings.model = v;
        }
        if let Some(v) = get("APP_NAME") {
            settings.app_name = v;
        }
        if let Some(v) = get("DATABASE_PATH") {
            settings.database_path = PathBuf::from(v);
        }
        if let Some(v) = get("MAX_ITERATIONS") {
            settings.max_iterations = parse_number("MAX_ITERATIONS", &v)?;
        }
        if let Some(v) = get("MAX_HISTORY_MESSAGES") {
            settings.max_history_messages = parse_number("MAX_HISTORY_MESSAGES", &v)?;
        }
        if let Some(v) = get("REQUEST_TIMEOUT_SECS") {
            settings.request_timeout_secs = parse_number("REQUEST_TIMEOUT_SECS", &v)?;
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Check that the settings are usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] describing the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::Missing("OPENROUTER_API_KEY"));
        }
        let url = Url::parse(&self.base_url)
            .map_err(|e| ConfigError::invalid("OPENROUTER_BASE_URL", e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::invalid(
                "OPENROUTER_BASE_URL",
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::invalid("MODEL_NAME", "must not be empty"));
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::invalid("MAX_ITERATIONS", "must be at least 1"));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "REQUEST_TIMEOUT_SECS",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::invalid(key, e.to_string()))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_lookup(lookup(&[("OPENROUTER_API_KEY", "sk-test")])).unwrap();
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.model, DEFAULT_MODEL);
        assert_eq!(settings.app_name, DEFAULT_APP_NAME);
        assert_eq!(settings.database_path, PathBuf::from(DEFAULT_DATABASE_PATH));
        assert_eq!(settings.max_iterations, 7);
    }

    #[test]
    fn test_missing_key_is_fatal() {
        let err = Settings::from_lookup(lookup(&[("MODEL_NAME", "x")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("OPENROUTER_API_KEY"));

        let err = Settings::from_lookup(lookup(&[("OPENROUTER_API_KEY", "   ")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("OPENROUTER_API_KEY"));
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::from_lookup(lookup(&[
            ("OPENROUTER_API_KEY", "sk-test"),
            ("OPENROUTER_BASE_URL", "http://localhost:11434/v1"),
            ("MODEL_NAME", "anthropic/claude-3-sonnet"),
            ("MAX_ITERATIONS", "5"),
            ("DATABASE_PATH", "/tmp/t.db"),
        ]))
        .unwrap();
        assert_eq!(settings.base_url, "http://localhost:11434/v1");
        assert_eq!(settings.model, "anthropic/claude-3-sonnet");
        assert_eq!(settings.max_iterations, 5);
        assert_eq!(settings.database_path, PathBuf::from("/tmp/t.db"));
    }

    #[test]
    fn test_invalid_values() {
        let err = Settings::from_lookup(lookup(&[
            ("OPENROUTER_API_KEY", "sk-test"),
            ("MAX_ITERATIONS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "MAX_ITERATIONS", .. }));

        let err = Settings::from_lookup(lookup(&[
            ("OPENROUTER_API_KEY", "sk-test"),
            ("MAX_ITERATIONS", "many"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "MAX_ITERATIONS", .. }));

        let err = Settings::from_lookup(lookup(&[
            ("OPENROUTER_API_KEY", "sk-test"),
            ("OPENROUTER_BASE_URL", "ftp://example.com"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "OPENROUTER_BASE_URL", .. }));
    }

    #[test]
    fn test_debug_redacts_key() {
        let settings = Settings::new("sk-secret");
        let debug = format!("{settings:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
