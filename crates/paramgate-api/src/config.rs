//! Validation layer configuration.
//!
//! Defaults suit most routes. Override via environment variables or
//! explicit construction.

/// Default body limit: 2 MiB.
pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Settings shared by every validated route of a router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationLayerConfig {
    /// Largest request body buffered for validation, in bytes. Larger
    /// bodies are rejected with 413.
    pub body_limit: usize,
}

impl Default for ValidationLayerConfig {
    fn default() -> Self {
        Self {
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

impl ValidationLayerConfig {
    pub fn with_body_limit(mut self, body_limit: usize) -> Self {
        self.body_limit = body_limit;
        self
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `PARAMGATE_BODY_LIMIT` (default: 2097152)
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Ok(raw) = std::env::var("PARAMGATE_BODY_LIMIT") {
            config.body_limit = parse_body_limit(&raw)?;
        }
        Ok(config)
    }
}

fn parse_body_limit(raw: &str) -> Result<usize, ConfigError> {
    match raw.trim().parse::<usize>() {
        Ok(0) | Err(_) => Err(ConfigError::InvalidBodyLimit(raw.to_string())),
        Ok(limit) => Ok(limit),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("PARAMGATE_BODY_LIMIT must be a positive byte count, got '{0}'")]
    InvalidBodyLimit(String),
}
