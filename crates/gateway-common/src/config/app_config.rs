//! Application configuration structs
//!
//! Loads configuration from environment variables, with an optional `.env` file.

use std::env;
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub app: AppSettings,
    pub gateway: GatewayConfig,
    pub reconnect: ReconnectConfig,
    pub typing: TypingConfig,
}

/// General application settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppSettings {
    pub name: String,
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

/// Where and how to reach the gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Base URL, `ws://` or `wss://`
    pub url: String,
    pub version: u8,
    pub encoding: String,
    pub token: Option<String>,
    /// Upper bound of the lazy subscription window `[0, n]`
    pub member_list_range: u32,
}

/// Reconnect backoff shape
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectConfig {
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub multiplier: f64,
    /// Fraction of the delay randomised, in `[0, 1]`
    pub jitter: f64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            multiplier: default_multiplier(),
            jitter: default_jitter(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypingConfig {
    pub expiry_ms: u64,
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self {
            expiry_ms: default_typing_expiry_ms(),
        }
    }
}

// Default value functions
fn default_app_name() -> String {
    "gateway-client".to_string()
}

fn default_version() -> u8 {
    9
}

fn default_encoding() -> String {
    "json".to_string()
}

fn default_member_list_range() -> u32 {
    99
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    60_000
}

fn default_multiplier() -> f64 {
    2.0
}

fn default_jitter() -> f64 {
    0.2
}

fn default_typing_expiry_ms() -> u64 {
    10_000
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup("GATEWAY_URL")
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::MissingVar("GATEWAY_URL"))?;
        if !(url.starts_with("ws://") || url.starts_with("wss://")) {
            return Err(ConfigError::InvalidValue("GATEWAY_URL", url));
        }

        let config = Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env: lookup("APP_ENV")
                    .as_deref()
                    .and_then(Environment::parse)
                    .unwrap_or_default(),
            },
            gateway: GatewayConfig {
                url,
                version: parse_var(&lookup, "GATEWAY_VERSION", default_version)?,
                encoding: lookup("GATEWAY_ENCODING").unwrap_or_else(default_encoding),
                token: lookup("GATEWAY_TOKEN").filter(|s| !s.is_empty()),
                member_list_range: parse_var(
                    &lookup,
                    "GATEWAY_MEMBER_LIST_RANGE",
                    default_member_list_range,
                )?,
            },
            reconnect: ReconnectConfig {
                base_delay_ms: parse_var(&lookup, "RECONNECT_BASE_DELAY_MS", default_base_delay_ms)?,
                max_delay_ms: parse_var(&lookup, "RECONNECT_MAX_DELAY_MS", default_max_delay_ms)?,
                multiplier: parse_var(&lookup, "RECONNECT_MULTIPLIER", default_multiplier)?,
                jitter: parse_var(&lookup, "RECONNECT_JITTER", default_jitter)?,
            },
            typing: TypingConfig {
                expiry_ms: parse_var(&lookup, "TYPING_EXPIRY_MS", default_typing_expiry_ms)?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let reconnect = &self.reconnect;
        if !(0.0..=1.0).contains(&reconnect.jitter) {
            return Err(ConfigError::InvalidValue(
                "RECONNECT_JITTER",
                reconnect.jitter.to_string(),
            ));
        }
        if reconnect.multiplier < 1.0 {
            return Err(ConfigError::InvalidValue(
                "RECONNECT_MULTIPLIER",
                reconnect.multiplier.to_string(),
            ));
        }
        if reconnect.base_delay_ms > reconnect.max_delay_ms {
            return Err(ConfigError::InvalidValue(
                "RECONNECT_MAX_DELAY_MS",
                format!(
                    "{} is below the base delay {}",
                    reconnect.max_delay_ms, reconnect.base_delay_ms
                ),
            ));
        }
        if self.typing.expiry_ms == 0 {
            return Err(ConfigError::InvalidValue("TYPING_EXPIRY_MS", "0".to_string()));
        }
        Ok(())
    }
}

fn parse_var<F, T>(lookup: &F, key: &'static str, default: fn() -> T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key, raw)),
        None => Ok(default()),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
