//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional.
//! - `REKURSTORE_DATA_DIR` - Directory of the file store (default: .rekurstore)
//! - `REKURSTORE_ADMIN_PHONE` - WhatsApp number receiving orders (default: 628995942945)
//! - `REKURSTORE_ADMIN_PHONE_DISPLAY` - Number shown for e-wallet transfers (default: 0899-5942-945)
//! - `REKURSTORE_ADMIN_EMAIL` - Address receiving orders on the email channel (default: admin@rekurstore.id)
//! - `REKURSTORE_HANDOFF_CHANNEL` - `whatsapp` or `email` (default: whatsapp)
//! - `REKURSTORE_SIMULATED_LATENCY` - Wait the storefront's delays (default: true)
//! - `REKURSTORE_CODE_TTL_SECS` - Expire verification codes after this many seconds
//! - `REKURSTORE_MAX_CODE_ATTEMPTS` - Discard a challenge after this many wrong codes

use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;
use tokio::time::Duration;

use crate::services::auth::{AuthConfig, SimulatedLatency};
use crate::services::checkout::{CheckoutContext, SettlementTable};
use crate::services::handoff::{HandoffChannel, HandoffDispatcher, HandoffRecipients};

const DEFAULT_DATA_DIR: &str = ".rekurstore";
const DEFAULT_ADMIN_PHONE: &str = "628995942945";
const DEFAULT_ADMIN_PHONE_DISPLAY: &str = "0899-5942-945";
const DEFAULT_ADMIN_EMAIL: &str = "admin@rekurstore.id";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorefrontConfig {
    /// Directory holding the persistent store
    pub data_dir: PathBuf,
    /// Number shown for e-wallet transfers
    pub admin_phone_display: String,
    /// Hand-off channel
    pub handoff_channel: HandoffChannel,
    /// Hand-off recipients
    pub recipients: HandoffRecipients,
    /// Auth machine settings
    pub auth: AuthConfig,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            admin_phone_display: DEFAULT_ADMIN_PHONE_DISPLAY.to_string(),
            handoff_channel: HandoffChannel::default(),
            recipients: HandoffRecipients {
                whatsapp_phone: DEFAULT_ADMIN_PHONE.to_string(),
                email: DEFAULT_ADMIN_EMAIL.to_string(),
            },
            auth: AuthConfig::default(),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let handoff_channel = env
            .parse_or("REKURSTORE_HANDOFF_CHANNEL", HandoffChannel::default())?;
        let simulated_latency = env.parse_or("REKURSTORE_SIMULATED_LATENCY", true)?;
        let code_ttl = env
            .parse_optional::<u64>("REKURSTORE_CODE_TTL_SECS")?
            .map(Duration::from_secs);
        let max_code_attempts = env.parse_optional::<u32>("REKURSTORE_MAX_CODE_ATTEMPTS")?;

        if code_ttl.is_some_and(|ttl| ttl.is_zero()) {
            return Err(ConfigError::InvalidEnvVar(
                "REKURSTORE_CODE_TTL_SECS".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        if max_code_attempts == Some(0) {
            return Err(ConfigError::InvalidEnvVar(
                "REKURSTORE_MAX_CODE_ATTEMPTS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            data_dir: PathBuf::from(env.get_or_default("REKURSTORE_DATA_DIR", DEFAULT_DATA_DIR)),
            admin_phone_display: env
                .get_or_default("REKURSTORE_ADMIN_PHONE_DISPLAY", DEFAULT_ADMIN_PHONE_DISPLAY),
            handoff_channel,
            recipients: HandoffRecipients {
                whatsapp_phone: env.get_or_default("REKURSTORE_ADMIN_PHONE", DEFAULT_ADMIN_PHONE),
                email: env.get_or_default("REKURSTORE_ADMIN_EMAIL", DEFAULT_ADMIN_EMAIL),
            },
            auth: AuthConfig {
                latency: if simulated_latency {
                    SimulatedLatency::STOREFRONT
                } else {
                    SimulatedLatency::NONE
                },
                code_ttl,
                max_code_attempts,
            },
        })
    }

    /// Shared checkout collaborators built from this configuration.
    #[must_use]
    pub fn checkout_context(&self) -> CheckoutContext {
        CheckoutContext::new(
            SettlementTable::storefront(&self.admin_phone_display),
            HandoffDispatcher::new(self.handoff_channel, self.recipients.clone()),
        )
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<'a, F>(&'a F);

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    /// Get an optional variable. Blank values count as unset.
    fn get_optional(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    /// Get a variable with a default value.
    fn get_or_default(&self, key: &str, default: &str) -> String {
        self.get_optional(key)
            .unwrap_or_else(|| default.to_string())
    }

    /// Parse an optional variable.
    fn parse_optional<T>(&self, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.get_optional(key)
            .map(|value| {
                value
                    .to_lowercase()
                    .parse::<T>()
                    .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
            })
            .transpose()
    }

    /// Parse a variable with a default value.
    fn parse_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        Ok(self.parse_optional(key)?.unwrap_or(default))
    }
}
