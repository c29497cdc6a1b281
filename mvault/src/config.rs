//! Vault client configuration.

use crate::error::{VaultError, VaultResult};
use secrecy::SecretString;
use std::env;
use std::time::Duration;
use url::Url;

/// Production Membership Vault API root.
pub const DEFAULT_BASE_ENDPOINT: &str = "https://mvault.services.pbs.org/api";

/// Vault client configuration.
#[derive(Debug, Clone)]
pub struct VaultConfig {
    /// API root, without the callsign segment
    pub base_endpoint: String,
    /// Station callsign
    pub callsign: String,
    /// API key (basic-auth user)
    pub key: String,
    /// API secret (basic-auth password)
    pub secret: SecretString,
    /// Request timeout, none by default
    pub timeout: Option<Duration>,
    /// User agent string
    pub user_agent: String,
}

impl VaultConfig {
    /// Create a configuration against the production endpoint.
    #[must_use]
    pub fn new(
        callsign: impl Into<String>,
        key: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            base_endpoint: DEFAULT_BASE_ENDPOINT.to_string(),
            callsign: callsign.into(),
            key: key.into(),
            secret: SecretString::from(secret.into()),
            timeout: None,
            user_agent: concat!("mvault/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    /// Load configuration from `MVAULT_*` environment variables.
    ///
    /// A `.env` file in the working directory is read first if present.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value is invalid.
    pub fn from_env() -> VaultResult<Self> {
        dotenvy::dotenv().ok();

        let callsign = require_env("MVAULT_CALLSIGN")?;
        let key = require_env("MVAULT_KEY")?;
        let secret = require_env("MVAULT_SECRET")?;

        let mut config = Self::new(callsign, key, secret);
        if let Ok(endpoint) = env::var("MVAULT_BASE_ENDPOINT") {
            config = config.with_base_endpoint(endpoint);
        }
        if let Ok(secs) = env::var("MVAULT_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .map_err(|e| VaultError::invalid_config(format!("Invalid MVAULT_TIMEOUT_SECS: {e}")))?;
            config = config.with_timeout(Duration::from_secs(secs));
        }

        config.validate()?;
        Ok(config)
    }

    /// Set the API root.
    #[must_use]
    pub fn with_base_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.base_endpoint = endpoint.into();
        self
    }

    /// Set request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Check that every field needed to issue a request is usable.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first invalid field.
    pub fn validate(&self) -> VaultResult<()> {
        let url = Url::parse(&self.base_endpoint).map_err(|e| {
            VaultError::invalid_config(format!("Invalid base endpoint {}: {e}", self.base_endpoint))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(VaultError::invalid_config(format!(
                "Base endpoint must be http(s), got {}",
                url.scheme()
            )));
        }
        if self.callsign.is_empty() || self.callsign.contains('/') {
            return Err(VaultError::invalid_config(format!(
                "Invalid callsign: {:?}",
                self.callsign
            )));
        }
        if self.key.is_empty() {
            return Err(VaultError::invalid_config("API key is empty"));
        }
        Ok(())
    }

    /// Collection URL for a Vault resource, with its trailing slash.
    pub(crate) fn collection_url(&self, resource: &str) -> VaultResult<Url> {
        self.endpoint_url(&[self.callsign.as_str(), resource, ""])
    }

    /// Item URL for a Vault resource.
    ///
    /// The ID is percent-encoded as a single path segment.
    pub(crate) fn item_url(&self, resource: &str, id: &str) -> VaultResult<Url> {
        self.endpoint_url(&[self.callsign.as_str(), resource, id])
    }

    fn endpoint_url(&self, segments: &[&str]) -> VaultResult<Url> {
        let mut url = Url::parse(&self.base_endpoint).map_err(|e| {
            VaultError::invalid_config(format!("Invalid base endpoint {}: {e}", self.base_endpoint))
        })?;
        url.path_segments_mut()
            .map_err(|()| {
                VaultError::invalid_config(format!(
                    "Base endpoint cannot carry a path: {}",
                    self.base_endpoint
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

fn require_env(name: &str) -> VaultResult<String> {
    env::var(name).map_err(|_| VaultError::invalid_config(format!("{name} is not set")))
}
