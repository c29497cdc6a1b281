//! HTTP client construction.

use crate::config::VaultConfig;
use reqwest::{Client, ClientBuilder};

/// Build the HTTP client shared by every Vault request.
///
/// Uses rustls and the configured user agent. A request timeout is applied
/// only when one is configured.
///
/// # Errors
///
/// Returns an error if the client cannot be built (e.g., TLS initialization fails).
pub fn build_http_client(config: &VaultConfig) -> Result<Client, reqwest::Error> {
    let mut builder = ClientBuilder::new()
        .user_agent(&config.user_agent)
        .use_rustls_tls();

    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }

    builder.build()
}
