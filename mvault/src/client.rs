//! Membership Vault HTTP client.

use crate::{
    config::VaultConfig,
    error::VaultResult,
    http::build_http_client,
    member::Member,
    provider::MembershipProvider,
    response::{VaultOutcome, member_from_object, members_from_list, read_outcome},
};
use async_trait::async_trait;
use reqwest::{
    Client, Response,
    header::{ACCEPT, CONTENT_TYPE},
};
use secrecy::ExposeSecret;
use tracing::{debug, instrument, warn};
use url::Url;

const MEMBERSHIPS: &str = "memberships";

/// Authenticated client for one station's memberships.
///
/// Credentials are fixed at construction. Each call issues exactly one
/// request; nothing is retried or cached.
pub struct VaultClient {
    config: VaultConfig,
    http: Client,
}

impl VaultClient {
    /// Create a new Vault client.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: VaultConfig) -> VaultResult<Self> {
        config.validate()?;
        let http = build_http_client(&config)?;
        Ok(Self { config, http })
    }

    /// Configuration this client was built with.
    #[must_use]
    pub const fn config(&self) -> &VaultConfig {
        &self.config
    }

    /// List the station's member records.
    ///
    /// Returns the raw response; see [`Self::list_members`] for a typed view.
    ///
    /// # Errors
    ///
    /// Returns an error only on transport failure.
    #[instrument(skip(self), fields(callsign = %self.config.callsign))]
    pub async fn membership_list(&self) -> VaultResult<Response> {
        self.get(self.config.collection_url(MEMBERSHIPS)?).await
    }

    /// Fetch one member record by ID.
    ///
    /// # Errors
    ///
    /// Returns an error only on transport failure.
    #[instrument(skip(self), fields(callsign = %self.config.callsign))]
    pub async fn membership_get(&self, membership_id: &str) -> VaultResult<Response> {
        self.get(self.config.item_url(MEMBERSHIPS, membership_id)?)
            .await
    }

    /// Create or update a member record.
    ///
    /// # Errors
    ///
    /// Returns an error if the member has no start or expire date, or on
    /// transport failure.
    #[instrument(skip(self, member), fields(callsign = %self.config.callsign, membership_id = %member.membership_id))]
    pub async fn membership_update(&self, member: &Member) -> VaultResult<Response> {
        let payload = member.payload()?;
        let url = self.config.item_url(MEMBERSHIPS, &member.membership_id)?;
        debug!(%url, "PUT");

        let response = self
            .http
            .put(url)
            .basic_auth(&self.config.key, Some(self.config.secret.expose_secret()))
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "text/plain")
            .body(payload)
            .send()
            .await?;

        debug!(status = %response.status(), "Vault responded");
        Ok(response)
    }

    /// List the station's members, interpreting the response envelope.
    ///
    /// A station with no members is reported by the Vault as a failure.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or if a successful body is not
    /// a list envelope of member objects.
    pub async fn list_members(&self) -> VaultResult<VaultOutcome<Vec<Member>>> {
        let outcome = read_outcome(self.membership_list().await?).await?;
        log_failure(&outcome);
        outcome.try_map(members_from_list)
    }

    /// Fetch one member, interpreting the response envelope.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or if a successful body is not
    /// a member object.
    pub async fn get_member(&self, membership_id: &str) -> VaultResult<VaultOutcome<Member>> {
        let outcome = read_outcome(self.membership_get(membership_id).await?).await?;
        log_failure(&outcome);
        outcome.try_map(member_from_object)
    }

    /// Create or update a member, interpreting the response envelope.
    ///
    /// # Errors
    ///
    /// Returns an error if the member cannot be rendered or on transport
    /// failure.
    pub async fn upsert_member(&self, member: &Member) -> VaultResult<VaultOutcome<()>> {
        let outcome = read_outcome(self.membership_update(member).await?).await?;
        log_failure(&outcome);
        Ok(outcome.map(|_| ()))
    }

    async fn get(&self, url: Url) -> VaultResult<Response> {
        debug!(%url, "GET");

        let response = self
            .http
            .get(url)
            .basic_auth(&self.config.key, Some(self.config.secret.expose_secret()))
            .send()
            .await?;

        debug!(status = %response.status(), "Vault responded");
        Ok(response)
    }
}

fn log_failure<T>(outcome: &VaultOutcome<T>) {
    if let VaultOutcome::Failure { status, message } = outcome {
        warn!(%status, error = %message, "Vault reported an error");
    }
}

#[async_trait]
impl MembershipProvider for VaultClient {
    async fn list_members(&self) -> VaultResult<VaultOutcome<Vec<Member>>> {
        Self::list_members(self).await
    }

    async fn get_member(&self, membership_id: &str) -> VaultResult<VaultOutcome<Member>> {
        Self::get_member(self, membership_id).await
    }

    async fn upsert_member(&self, member: &Member) -> VaultResult<VaultOutcome<()>> {
        Self::upsert_member(self, member).await
    }
}
