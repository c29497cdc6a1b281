//! Membership provider trait.
//!
//! Ingest and the CLI talk to the Vault through this trait so they can be
//! exercised against an in-memory provider.

use crate::{error::VaultResult, member::Member, response::VaultOutcome};
use async_trait::async_trait;

/// A store of station member records.
#[async_trait]
pub trait MembershipProvider: Send + Sync {
    /// List every member record.
    async fn list_members(&self) -> VaultResult<VaultOutcome<Vec<Member>>>;

    /// Get one member record by its membership ID.
    async fn get_member(&self, membership_id: &str) -> VaultResult<VaultOutcome<Member>>;

    /// Create or update a member record keyed by its membership ID.
    async fn upsert_member(&self, member: &Member) -> VaultResult<VaultOutcome<()>>;
}
