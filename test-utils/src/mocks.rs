//! Mock implementations for testing.

use async_trait::async_trait;
use mvault::{Member, MembershipProvider, VaultOutcome, VaultResult};
use reqwest::StatusCode;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Message the Vault returns when listing a station with no members.
pub const NO_MEMBERSHIPS: &str = "No memberships exist for this station";

/// In-memory membership store that records every upsert it receives.
///
/// Upserts render the payload first, like the real client, so a member
/// missing its dates fails the same way.
#[derive(Debug, Default, Clone)]
pub struct MockMembershipProvider {
    members: Arc<RwLock<BTreeMap<String, Member>>>,
    upserts: Arc<RwLock<Vec<Member>>>,
    rejections: Arc<RwLock<HashMap<String, String>>>,
}

impl MockMembershipProvider {
    /// Create an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject upserts for `membership_id` with a 400 and `message`.
    pub async fn reject(&self, membership_id: &str, message: &str) {
        self.rejections
            .write()
            .await
            .insert(membership_id.to_string(), message.to_string());
    }

    /// Every member passed to an upsert, in call order.
    pub async fn upserts(&self) -> Vec<Member> {
        self.upserts.read().await.clone()
    }

    /// Number of upsert calls.
    pub async fn upsert_count(&self) -> usize {
        self.upserts.read().await.len()
    }

    /// Stored member, if any.
    pub async fn stored(&self, membership_id: &str) -> Option<Member> {
        self.members.read().await.get(membership_id).cloned()
    }
}

#[async_trait]
impl MembershipProvider for MockMembershipProvider {
    async fn list_members(&self) -> VaultResult<VaultOutcome<Vec<Member>>> {
        let members = self.members.read().await;
        if members.is_empty() {
            return Ok(VaultOutcome::Failure {
                status: StatusCode::NOT_FOUND,
                message: NO_MEMBERSHIPS.to_string(),
            });
        }
        Ok(VaultOutcome::Success(members.values().cloned().collect()))
    }

    async fn get_member(&self, membership_id: &str) -> VaultResult<VaultOutcome<Member>> {
        Ok(match self.members.read().await.get(membership_id) {
            Some(member) => VaultOutcome::Success(member.clone()),
            None => VaultOutcome::Failure {
                status: StatusCode::NOT_FOUND,
                message: format!("Membership {membership_id} not found"),
            },
        })
    }

    async fn upsert_member(&self, member: &Member) -> VaultResult<VaultOutcome<()>> {
        member.payload()?;
        self.upserts.write().await.push(member.clone());

        if let Some(message) = self.rejections.read().await.get(&member.membership_id) {
            return Ok(VaultOutcome::Failure {
                status: StatusCode::BAD_REQUEST,
                message: message.clone(),
            });
        }

        self.members
            .write()
            .await
            .insert(member.membership_id.clone(), member.clone());
        Ok(VaultOutcome::Success(()))
    }
}
