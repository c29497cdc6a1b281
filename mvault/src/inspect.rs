//! Output of the `mvault` inspection command.

use crate::{error::VaultError, provider::MembershipProvider, response::VaultOutcome};
use reqwest::StatusCode;
use std::io::{self, Write};
use thiserror::Error;

/// Inspection errors.
#[derive(Error, Debug)]
pub enum InspectError {
    /// Request to the provider failed
    #[error(transparent)]
    Vault(#[from] VaultError),

    /// Output could not be written
    #[error("Failed to write output: {0}")]
    Io(#[from] io::Error),

    /// Member could not be rendered as JSON
    #[error("Failed to render member: {0}")]
    Render(#[from] serde_json::Error),

    /// The Vault has no such member or refused the lookup
    #[error("Member {membership_id} not available ({status}): {message}")]
    Unavailable {
        /// Requested ID
        membership_id: String,
        /// HTTP status
        status: StatusCode,
        /// Vault error message
        message: String,
    },
}

/// Write one `First Last (ID)` line per member.
///
/// A failed listing, such as a station with no members, writes the Vault's
/// message instead. Returns the number of members written.
///
/// # Errors
///
/// Returns an error on transport failure or if `out` cannot be written.
pub async fn list_members<P>(provider: &P, out: &mut impl Write) -> Result<usize, InspectError>
where
    P: MembershipProvider + ?Sized,
{
    match provider.list_members().await? {
        VaultOutcome::Success(members) => {
            for member in &members {
                writeln!(out, "{member}")?;
            }
            Ok(members.len())
        }
        VaultOutcome::Failure { message, .. } => {
            writeln!(out, "{message}")?;
            Ok(0)
        }
    }
}

/// Write one member as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`InspectError::Unavailable`] if the Vault reports an error for
/// the ID, or an error on transport or write failure.
pub async fn show_member<P>(
    provider: &P,
    membership_id: &str,
    out: &mut impl Write,
) -> Result<(), InspectError>
where
    P: MembershipProvider + ?Sized,
{
    match provider.get_member(membership_id).await? {
        VaultOutcome::Success(member) => {
            serde_json::to_writer_pretty(&mut *out, &member)?;
            writeln!(out)?;
            Ok(())
        }
        VaultOutcome::Failure { status, message } => Err(InspectError::Unavailable {
            membership_id: membership_id.to_string(),
            status,
            message,
        }),
    }
}
