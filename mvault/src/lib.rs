//! Client and ingest tool for the PBS Membership Vault.
//!
//! [`Member`] models a station membership record and renders the Vault's JSON
//! payload. [`VaultClient`] issues the authenticated list, get and
//! create-or-update calls. [`ingest`] replays tab-delimited membership exports
//! as upserts. [`inspect`] renders listings and lookups for the CLI.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod ingest;
pub mod inspect;
pub mod member;
pub mod provider;
pub mod response;
pub mod tracing_config;

pub use client::VaultClient;
pub use config::VaultConfig;
pub use error::{MemberError, VaultError, VaultResult};
pub use ingest::{FailurePolicy, IngestError, IngestOptions, IngestReport};
pub use member::{Member, format_timestamp};
pub use provider::MembershipProvider;
pub use response::VaultOutcome;
