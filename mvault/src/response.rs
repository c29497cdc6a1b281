//! Interpretation of Vault response envelopes.
//!
//! The Vault answers with `{"objects": [...]}` for a list, a bare object for a
//! single record, and `{"errors": "..."}` on failure. Status codes are not
//! always consistent with the envelope, so both are checked.

use crate::error::VaultResult;
use crate::member::Member;
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Result of a call the Vault answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VaultOutcome<T> {
    /// The Vault accepted the request
    Success(T),
    /// The Vault reported an error
    Failure {
        /// HTTP status of the response
        status: StatusCode,
        /// `errors` message, or the body text when there is none
        message: String,
    },
}

impl<T> VaultOutcome<T> {
    /// Check if the Vault accepted the request.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The success value, if any.
    #[must_use]
    pub fn success(self) -> Option<T> {
        match self {
            Self::Success(value) => Some(value),
            Self::Failure { .. } => None,
        }
    }

    /// Map the success value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> VaultOutcome<U> {
        match self {
            Self::Success(value) => VaultOutcome::Success(f(value)),
            Self::Failure { status, message } => VaultOutcome::Failure { status, message },
        }
    }

    /// Fallibly map the success value; failures pass through untouched.
    ///
    /// # Errors
    ///
    /// Returns whatever `f` returns.
    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<VaultOutcome<U>, E> {
        match self {
            Self::Success(value) => f(value).map(VaultOutcome::Success),
            Self::Failure { status, message } => Ok(VaultOutcome::Failure { status, message }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ListEnvelope {
    objects: Vec<Map<String, Value>>,
}

/// Split a response body into success or failure.
///
/// A body that is not JSON is a success when the status is 2xx; its value is
/// `Value::Null` in that case.
pub(crate) fn classify(status: StatusCode, body: &str) -> VaultOutcome<Value> {
    let json = serde_json::from_str::<Value>(body).ok();

    if let Some(errors) = json.as_ref().and_then(|v| v.get("errors")) {
        let message = match errors {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return VaultOutcome::Failure { status, message };
    }

    if !status.is_success() {
        let message = if body.trim().is_empty() {
            status.canonical_reason().unwrap_or_default().to_string()
        } else {
            body.trim().to_string()
        };
        return VaultOutcome::Failure { status, message };
    }

    VaultOutcome::Success(json.unwrap_or(Value::Null))
}

/// Read a response body and classify it.
pub(crate) async fn read_outcome(response: Response) -> VaultResult<VaultOutcome<Value>> {
    let status = response.status();
    let body = response.text().await?;
    Ok(classify(status, &body))
}

/// Members from a list envelope.
pub(crate) fn members_from_list(body: Value) -> VaultResult<Vec<Member>> {
    let envelope: ListEnvelope = serde_json::from_value(body)?;
    envelope
        .objects
        .iter()
        .map(|object| Member::from_mapping(object).map_err(Into::into))
        .collect()
}

/// Member from a single-record body.
pub(crate) fn member_from_object(body: Value) -> VaultResult<Member> {
    let object: Map<String, Value> = serde_json::from_value(body)?;
    Ok(Member::from_mapping(&object)?)
}
