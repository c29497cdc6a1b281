//! Membership record model and its Vault wire format.

use crate::error::MemberError;
use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::fmt;

/// Status of an active membership.
pub const STATUS_ON: &str = "On";
/// Status of a lapsed or disabled membership.
pub const STATUS_OFF: &str = "Off";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// A station membership record in the Membership Vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Member {
    /// Set by the Vault, read-only
    pub create_date: Option<DateTime<FixedOffset>>,
    /// Set by the Vault, read-only
    pub update_date: Option<DateTime<FixedOffset>>,
    /// Set by the Vault, read-only
    pub activation_date: Option<DateTime<FixedOffset>>,
    /// When the membership starts
    pub start_date: Option<DateTime<FixedOffset>>,
    /// When the membership expires
    pub expire_date: Option<DateTime<FixedOffset>>,

    /// Station-assigned member identifier
    pub membership_id: String,
    /// Station-defined offer identifier
    pub offer: String,
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Email address
    pub email: String,
    /// Free-form notes about the membership
    pub notes: String,
    /// Station metadata
    pub additional_metadata: String,
    /// `On` or `Off`
    pub status: String,
    /// Temporary access pending verification
    pub provisional: bool,
}

impl Default for Member {
    fn default() -> Self {
        Self {
            create_date: None,
            update_date: None,
            activation_date: None,
            start_date: None,
            expire_date: None,
            membership_id: String::new(),
            offer: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            notes: String::new(),
            additional_metadata: String::new(),
            status: STATUS_ON.to_string(),
            provisional: false,
        }
    }
}

impl Member {
    /// Build a member from a field mapping, defaulting every absent field.
    ///
    /// # Errors
    ///
    /// Returns an error if a recognized field holds a value of the wrong type.
    pub fn from_mapping(source: &Map<String, Value>) -> Result<Self, MemberError> {
        let mut member = Self::default();
        member.parse(source)?;
        Ok(member)
    }

    /// Overwrite every recognized field from `source`.
    ///
    /// Absent and `null` values take the field default. Unrecognized keys are
    /// ignored. Date fields must be RFC 3339 strings carrying an offset.
    ///
    /// # Errors
    ///
    /// Returns the first field that fails to convert. Fields before it have
    /// already been overwritten.
    pub fn parse(&mut self, source: &Map<String, Value>) -> Result<(), MemberError> {
        self.create_date = fetch_timestamp(source, "create_date")?;
        self.update_date = fetch_timestamp(source, "update_date")?;
        self.activation_date = fetch_timestamp(source, "activation_date")?;
        self.start_date = fetch_timestamp(source, "start_date")?;
        self.expire_date = fetch_timestamp(source, "expire_date")?;

        self.membership_id = fetch_string(source, "membership_id", "")?;
        self.offer = fetch_string(source, "offer", "")?;
        self.first_name = fetch_string(source, "first_name", "")?;
        self.last_name = fetch_string(source, "last_name", "")?;
        self.email = fetch_string(source, "email", "")?;
        self.notes = fetch_string(source, "notes", "")?;
        self.additional_metadata = fetch_string(source, "additional_metadata", "")?;
        self.status = fetch_string(source, "status", STATUS_ON)?;
        self.provisional = fetch_bool(source, "provisional", false)?;
        Ok(())
    }

    /// Render the JSON body for a create-or-update request.
    ///
    /// `membership_id` travels in the URL and the read-only dates are never
    /// written, so neither appears here.
    ///
    /// # Errors
    ///
    /// Returns [`MemberError::MissingField`] if `start_date` or `expire_date`
    /// is unset.
    pub fn payload(&self) -> Result<String, MemberError> {
        let start_date = self
            .start_date
            .as_ref()
            .ok_or(MemberError::MissingField("start_date"))?;
        let expire_date = self
            .expire_date
            .as_ref()
            .ok_or(MemberError::MissingField("expire_date"))?;

        let body = json!({
            "offer": self.offer,
            "first_name": self.first_name,
            "last_name": self.last_name,
            "email": self.email,
            "notes": self.notes,
            "additional_metadata": self.additional_metadata,
            "status": self.status,
            "provisional": self.provisional,
            "start_date": format_timestamp(start_date),
            "expire_date": format_timestamp(expire_date),
        });

        Ok(body.to_string())
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({})",
            self.first_name, self.last_name, self.membership_id
        )
    }
}

/// Render a timestamp the way the Vault expects: UTC, whole seconds, `Z`.
///
/// Sub-second precision is truncated, never rounded.
#[must_use]
pub fn format_timestamp<Tz: TimeZone>(date: &DateTime<Tz>) -> String {
    date.with_timezone(&Utc).format(TIMESTAMP_FORMAT).to_string()
}

fn fetch_string(
    source: &Map<String, Value>,
    field: &'static str,
    default: &str,
) -> Result<String, MemberError> {
    match source.get(field) {
        None | Some(Value::Null) => Ok(default.to_string()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(MemberError::InvalidType {
            field,
            expected: "a string",
        }),
    }
}

fn fetch_bool(
    source: &Map<String, Value>,
    field: &'static str,
    default: bool,
) -> Result<bool, MemberError> {
    match source.get(field) {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Bool(b)) => Ok(*b),
        Some(_) => Err(MemberError::InvalidType {
            field,
            expected: "a boolean",
        }),
    }
}

fn fetch_timestamp(
    source: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<DateTime<FixedOffset>>, MemberError> {
    match source.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => DateTime::parse_from_rfc3339(s)
            .map(Some)
            .map_err(|_| MemberError::InvalidTimestamp {
                field,
                value: s.clone(),
            }),
        Some(_) => Err(MemberError::InvalidType {
            field,
            expected: "an RFC 3339 string",
        }),
    }
}
