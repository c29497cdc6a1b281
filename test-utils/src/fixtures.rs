//! Test fixtures with sample data.

use chrono::{FixedOffset, TimeZone};
use mvault::Member;
use mvault::member::{STATUS_OFF, STATUS_ON};
use serde_json::{Map, Value, json};

/// Header row of a station membership export.
pub const EXPORT_HEADER: &str =
    "First Name\tLast Name\tOffer\tMembership ID\tStart Date\tExpire Date\tEmail";

/// Field mapping for the sample member, without dates.
#[must_use]
pub fn sample_mapping() -> Map<String, Value> {
    let value = json!({
        "membership_id": "000001",
        "first_name": "Mary",
        "last_name": "Member",
        "email": "mmember@pbs.org",
        "offer": "123",
        "status": STATUS_OFF,
    });
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// The sample member, running for 2024 in Pacific standard time.
#[must_use]
pub fn sample_member() -> Member {
    let mut member = Member::from_mapping(&sample_mapping()).unwrap_or_default();
    let pacific = FixedOffset::west_opt(8 * 3600);
    if let Some(pacific) = pacific {
        member.start_date = pacific.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single();
        member.expire_date = pacific.with_ymd_and_hms(2024, 12, 31, 0, 0, 0).single();
    }
    member
}

/// A member object as the Vault returns it from a get.
#[must_use]
pub fn vault_member_json(membership_id: &str) -> Value {
    json!({
        "membership_id": membership_id,
        "first_name": "Mary",
        "last_name": "Member",
        "email": "mmember@pbs.org",
        "offer": "123",
        "notes": "",
        "additional_metadata": "",
        "status": STATUS_ON,
        "provisional": false,
        "start_date": "2024-01-01T08:00:00Z",
        "expire_date": "2024-12-31T08:00:00Z",
        "create_date": "2024-01-02T17:30:12Z",
        "update_date": "2024-01-02T17:30:12Z",
        "activation_date": null,
    })
}

/// An export file with a header and the given data rows, tab-delimited.
#[must_use]
pub fn export_file<S: AsRef<str>>(rows: &[[S; 7]]) -> String {
    let mut out = String::from(EXPORT_HEADER);
    out.push('\n');
    for row in rows {
        let fields: Vec<&str> = row.iter().map(AsRef::as_ref).collect();
        out.push_str(&fields.join("\t"));
        out.push('\n');
    }
    out
}

/// The single data row of the canonical two-line export.
pub const MARY_ROW: [&str; 7] = [
    "Mary",
    "Member",
    "123",
    "000001",
    "01/01/2024",
    "12/31/2024",
    "m@x.org",
];
