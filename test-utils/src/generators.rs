//! Shared proptest generators for membership data.

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use proptest::prelude::*;
use mvault::member::{STATUS_OFF, STATUS_ON};
use serde_json::{Map, Value};

/// Generate membership IDs as stations assign them.
pub fn membership_id_strategy() -> impl Strategy<Value = String> {
    prop_oneof!["[0-9]{6}", "[A-Z]{2}[0-9]{4,8}", "[a-z0-9-]{8,24}"]
}

/// Generate printable names, including non-ASCII ones.
pub fn name_strategy() -> impl Strategy<Value = String> {
    prop_oneof!["[A-Z][a-z]{1,15}", "[A-Z][a-z]{1,8}-[A-Z][a-z]{1,8}", "\\PC{1,20}"]
}

/// Generate email addresses.
pub fn email_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9._%+-]{1,12}@[a-z0-9-]{2,10}\\.[a-z]{2,4}"
}

/// Generate membership statuses.
pub fn status_strategy() -> impl Strategy<Value = String> {
    prop_oneof![Just(STATUS_ON.to_string()), Just(STATUS_OFF.to_string())]
}

/// Generate UTC offsets within the real-world range.
pub fn offset_strategy() -> impl Strategy<Value = FixedOffset> {
    (-12i32 * 4..=14 * 4).prop_filter_map("valid offset", |quarters| {
        FixedOffset::east_opt(quarters * 15 * 60)
    })
}

/// Generate timezone-aware timestamps between 1970 and 2100 with
/// sub-second precision.
pub fn timestamp_strategy() -> impl Strategy<Value = DateTime<FixedOffset>> {
    (0i64..4_102_444_800, 0u32..1_000_000_000, offset_strategy()).prop_filter_map(
        "representable timestamp",
        |(secs, nanos, offset)| {
            Utc.timestamp_opt(secs, nanos)
                .single()
                .map(|utc| utc.with_timezone(&offset))
        },
    )
}

/// Generate field mappings the way the Vault returns them: any subset of the
/// recognized fields with correctly typed values, plus unrecognized keys.
pub fn member_mapping_strategy() -> impl Strategy<Value = Map<String, Value>> {
    (
        proptest::option::of(membership_id_strategy()),
        proptest::option::of(name_strategy()),
        proptest::option::of(name_strategy()),
        proptest::option::of(email_strategy()),
        proptest::option::of("[0-9]{1,5}"),
        proptest::option::of(status_strategy()),
        proptest::option::of(any::<bool>()),
        proptest::option::of(timestamp_strategy()),
        proptest::option::of(timestamp_strategy()),
        proptest::option::of(timestamp_strategy()),
        proptest::option::of("x_[a-z_]{3,12}"),
    )
        .prop_map(
            |(id, first, last, email, offer, status, provisional, start, expire, created, extra)| {
                let mut map = Map::new();
                let mut put = |key: &str, value: Option<Value>| {
                    if let Some(value) = value {
                        map.insert(key.to_string(), value);
                    }
                };
                put("membership_id", id.map(Value::String));
                put("first_name", first.map(Value::String));
                put("last_name", last.map(Value::String));
                put("email", email.map(Value::String));
                put("offer", offer.map(Value::String));
                put("status", status.map(Value::String));
                put("provisional", provisional.map(Value::Bool));
                put("start_date", start.map(|d| Value::String(d.to_rfc3339())));
                put("expire_date", expire.map(|d| Value::String(d.to_rfc3339())));
                put("create_date", created.map(|d| Value::String(d.to_rfc3339())));
                if let Some(extra) = extra {
                    map.entry(extra).or_insert(Value::from(42));
                }
                map
            },
        )
}
