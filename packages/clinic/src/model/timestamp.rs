use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

///
/// Accepts RFC 3339 timestamps, naive `YYYY-MM-DDTHH:MM:SS` (taken as UTC)
/// and plain dates (midnight UTC), which is what browser date inputs send.
///
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }

    if let Ok(ts) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(ts.and_utc());
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|ts| ts.and_utc())
        .ok_or_else(|| format!("invalid date `{value}`"))
}

pub(crate) fn optional<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    value
        .map(|s| parse_timestamp(&s).map_err(serde::de::Error::custom))
        .transpose()
}

pub(crate) fn nullable<'de, D>(deserializer: D) -> Result<Option<Option<DateTime<Utc>>>, D::Error>
where
    D: Deserializer<'de>,
{
    optional(deserializer).map(Some)
}
