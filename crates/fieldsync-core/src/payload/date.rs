//! Server timestamps
//!
//! The server writes timestamps either with an offset (`2016-04-06T00:05:57.495+0000`,
//! RFC 3339) or without one (`2015-02-10T15:20:07.545`); zone-less values are UTC.
//! Absent, `null` or unparseable values decode to `None`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serializer};

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

pub fn parse(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(parsed.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|parsed| parsed.and_utc())
}

pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(value) => serializer.serialize_str(&value.format("%Y-%m-%dT%H:%M:%S%.3f").to_string()),
        None => serializer.serialize_none(),
    }
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_server_formats() {
        let expected = Utc.with_ymd_and_hms(2015, 2, 10, 15, 20, 7).unwrap()
            + chrono::Duration::milliseconds(545);
        assert_eq!(parse("2015-02-10T15:20:07.545"), Some(expected));
        assert_eq!(parse("2015-02-10T15:20:07.545Z"), Some(expected));
        assert_eq!(parse("2015-02-10T16:20:07.545+0100"), Some(expected));
    }

    #[test]
    fn date_only_is_midnight_utc() {
        assert_eq!(
            parse("2017-01-20"),
            Some(Utc.with_ymd_and_hms(2017, 1, 20, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn garbage_is_none() {
        assert_eq!(parse(""), None);
        assert_eq!(parse("yesterday"), None);
    }
}
