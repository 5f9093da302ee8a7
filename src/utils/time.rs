//! Serde helpers for message timestamps.
//!
//! Timestamps are written as RFC 3339 strings.  Browser front ends tend to
//! hand back `Date.now()` values, so integer unix milliseconds are accepted
//! on the way in as well.

use serde::{Deserialize, Deserializer, Serializer};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

#[derive(Deserialize)]
#[serde(untagged)]
enum Timestamp {
    Text(String),
    Millis(i64),
}

/// Deserialize an RFC 3339 string or unix milliseconds into an OffsetDateTime
pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    match Timestamp::deserialize(deserializer)? {
        Timestamp::Text(s) => OffsetDateTime::parse(&s, &Rfc3339).map_err(serde::de::Error::custom),
        Timestamp::Millis(ms) => {
            OffsetDateTime::from_unix_timestamp_nanos(i128::from(ms) * 1_000_000)
                .map_err(serde::de::Error::custom)
        }
    }
}

/// Serialize an OffsetDateTime into an RFC 3339 formatted string
pub fn serialize<S>(datetime: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let s = datetime
        .format(&Rfc3339)
        .map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&s)
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use time::OffsetDateTime;
    use time::macros::datetime;

    #[derive(Debug, Serialize, Deserialize)]
    struct Stamped {
        #[serde(with = "super")]
        at: OffsetDateTime,
    }

    #[test]
    fn accepts_rfc3339() {
        let stamped: Stamped = serde_json::from_str(r#"{"at":"2024-03-01T12:30:00Z"}"#).unwrap();
        assert_eq!(stamped.at, datetime!(2024-03-01 12:30:00 UTC));
    }

    #[test]
    fn accepts_unix_millis() {
        let stamped: Stamped = serde_json::from_str(r#"{"at":1709296200000}"#).unwrap();
        assert_eq!(stamped.at, datetime!(2024-03-01 12:30:00 UTC));
    }

    #[test]
    fn writes_rfc3339() {
        let stamped = Stamped {
            at: datetime!(2024-03-01 12:30:00 UTC),
        };
        assert_eq!(
            serde_json::to_string(&stamped).unwrap(),
            r#"{"at":"2024-03-01T12:30:00Z"}"#
        );
    }
}
