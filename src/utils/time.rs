//! RFC 3339 timestamps.
//!
//! Message timestamps travel as RFC 3339 strings in transcripts.  Use this
//! module with `#[serde(with = "crate::utils::time")]`.

use serde::{Deserialize, Deserializer, Serializer};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Deserialize an RFC 3339 formatted string into an OffsetDateTime
pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse(&s).map_err(serde::de::Error::custom)
}

/// Serialize an OffsetDateTime into an RFC 3339 formatted string
pub fn serialize<S>(datetime: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let s = format(datetime).map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&s)
}

/// Parse an RFC 3339 string.
pub fn parse(s: &str) -> Result<OffsetDateTime, time::error::Parse> {
    OffsetDateTime::parse(s, &Rfc3339)
}

/// Format an instant as RFC 3339.
pub fn format(datetime: &OffsetDateTime) -> Result<String, time::error::Format> {
    datetime.format(&Rfc3339)
}

/// Format an instant for use inside a file name.
///
/// The RFC 3339 form with every `:` and `.` replaced by `-`, so
/// `2025-01-30T14:05:09.123Z` becomes `2025-01-30T14-05-09-123Z`.
pub fn file_stamp(datetime: &OffsetDateTime) -> Result<String, time::error::Format> {
    Ok(format(datetime)?.replace([':', '.'], "-"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn format_and_parse_agree() {
        let instant = datetime!(2025-01-30 14:05:09.123 UTC);
        let text = format(&instant).unwrap();
        assert_eq!(text, "2025-01-30T14:05:09.123Z");
        assert_eq!(parse(&text).unwrap(), instant);
    }

    #[test]
    fn file_stamp_replaces_separators() {
        let instant = datetime!(2025-01-30 14:05:09.123 UTC);
        assert_eq!(file_stamp(&instant).unwrap(), "2025-01-30T14-05-09-123Z");
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse("yesterday").is_err());
    }
}
