use chrono::{SecondsFormat, Utc};

/// Current UTC time as an RFC 3339 string with microsecond precision.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}
