//! Point-in-time leaf value.

use std::fmt;

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};

/// A point in time with millisecond resolution. `None` marks an invalid date.
#[derive(Debug, Clone, PartialEq)]
pub struct Temporal {
    instant: Option<DateTime<Utc>>,
}

impl Temporal {
    pub fn from_millis(epoch_millis: i64) -> Self {
        Temporal {
            instant: Utc.timestamp_millis_opt(epoch_millis).single(),
        }
    }

    pub fn from_datetime(instant: DateTime<Utc>) -> Self {
        Temporal::from_millis(instant.timestamp_millis())
    }

    pub fn invalid() -> Self {
        Temporal { instant: None }
    }

    /// Parses an RFC 3339 string, yielding an invalid temporal on failure.
    pub fn parse(text: &str) -> Self {
        match DateTime::parse_from_rfc3339(text) {
            Ok(instant) => Temporal::from_datetime(instant.with_timezone(&Utc)),
            Err(_) => Temporal::invalid(),
        }
    }

    /// Milliseconds since the unix epoch, `None` when invalid.
    pub fn get_time(&self) -> Option<i64> {
        self.instant.map(|i| i.timestamp_millis())
    }

    pub fn set_time(&mut self, epoch_millis: Option<i64>) {
        self.instant = epoch_millis.and_then(|ms| Utc.timestamp_millis_opt(ms).single());
    }

    pub fn is_valid(&self) -> bool {
        self.instant.is_some()
    }

    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        self.instant
    }

    pub fn to_iso_string(&self) -> Option<String> {
        self.instant
            .map(|i| i.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}

impl fmt::Display for Temporal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_iso_string() {
            Some(s) => write!(f, "{}", s),
            None => write!(f, "Invalid Date"),
        }
    }
}
