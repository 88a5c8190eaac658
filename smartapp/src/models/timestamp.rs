//! Lifecycle timestamps
//!
//! The platform documents timestamps with millisecond precision, but real
//! traffic also arrives with whole seconds, and some devices report the
//! UNIX epoch when they have no time at all. The epoch is read as "no
//! timestamp provided" and replaced with the current time.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

const MS_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";
const SEC_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

const MS_EPOCH: &str = "1970-01-01T00:00:00.000Z";
const SEC_EPOCH: &str = "1970-01-01T00:00:00Z";

const MS_LEN: usize = "YYYY-MM-DDTHH:MM:SS.SSSZ".len();
const SEC_LEN: usize = "YYYY-MM-DDTHH:MM:SSZ".len();

/// A UTC instant as carried in lifecycle JSON, held at millisecond
/// precision so it survives a trip through the wire format
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn new(datetime: DateTime<Utc>) -> Self {
        Self(datetime.trunc_subsecs(3))
    }

    pub fn now() -> Self {
        Self::new(Utc::now())
    }

    pub fn datetime(&self) -> DateTime<Utc> {
        self.0
    }

    /// Parse one of the accepted wire forms
    pub fn parse(value: &str) -> Result<Self, String> {
        if value == MS_EPOCH || value == SEC_EPOCH {
            return Ok(Self::now());
        }

        let format = match value.len() {
            MS_LEN => MS_FORMAT,
            SEC_LEN => SEC_FORMAT,
            _ => return Err(format!("Unknown datetime format: {}", value)),
        };

        NaiveDateTime::parse_from_str(value, format)
            .map(|naive| Self::new(naive.and_utc()))
            .map_err(|e| format!("Invalid datetime {}: {}", value, e))
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(datetime: DateTime<Utc>) -> Self {
        Self::new(datetime)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(MS_FORMAT))
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Timestamp::parse(&s).map_err(serde::de::Error::custom)
    }
}
