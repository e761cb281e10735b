// Identifier value objects

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Primary key of the alert table: `<user_id>@<utc timestamp>`.
///
/// The timestamp is rendered as RFC 3339 in UTC with a `Z` suffix and the
/// minimal number of sub-second digits, so the same instant supplied with
/// different offsets always produces the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertId(pub String);

impl AlertId {
    pub fn derive(user_id: &str, timestamp: &DateTime<Utc>) -> Self {
        Self(format!(
            "{}@{}",
            user_id.trim(),
            timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AlertId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
