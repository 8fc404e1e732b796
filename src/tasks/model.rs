//! Task entity and identifier types.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// Unique task identifier, assigned once at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(u64);

impl TaskId {
    /// Wrap a raw identifier.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw numeric value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

/// A to-do item.
///
/// Only `completed` ever changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub completed: bool,
    #[serde(serialize_with = "serialize_millis")]
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub(crate) fn new(id: TaskId, title: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title,
            completed: false,
            created_at,
        }
    }
}

/// ISO-8601 with millisecond precision and a `Z` suffix.
fn serialize_millis<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
}
