use std::{collections::BTreeMap, str::FromStr};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Identifier of a commit, rendered as `major.minor`.
///
/// How identifiers are generated is up to the repository layer; this type
/// only fixes their shape and ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CommitId {
    pub major: u64,
    pub minor: u32,
}

impl CommitId {
    pub const fn new(major: u64, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl std::fmt::Display for CommitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for CommitId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (major, minor) = s.split_once('.').unwrap_or((s, "0"));
        Ok(Self {
            major: major
                .parse()
                .map_err(|e| format!("invalid commit id `{s}`: {e}"))?,
            minor: minor
                .parse()
                .map_err(|e| format!("invalid commit id `{s}`: {e}"))?,
        })
    }
}

/// Provenance of a durably recorded change.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommitMetadata {
    pub author: String,
    pub properties: BTreeMap<String, String>,
    pub commit_date: NaiveDateTime,
    pub id: CommitId,
}

impl CommitMetadata {
    pub fn new(author: impl Into<String>, commit_date: NaiveDateTime, id: CommitId) -> Self {
        Self {
            author: author.into(),
            properties: BTreeMap::new(),
            commit_date,
            id,
        }
    }

    /// Attach a free-form commit property (e.g. a ticket reference).
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}
