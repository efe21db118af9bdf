//! Remote catalog identities

use serde::{Deserialize, Serialize};

/// Platform as listed by the catalog server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemotePlatform {
    pub id: i64,
    pub slug: String,
    #[serde(default)]
    pub name: String,
}

/// ROM as listed by the catalog server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRom {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    /// Hex SHA-1 of the ROM file; joins against [`crate::LocalRom::hash`].
    #[serde(rename = "sha1_hash", default)]
    pub content_hash: String,
    #[serde(default)]
    pub platform_id: i64,
}

impl RemoteRom {
    /// Whether this entry's hash equals a locally computed one.
    ///
    /// Empty hashes never match; a ROM that failed to hash stays unresolved.
    pub fn matches_hash(&self, local_hash: &str) -> bool {
        !local_hash.is_empty() && self.content_hash.eq_ignore_ascii_case(local_hash)
    }

    pub fn to_ref(&self) -> RemoteRomRef {
        RemoteRomRef {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

/// Server-side identity attached to a local ROM once matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRomRef {
    pub id: i64,
    pub name: String,
}
