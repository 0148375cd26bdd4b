use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a record held by the external store.
///
/// Older records carry human-readable slugs instead of UUIDs. The variant is
/// explicit on the wire so callers never have to guess the format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RecordId {
    Uuid(Uuid),
    LegacySlug(String),
}

impl RecordId {
    pub fn new_uuid() -> Self {
        RecordId::Uuid(Uuid::new_v4())
    }

    pub fn slug(slug: impl Into<String>) -> Self {
        RecordId::LegacySlug(slug.into())
    }
}

impl From<Uuid> for RecordId {
    fn from(id: Uuid) -> Self {
        RecordId::Uuid(id)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Uuid(id) => write!(f, "{}", id),
            RecordId::LegacySlug(slug) => write!(f, "{}", slug),
        }
    }
}
