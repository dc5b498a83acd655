//! Cat records as exposed by the cat catalog.
//!
//! The match engine never creates or edits cats. It reads the eligibility
//! fields captured by [`CatRecord`] and, on approval, flips `has_matched`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserId;

/// Opaque cat identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatId(Uuid);

impl CatId {
    /// Parse a cat identifier from its textual UUID form.
    pub fn parse(raw: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(raw.trim()).map(Self)
    }

    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for CatId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for CatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Biological sex of a cat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatSex {
    /// Male cat.
    Male,
    /// Female cat.
    Female,
}

impl CatSex {
    /// Storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }
}

/// Error returned when a stored sex value is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown cat sex: {0}")]
pub struct UnknownCatSex(pub String);

impl FromStr for CatSex {
    type Err = UnknownCatSex;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            other => Err(UnknownCatSex(other.to_owned())),
        }
    }
}

impl fmt::Display for CatSex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Eligibility view of a cat: the fields match rules depend on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatRecord {
    /// Cat identifier.
    pub id: CatId,
    /// Owning user.
    pub owner: UserId,
    /// Biological sex.
    pub sex: CatSex,
    /// Whether any match involving this cat was approved.
    pub has_matched: bool,
    /// Whether the catalog soft-deleted the cat.
    pub soft_deleted: bool,
}

impl CatRecord {
    /// A cat that exists and has not been soft-deleted.
    pub fn is_live(&self) -> bool {
        !self.soft_deleted
    }
}

/// Display fields of a cat joined into match listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatProfile {
    /// Cat identifier.
    pub id: CatId,
    /// Display name.
    pub name: String,
    /// Breed.
    pub race: String,
    /// Biological sex.
    pub sex: CatSex,
    /// Age in months.
    pub age_in_month: i32,
    /// Free-text description.
    pub description: String,
    /// Picture URLs.
    pub image_urls: Vec<String>,
    /// Whether the cat is already matched.
    pub has_matched: bool,
    /// Catalog creation timestamp.
    pub created_at: DateTime<Utc>,
}
