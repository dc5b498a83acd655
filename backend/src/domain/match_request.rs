//! Match request aggregate and its value types.
//!
//! A match request proposes pairing the issuer's cat (the requester cat)
//! with another user's cat (the candidate cat). Requests start `waiting` and
//! move once to `approved` or `rejected`; a waiting request may instead be
//! withdrawn, which deletes it.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CatId, UserId};

/// Minimum message length in characters.
pub const MATCH_MESSAGE_MIN: usize = 5;
/// Maximum message length in characters.
pub const MATCH_MESSAGE_MAX: usize = 120;

/// Identifier of a match request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(Uuid);

impl MatchId {
    /// Parse a match identifier from its textual UUID form.
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

impl From<Uuid> for MatchId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Persisted lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    /// Proposed and awaiting the candidate owner's decision.
    Waiting,
    /// Accepted; both cats are now matched.
    Approved,
    /// Declined by the candidate owner.
    Rejected,
}

impl MatchStatus {
    /// Storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Whether the status still accepts a decision or withdrawal.
    pub fn is_waiting(self) -> bool {
        matches!(self, Self::Waiting)
    }

    /// Whether `next` is a legal transition from this status.
    ///
    /// # Examples
    /// ```
    /// use cats_social::domain::MatchStatus;
    ///
    /// assert!(MatchStatus::Waiting.can_transition_to(MatchStatus::Approved));
    /// assert!(!MatchStatus::Rejected.can_transition_to(MatchStatus::Approved));
    /// ```
    pub fn can_transition_to(self, next: Self) -> bool {
        self.is_waiting() && !next.is_waiting()
    }
}

/// Error returned when a stored status value is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown match status: {0}")]
pub struct UnknownMatchStatus(pub String);

impl FromStr for MatchStatus {
    type Err = UnknownMatchStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "waiting" => Ok(Self::Waiting),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(UnknownMatchStatus(other.to_owned())),
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation errors for [`MatchMessage`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchMessageValidationError {
    /// Fewer than [`MATCH_MESSAGE_MIN`] characters.
    #[error("message must be at least {min} characters")]
    TooShort {
        /// Lower bound.
        min: usize,
    },
    /// More than [`MATCH_MESSAGE_MAX`] characters.
    #[error("message must be at most {max} characters")]
    TooLong {
        /// Upper bound.
        max: usize,
    },
}

/// Free-text note attached to a proposal, 5 to 120 characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MatchMessage(String);

impl MatchMessage {
    /// Validate and construct a message.
    ///
    /// Length is measured in Unicode scalar values.
    pub fn new(message: impl Into<String>) -> Result<Self, MatchMessageValidationError> {
        let message = message.into();
        let length = message.chars().count();
        if length < MATCH_MESSAGE_MIN {
            return Err(MatchMessageValidationError::TooShort {
                min: MATCH_MESSAGE_MIN,
            });
        }
        if length > MATCH_MESSAGE_MAX {
            return Err(MatchMessageValidationError::TooLong {
                max: MATCH_MESSAGE_MAX,
            });
        }
        Ok(Self(message))
    }
}

impl AsRef<str> for MatchMessage {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for MatchMessage {
    type Error = MatchMessageValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MatchMessage> for String {
    fn from(value: MatchMessage) -> Self {
        value.0
    }
}

/// A persisted match request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRequest {
    /// Request identifier.
    pub id: MatchId,
    /// Creation timestamp; never changes.
    pub created_at: DateTime<Utc>,
    /// Owner of the requester cat who proposed the match.
    pub issuer: UserId,
    /// Cat proposed on behalf of the issuer.
    pub requester_cat: CatId,
    /// Cat being proposed to.
    pub candidate_cat: CatId,
    /// Proposal note.
    pub message: MatchMessage,
    /// Current lifecycle status.
    pub status: MatchStatus,
}

impl MatchRequest {
    /// Build a fresh `waiting` request.
    pub fn propose(
        id: MatchId,
        created_at: DateTime<Utc>,
        issuer: UserId,
        requester_cat: CatId,
        candidate_cat: CatId,
        message: MatchMessage,
    ) -> Self {
        Self {
            id,
            created_at,
            issuer,
            requester_cat,
            candidate_cat,
            message,
            status: MatchStatus::Waiting,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(4, false)]
    #[case(5, true)]
    #[case(120, true)]
    #[case(121, false)]
    fn message_length_boundaries(#[case] length: usize, #[case] valid: bool) {
        let raw = "a".repeat(length);
        assert_eq!(MatchMessage::new(raw).is_ok(), valid);
    }

    #[rstest]
    fn message_counts_characters_not_bytes() {
        let raw = "é".repeat(MATCH_MESSAGE_MAX);
        assert!(MatchMessage::new(raw).is_ok());
    }

    #[rstest]
    fn short_message_reports_bound() {
        let error = MatchMessage::new("hey").expect_err("too short");
        assert_eq!(error, MatchMessageValidationError::TooShort { min: 5 });
        assert_eq!(error.to_string(), "message must be at least 5 characters");
    }

    #[rstest]
    #[case(MatchStatus::Waiting, MatchStatus::Approved, true)]
    #[case(MatchStatus::Waiting, MatchStatus::Rejected, true)]
    #[case(MatchStatus::Waiting, MatchStatus::Waiting, false)]
    #[case(MatchStatus::Approved, MatchStatus::Rejected, false)]
    #[case(MatchStatus::Rejected, MatchStatus::Approved, false)]
    #[case(MatchStatus::Approved, MatchStatus::Waiting, false)]
    fn transitions_are_one_way(
        #[case] from: MatchStatus,
        #[case] to: MatchStatus,
        #[case] allowed: bool,
    ) {
        assert_eq!(from.can_transition_to(to), allowed);
    }

    #[rstest]
    fn status_parses_storage_values() {
        for status in [
            MatchStatus::Waiting,
            MatchStatus::Approved,
            MatchStatus::Rejected,
        ] {
            assert_eq!(status.as_str().parse::<MatchStatus>(), Ok(status));
        }
        assert!("pending".parse::<MatchStatus>().is_err());
    }

    #[rstest]
    fn propose_starts_waiting() {
        let request = MatchRequest::propose(
            MatchId::random(),
            Utc::now(),
            UserId::random(),
            CatId::random(),
            CatId::random(),
            MatchMessage::new("hi there!!").expect("valid message"),
        );
        assert_eq!(request.status, MatchStatus::Waiting);
    }
}
