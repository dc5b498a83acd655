//! Driving port for match request mutations.
//!
//! Inbound adapters call this port with an identity already resolved by the
//! identity provider. Each operation runs in its own transaction and reports
//! failures as [`DomainError`] values with a stable code.

use async_trait::async_trait;

use crate::domain::{AuthenticatedUser, CatId, DomainError, MatchId, MatchMessage, MatchRequest};

/// Request to propose a match between two cats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateMatchRequest {
    /// Cat owned by the acting user.
    pub requester_cat: CatId,
    /// Cat the proposal targets.
    pub candidate_cat: CatId,
    /// Validated proposal note.
    pub message: MatchMessage,
}

/// Port for creating, deciding and withdrawing match requests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MatchCommand: Send + Sync {
    /// Propose a match on behalf of `user`.
    ///
    /// # Errors
    ///
    /// `NotFound` when either cat is missing, `Forbidden` when the user does
    /// not own the requester cat, `InvalidOperation` when a pairing rule
    /// rejects the proposal.
    async fn create_match(
        &self,
        user: &AuthenticatedUser,
        request: CreateMatchRequest,
    ) -> Result<MatchRequest, DomainError>;

    /// Approve a waiting request targeting one of the user's cats.
    async fn approve_match(
        &self,
        user: &AuthenticatedUser,
        match_id: MatchId,
    ) -> Result<(), DomainError>;

    /// Reject a waiting request targeting one of the user's cats.
    async fn reject_match(
        &self,
        user: &AuthenticatedUser,
        match_id: MatchId,
    ) -> Result<(), DomainError>;

    /// Withdraw a waiting request the user issued.
    async fn withdraw_match(
        &self,
        user: &AuthenticatedUser,
        match_id: MatchId,
    ) -> Result<(), DomainError>;
}
