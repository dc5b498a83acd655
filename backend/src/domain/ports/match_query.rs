//! Driving port for reading a user's match requests.

use async_trait::async_trait;

use crate::domain::{AuthenticatedUser, DomainError, MatchRequestView};

/// Port for listing match requests visible to a user.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MatchQuery: Send + Sync {
    /// Requests the user issued or received, newest first.
    async fn list_matches_for_user(
        &self,
        user: &AuthenticatedUser,
    ) -> Result<Vec<MatchRequestView>, DomainError>;
}
