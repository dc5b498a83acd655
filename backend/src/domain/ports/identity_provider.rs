//! Port for resolving the acting user of a request.

use async_trait::async_trait;

use crate::domain::AuthenticatedUser;

use super::define_port_error;

define_port_error! {
    /// Errors raised by identity provider adapters.
    pub enum IdentityError {
        /// Directory connection could not be established.
        Connection { message: String } =>
            "identity provider connection failed: {message}",
        /// Lookup failed during execution.
        Query { message: String } =>
            "identity provider query failed: {message}",
    }
}

/// Resolves a caller-supplied identity into an [`AuthenticatedUser`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Look up the registered user with this email.
    async fn resolve(&self, email: &str) -> Result<Option<AuthenticatedUser>, IdentityError>;
}

/// Fixture implementation for tests that never resolve anyone.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureIdentityProvider;

#[async_trait]
impl IdentityProvider for FixtureIdentityProvider {
    async fn resolve(&self, _email: &str) -> Result<Option<AuthenticatedUser>, IdentityError> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn fixture_resolves_nobody() {
        let resolved = FixtureIdentityProvider
            .resolve("owner@example.com")
            .await
            .expect("fixture lookup succeeds");
        assert!(resolved.is_none());
    }

    #[rstest]
    fn connection_error_formats_message() {
        let err = IdentityError::connection("refused");
        assert_eq!(
            err.to_string(),
            "identity provider connection failed: refused"
        );
    }
}
