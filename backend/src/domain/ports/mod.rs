//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod identity_provider;
mod match_command;
mod match_query;
mod match_store;

#[cfg(test)]
pub use identity_provider::MockIdentityProvider;
pub use identity_provider::{FixtureIdentityProvider, IdentityError, IdentityProvider};
#[cfg(test)]
pub use match_command::MockMatchCommand;
pub use match_command::{CreateMatchRequest, MatchCommand};
#[cfg(test)]
pub use match_query::MockMatchQuery;
pub use match_query::MatchQuery;
#[cfg(test)]
pub use match_store::{MockCatCatalog, MockMatchRepository};
pub use match_store::{
    ApprovalOutcome, CatCatalog, MatchListing, MatchRepository, MatchStore, MatchStoreError,
    MatchTransaction, TxFuture,
};
