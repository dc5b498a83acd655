//! Ports for transactional match persistence and cat catalog access.
//!
//! Every lifecycle operation runs inside one [`MatchStore::transaction`]
//! scope. The closure receives a [`MatchTransaction`] handle combining the
//! cat catalog reads/writes and the match repository gateway; all reads go
//! through the handle so guard decisions observe the same transaction as the
//! writes that follow them. Returning `Err` from the closure rolls the whole
//! scope back.

use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;

use crate::domain::{
    CatId, CatProfile, CatRecord, DomainError, IssuerProfile, MatchId, MatchRequest, MatchStatus,
    UserId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by match store adapters.
    pub enum MatchStoreError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "match store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "match store query failed: {message}",
    }
}

/// Boxed future returned by transactional work.
pub type TxFuture<'t, T> = Pin<Box<dyn Future<Output = Result<T, DomainError>> + Send + 't>>;

/// A match request joined with the display fields of both cats and the
/// issuer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchListing {
    /// The request itself.
    pub request: MatchRequest,
    /// Cat proposed on behalf of the issuer.
    pub requester_cat: CatProfile,
    /// Cat being proposed to.
    pub candidate_cat: CatProfile,
    /// User who issued the request.
    pub issuer: IssuerProfile,
}

/// Result of the approval cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalOutcome {
    /// The request moved to `approved`, competitors were purged and both
    /// cats were flagged as matched.
    Approved {
        /// Cat proposed on behalf of the issuer.
        requester_cat: CatId,
        /// Cat being proposed to.
        candidate_cat: CatId,
        /// Competing waiting requests deleted by the cascade.
        purged: usize,
    },
    /// The request was no longer waiting when the cascade ran.
    NotWaiting,
}

/// Cat catalog access available inside a transaction.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatCatalog: Send {
    /// Fetch one cat, including soft-deleted ones.
    async fn get_cat(&mut self, id: &CatId) -> Result<Option<CatRecord>, MatchStoreError>;

    /// Fetch two cats with a single read. Backends that lock rows keep both
    /// cats locked until the transaction ends.
    async fn get_cat_pair(
        &mut self,
        first: &CatId,
        second: &CatId,
    ) -> Result<(Option<CatRecord>, Option<CatRecord>), MatchStoreError>;

    /// Permanently flag the given cats as matched.
    async fn set_matched(&mut self, ids: &[CatId]) -> Result<(), MatchStoreError>;
}

/// Match request gateway available inside a transaction.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MatchRepository: Send {
    /// Append a new `waiting` request.
    async fn insert(&mut self, request: &MatchRequest) -> Result<(), MatchStoreError>;

    /// Current status of a request.
    async fn status(&mut self, id: &MatchId) -> Result<Option<MatchStatus>, MatchStoreError>;

    /// Owner of the candidate cat referenced by a request.
    async fn candidate_owner(&mut self, id: &MatchId) -> Result<Option<UserId>, MatchStoreError>;

    /// Whether a waiting request already links this ordered pair of cats.
    async fn has_waiting_duplicate(
        &mut self,
        requester_cat: &CatId,
        candidate_cat: &CatId,
    ) -> Result<bool, MatchStoreError>;

    /// Requests the user issued or whose candidate cat the user owns, newest
    /// first with ties broken by descending id. A request whose cats or
    /// issuer cannot be joined is an error.
    async fn list_by_participant(
        &mut self,
        user: &UserId,
    ) -> Result<Vec<MatchListing>, MatchStoreError>;

    /// Approve a waiting request: set its status, delete other waiting
    /// requests for the same candidate cat and flag both cats as matched.
    async fn approve(&mut self, id: &MatchId) -> Result<ApprovalOutcome, MatchStoreError>;

    /// Reject a waiting request. Returns `false` when it was not waiting.
    async fn reject(&mut self, id: &MatchId) -> Result<bool, MatchStoreError>;

    /// Hard-delete a waiting request. Returns `false` when no waiting row was
    /// removed; decided requests are left in place.
    async fn delete(&mut self, id: &MatchId) -> Result<bool, MatchStoreError>;

    /// Whether `user` issued the request. Missing requests yield `false`.
    async fn can_withdraw(&mut self, id: &MatchId, user: &UserId)
    -> Result<bool, MatchStoreError>;
}

/// Transaction handle exposing the catalog and the gateway together.
pub trait MatchTransaction: CatCatalog + MatchRepository + Send {}

impl<T> MatchTransaction for T where T: CatCatalog + MatchRepository + Send {}

/// Scoped unit of work over the match store.
#[async_trait]
pub trait MatchStore: Send + Sync {
    /// Run `work` inside one transaction: commit when it returns `Ok`, roll
    /// back when it returns `Err` or panics.
    async fn transaction<T, F>(&self, work: F) -> Result<T, DomainError>
    where
        T: Send + 'static,
        F: for<'t> FnOnce(&'t mut dyn MatchTransaction) -> TxFuture<'t, T> + Send + 'static;
}
