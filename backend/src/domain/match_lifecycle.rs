//! Match request lifecycle service.
//!
//! Every operation opens exactly one [`MatchStore`] transaction, runs the
//! eligibility guards through it and only then mutates. A guard failure
//! returns an error from the transactional closure, which rolls the scope
//! back before anything was written.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use crate::domain::eligibility;
use crate::domain::ports::{
    ApprovalOutcome, CreateMatchRequest, MatchCommand, MatchQuery, MatchStore, MatchStoreError,
    MatchTransaction,
};
use crate::domain::{
    AuthenticatedUser, DomainError, MatchId, MatchRequest, MatchRequestView, UserId,
};

fn map_store_error(error: MatchStoreError) -> DomainError {
    match error {
        MatchStoreError::Connection { message } => {
            DomainError::persistence(format!("match store unavailable: {message}"))
        }
        MatchStoreError::Query { message } => {
            DomainError::persistence(format!("match store error: {message}"))
        }
    }
}

fn refuse(operation: &'static str, error: DomainError) -> DomainError {
    warn!(
        operation,
        code = ?error.code(),
        reason = error.message(),
        "match guard refused operation"
    );
    error
}

fn match_not_found() -> DomainError {
    DomainError::not_found("cat match request is not found")
}

async fn ensure_proposal_allowed<X>(tx: &mut X, proposal: &MatchRequest) -> Result<(), DomainError>
where
    X: MatchTransaction + ?Sized,
{
    const OPERATION: &str = "create";
    let (requester, candidate) = (&proposal.requester_cat, &proposal.candidate_cat);

    if !eligibility::both_cats_exist(tx, requester, candidate)
        .await
        .map_err(map_store_error)?
    {
        return Err(refuse(OPERATION, DomainError::not_found("cat is not found")));
    }
    if !eligibility::is_owner(tx, requester, &proposal.issuer)
        .await
        .map_err(map_store_error)?
    {
        return Err(refuse(
            OPERATION,
            DomainError::forbidden("user is not the cat's owner"),
        ));
    }
    if eligibility::same_sex(tx, requester, candidate)
        .await
        .map_err(map_store_error)?
    {
        return Err(refuse(
            OPERATION,
            DomainError::invalid_operation("cats have the same sex"),
        ));
    }
    if eligibility::already_matched(tx, requester, candidate)
        .await
        .map_err(map_store_error)?
    {
        return Err(refuse(
            OPERATION,
            DomainError::invalid_operation("cat is already matched"),
        ));
    }
    if eligibility::same_owner(tx, requester, candidate)
        .await
        .map_err(map_store_error)?
    {
        return Err(refuse(
            OPERATION,
            DomainError::invalid_operation("cats belong to the same owner"),
        ));
    }
    if eligibility::has_waiting_duplicate(tx, requester, candidate)
        .await
        .map_err(map_store_error)?
    {
        return Err(refuse(
            OPERATION,
            DomainError::invalid_operation("a waiting match request already exists for these cats"),
        ));
    }
    Ok(())
}

/// Shared guard for approve and reject: the acting user must own the
/// candidate cat and the request must still be waiting.
async fn ensure_decidable<X>(
    tx: &mut X,
    operation: &'static str,
    match_id: &MatchId,
    user: &UserId,
) -> Result<(), DomainError>
where
    X: MatchTransaction + ?Sized,
{
    if !eligibility::is_candidate_receiver(tx, match_id, user)
        .await
        .map_err(map_store_error)?
    {
        return Err(refuse(operation, match_not_found()));
    }
    ensure_waiting(tx, operation, match_id, "cat match request is already approved or rejected")
        .await
}

async fn ensure_waiting<X>(
    tx: &mut X,
    operation: &'static str,
    match_id: &MatchId,
    refusal: &'static str,
) -> Result<(), DomainError>
where
    X: MatchTransaction + ?Sized,
{
    match tx.status(match_id).await.map_err(map_store_error)? {
        Some(status) if status.is_waiting() => Ok(()),
        Some(_) => Err(refuse(operation, DomainError::invalid_operation(refusal))),
        None => Err(refuse(operation, match_not_found())),
    }
}

/// Lifecycle service implementing the match driving ports.
pub struct MatchLifecycleService<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> Clone for MatchLifecycleService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S> MatchLifecycleService<S> {
    /// Create a service over `store`, stamping new requests with `clock`.
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }
}

#[async_trait]
impl<S> MatchCommand for MatchLifecycleService<S>
where
    S: MatchStore,
{
    async fn create_match(
        &self,
        user: &AuthenticatedUser,
        request: CreateMatchRequest,
    ) -> Result<MatchRequest, DomainError> {
        let CreateMatchRequest {
            requester_cat,
            candidate_cat,
            message,
        } = request;
        let proposal = MatchRequest::propose(
            MatchId::random(),
            self.clock.utc(),
            *user.id(),
            requester_cat,
            candidate_cat,
            message,
        );

        let created = self
            .store
            .transaction(move |tx| {
                Box::pin(async move {
                    ensure_proposal_allowed(tx, &proposal).await?;
                    tx.insert(&proposal).await.map_err(map_store_error)?;
                    Ok(proposal)
                })
            })
            .await?;

        info!(
            match_id = %created.id,
            issuer = %created.issuer,
            requester_cat = %created.requester_cat,
            candidate_cat = %created.candidate_cat,
            "match request created"
        );
        Ok(created)
    }

    async fn approve_match(
        &self,
        user: &AuthenticatedUser,
        match_id: MatchId,
    ) -> Result<(), DomainError> {
        let acting = *user.id();
        let outcome = self
            .store
            .transaction(move |tx| {
                Box::pin(async move {
                    ensure_decidable(tx, "approve", &match_id, &acting).await?;
                    match tx.approve(&match_id).await.map_err(map_store_error)? {
                        ApprovalOutcome::NotWaiting => Err(refuse(
                            "approve",
                            DomainError::invalid_operation(
                                "cat match request is already approved or rejected",
                            ),
                        )),
                        approved => Ok(approved),
                    }
                })
            })
            .await?;

        if let ApprovalOutcome::Approved {
            requester_cat,
            candidate_cat,
            purged,
        } = outcome
        {
            info!(
                %match_id,
                %requester_cat,
                %candidate_cat,
                purged,
                "match request approved"
            );
        }
        Ok(())
    }

    async fn reject_match(
        &self,
        user: &AuthenticatedUser,
        match_id: MatchId,
    ) -> Result<(), DomainError> {
        let acting = *user.id();
        self.store
            .transaction(move |tx| {
                Box::pin(async move {
                    ensure_decidable(tx, "reject", &match_id, &acting).await?;
                    if tx.reject(&match_id).await.map_err(map_store_error)? {
                        Ok(())
                    } else {
                        Err(refuse(
                            "reject",
                            DomainError::invalid_operation(
                                "cat match request is already approved or rejected",
                            ),
                        ))
                    }
                })
            })
            .await?;

        info!(%match_id, "match request rejected");
        Ok(())
    }

    async fn withdraw_match(
        &self,
        user: &AuthenticatedUser,
        match_id: MatchId,
    ) -> Result<(), DomainError> {
        let acting = *user.id();
        self.store
            .transaction(move |tx| {
                Box::pin(async move {
                    if !tx
                        .can_withdraw(&match_id, &acting)
                        .await
                        .map_err(map_store_error)?
                    {
                        return Err(refuse("withdraw", match_not_found()));
                    }
                    ensure_waiting(
                        tx,
                        "withdraw",
                        &match_id,
                        "cannot delete non waiting cat match request",
                    )
                    .await?;
                    if tx.delete(&match_id).await.map_err(map_store_error)? {
                        Ok(())
                    } else {
                        Err(refuse("withdraw", match_not_found()))
                    }
                })
            })
            .await?;

        info!(%match_id, "match request withdrawn");
        Ok(())
    }
}

#[async_trait]
impl<S> MatchQuery for MatchLifecycleService<S>
where
    S: MatchStore,
{
    async fn list_matches_for_user(
        &self,
        user: &AuthenticatedUser,
    ) -> Result<Vec<MatchRequestView>, DomainError> {
        let participant = *user.id();
        let listings = self
            .store
            .transaction(move |tx| {
                Box::pin(async move {
                    tx.list_by_participant(&participant)
                        .await
                        .map_err(map_store_error)
                })
            })
            .await?;

        Ok(listings.into_iter().map(MatchRequestView::from).collect())
    }
}

#[cfg(test)]
#[path = "match_lifecycle_tests.rs"]
mod tests;
