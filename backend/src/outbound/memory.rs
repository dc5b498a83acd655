//! In-memory match store.
//!
//! Transactions are serialised behind a Tokio mutex. Each one works on a
//! private copy of the state that replaces the shared state only when the
//! closure returns `Ok`, so an error or a panic leaves nothing behind.
//! Faults can be injected to exercise rollback and persistence error paths.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::ports::{
    ApprovalOutcome, CatCatalog, MatchListing, MatchRepository, MatchStore, MatchStoreError,
    MatchTransaction,
};
use crate::domain::{
    CatId, CatProfile, CatRecord, DomainError, IssuerProfile, MatchId, MatchRequest, MatchStatus,
    UserId,
};

/// Failure injected into the in-memory store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryFault {
    /// Every transaction fails before running its work.
    Unavailable,
    /// Inserting a match request fails.
    Insert,
    /// Flagging cats as matched fails, midway through an approval.
    SetMatched,
}

#[derive(Debug, Clone)]
struct StoredCat {
    owner: UserId,
    profile: CatProfile,
    deleted: bool,
}

impl StoredCat {
    fn record(&self) -> CatRecord {
        CatRecord {
            id: self.profile.id,
            owner: self.owner,
            sex: self.profile.sex,
            has_matched: self.profile.has_matched,
            soft_deleted: self.deleted,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct MemoryState {
    users: BTreeMap<UserId, IssuerProfile>,
    cats: BTreeMap<CatId, StoredCat>,
    matches: BTreeMap<MatchId, MatchRequest>,
}

#[derive(Debug, Default)]
struct Inner {
    state: MemoryState,
    fault: Option<MemoryFault>,
}

/// Match store keeping users, cats and match requests in process memory.
#[derive(Debug, Default)]
pub struct InMemoryMatchStore {
    inner: Mutex<Inner>,
}

impl InMemoryMatchStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user so listings can join the issuer profile.
    pub async fn put_user(&self, user: IssuerProfile) {
        self.inner.lock().await.state.users.insert(user.id, user);
    }

    /// Register a cat owned by `owner`.
    pub async fn put_cat(&self, owner: UserId, profile: CatProfile) {
        let cat = StoredCat {
            owner,
            profile,
            deleted: false,
        };
        self.inner
            .lock()
            .await
            .state
            .cats
            .insert(cat.profile.id, cat);
    }

    /// Mark a cat as soft-deleted. Returns `false` for unknown cats.
    pub async fn soft_delete_cat(&self, id: &CatId) -> bool {
        let mut inner = self.inner.lock().await;
        inner
            .state
            .cats
            .get_mut(id)
            .map(|cat| cat.deleted = true)
            .is_some()
    }

    /// Eligibility view of a cat as currently committed.
    pub async fn cat(&self, id: &CatId) -> Option<CatRecord> {
        self.inner.lock().await.state.cats.get(id).map(StoredCat::record)
    }

    /// A match request as currently committed.
    pub async fn match_request(&self, id: &MatchId) -> Option<MatchRequest> {
        self.inner.lock().await.state.matches.get(id).cloned()
    }

    /// Number of committed match requests.
    pub async fn match_count(&self) -> usize {
        self.inner.lock().await.state.matches.len()
    }

    /// Inject a fault that applies to every following transaction.
    pub async fn inject_fault(&self, fault: MemoryFault) {
        self.inner.lock().await.fault = Some(fault);
    }

    /// Remove any injected fault.
    pub async fn clear_fault(&self) {
        self.inner.lock().await.fault = None;
    }
}

struct MemoryTransaction {
    state: MemoryState,
    fault: Option<MemoryFault>,
}

impl MemoryTransaction {
    fn fail_if(&self, fault: MemoryFault) -> Result<(), MatchStoreError> {
        if self.fault == Some(fault) {
            return Err(MatchStoreError::query(format!("injected fault: {fault:?}")));
        }
        Ok(())
    }

    fn listing(&self, request: &MatchRequest) -> Result<MatchListing, MatchStoreError> {
        let cat = |id: &CatId| {
            self.state
                .cats
                .get(id)
                .ok_or_else(|| MatchStoreError::query(format!("cat {id} missing from listing")))
        };
        let requester_cat = cat(&request.requester_cat)?;
        let candidate_cat = cat(&request.candidate_cat)?;
        let issuer = self.state.users.get(&request.issuer).ok_or_else(|| {
            MatchStoreError::query(format!("user {} missing from listing", request.issuer))
        })?;
        Ok(MatchListing {
            request: request.clone(),
            requester_cat: requester_cat.profile.clone(),
            candidate_cat: candidate_cat.profile.clone(),
            issuer: issuer.clone(),
        })
    }

    fn transition(&mut self, id: &MatchId, next: MatchStatus) -> Option<&MatchRequest> {
        let request = self.state.matches.get_mut(id)?;
        if !request.status.can_transition_to(next) {
            return None;
        }
        request.status = next;
        Some(request)
    }
}

#[async_trait]
impl CatCatalog for MemoryTransaction {
    async fn get_cat(&mut self, id: &CatId) -> Result<Option<CatRecord>, MatchStoreError> {
        Ok(self.state.cats.get(id).map(StoredCat::record))
    }

    async fn get_cat_pair(
        &mut self,
        first: &CatId,
        second: &CatId,
    ) -> Result<(Option<CatRecord>, Option<CatRecord>), MatchStoreError> {
        let record = |id: &CatId| self.state.cats.get(id).map(StoredCat::record);
        Ok((record(first), record(second)))
    }

    async fn set_matched(&mut self, ids: &[CatId]) -> Result<(), MatchStoreError> {
        self.fail_if(MemoryFault::SetMatched)?;
        for id in ids {
            if let Some(cat) = self.state.cats.get_mut(id) {
                cat.profile.has_matched = true;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl MatchRepository for MemoryTransaction {
    async fn insert(&mut self, request: &MatchRequest) -> Result<(), MatchStoreError> {
        self.fail_if(MemoryFault::Insert)?;
        if self.state.matches.contains_key(&request.id) {
            return Err(MatchStoreError::query(format!(
                "duplicate match request id {}",
                request.id
            )));
        }
        self.state.matches.insert(request.id, request.clone());
        Ok(())
    }

    async fn status(&mut self, id: &MatchId) -> Result<Option<MatchStatus>, MatchStoreError> {
        Ok(self.state.matches.get(id).map(|request| request.status))
    }

    async fn candidate_owner(&mut self, id: &MatchId) -> Result<Option<UserId>, MatchStoreError> {
        Ok(self
            .state
            .matches
            .get(id)
            .and_then(|request| self.state.cats.get(&request.candidate_cat))
            .map(|cat| cat.owner))
    }

    async fn has_waiting_duplicate(
        &mut self,
        requester_cat: &CatId,
        candidate_cat: &CatId,
    ) -> Result<bool, MatchStoreError> {
        Ok(self.state.matches.values().any(|request| {
            request.status.is_waiting()
                && request.requester_cat == *requester_cat
                && request.candidate_cat == *candidate_cat
        }))
    }

    async fn list_by_participant(
        &mut self,
        user: &UserId,
    ) -> Result<Vec<MatchListing>, MatchStoreError> {
        let mut listings = self
            .state
            .matches
            .values()
            .filter(|request| {
                request.issuer == *user
                    || self
                        .state
                        .cats
                        .get(&request.candidate_cat)
                        .is_some_and(|cat| cat.owner == *user)
            })
            .map(|request| self.listing(request))
            .collect::<Result<Vec<_>, _>>()?;
        listings.sort_by(|a, b| {
            b.request
                .created_at
                .cmp(&a.request.created_at)
                .then_with(|| b.request.id.cmp(&a.request.id))
        });
        Ok(listings)
    }

    async fn approve(&mut self, id: &MatchId) -> Result<ApprovalOutcome, MatchStoreError> {
        let Some(approved) = self.transition(id, MatchStatus::Approved) else {
            return Ok(ApprovalOutcome::NotWaiting);
        };
        let (requester_cat, candidate_cat) = (approved.requester_cat, approved.candidate_cat);

        let before = self.state.matches.len();
        self.state.matches.retain(|other_id, other| {
            other_id == id || !(other.candidate_cat == candidate_cat && other.status.is_waiting())
        });
        let purged = before - self.state.matches.len();

        self.set_matched(&[requester_cat, candidate_cat]).await?;
        Ok(ApprovalOutcome::Approved {
            requester_cat,
            candidate_cat,
            purged,
        })
    }

    async fn reject(&mut self, id: &MatchId) -> Result<bool, MatchStoreError> {
        Ok(self.transition(id, MatchStatus::Rejected).is_some())
    }

    async fn delete(&mut self, id: &MatchId) -> Result<bool, MatchStoreError> {
        let waiting = self
            .state
            .matches
            .get(id)
            .is_some_and(|request| request.status.is_waiting());
        Ok(waiting && self.state.matches.remove(id).is_some())
    }

    async fn can_withdraw(
        &mut self,
        id: &MatchId,
        user: &UserId,
    ) -> Result<bool, MatchStoreError> {
        Ok(self
            .state
            .matches
            .get(id)
            .is_some_and(|request| request.issuer == *user))
    }
}

#[async_trait]
impl MatchStore for InMemoryMatchStore {
    async fn transaction<T, F>(&self, work: F) -> Result<T, DomainError>
    where
        T: Send + 'static,
        F: for<'t> FnOnce(&'t mut dyn MatchTransaction) -> crate::domain::ports::TxFuture<'t, T>
            + Send
            + 'static,
    {
        let mut inner = self.inner.lock().await;
        if inner.fault == Some(MemoryFault::Unavailable) {
            return Err(DomainError::persistence(
                "match store unavailable: injected fault",
            ));
        }

        let mut tx = MemoryTransaction {
            state: inner.state.clone(),
            fault: inner.fault,
        };
        let result = work(&mut tx).await;
        match &result {
            Ok(_) => inner.state = tx.state,
            Err(error) => debug!(code = ?error.code(), "in-memory transaction rolled back"),
        }
        result
    }
}
