//! PostgreSQL-backed `MatchStore` implementation using Diesel ORM.
//!
//! Each [`MatchStore::transaction`] call checks out one pooled connection
//! and runs the caller's work inside a Diesel transaction. The handle given
//! to the work borrows that connection, so every guard read and every write
//! share the transaction.
//!
//! Cat rows are the serialisation point. Proposal reads and the approval
//! cascade lock the two cats involved with `FOR NO KEY UPDATE`, always in id
//! order, so concurrent approvals for one candidate cat queue up and the
//! loser's conditional update finds no waiting row.

use async_trait::async_trait;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{
    ApprovalOutcome, CatCatalog, MatchListing, MatchRepository, MatchStore, MatchStoreError,
    MatchTransaction, TxFuture,
};
use crate::domain::{
    CatId, CatProfile, CatRecord, DomainError, IssuerProfile, MatchId, MatchRequest, MatchStatus,
    UserId,
};

use super::error_mapping::map_basic_diesel_error;
use super::models::{
    CatEligibilityRow, CatProfileRow, MatchRow, NewMatchRow, UserRow, parse_status,
};
use super::pool::DbPool;
use super::schema::{cat_matches, cats, users};

const WAITING: &str = "waiting";

/// Diesel-backed implementation of the match store port.
#[derive(Clone)]
pub struct DieselMatchStore {
    pool: DbPool,
}

impl DieselMatchStore {
    /// Create a new store with the given connection pool.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use cats_social::outbound::persistence::{DbPool, DieselMatchStore, PoolConfig};
    ///
    /// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
    /// let pool = DbPool::new(PoolConfig::new("postgres://localhost/cats")).await?;
    /// let store = DieselMatchStore::new(pool);
    /// # let _ = store;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> MatchStoreError {
    map_basic_diesel_error(error, MatchStoreError::query, MatchStoreError::connection)
}

/// Error carried out of the Diesel transaction closure.
#[derive(Debug)]
enum TransactionFailure {
    Domain(DomainError),
    Database(diesel::result::Error),
}

impl From<diesel::result::Error> for TransactionFailure {
    fn from(error: diesel::result::Error) -> Self {
        Self::Database(error)
    }
}

impl TransactionFailure {
    fn into_domain(self) -> DomainError {
        match self {
            Self::Domain(error) => error,
            Self::Database(error) => {
                let mapped = map_diesel_error(error);
                DomainError::persistence(format!("match store transaction failed: {mapped}"))
            }
        }
    }
}

/// Transaction handle borrowing the connection of an open transaction.
struct DieselMatchTransaction<'c> {
    conn: &'c mut AsyncPgConnection,
}

impl DieselMatchTransaction<'_> {
    /// Lock the given cat rows in id order for the rest of the transaction.
    async fn lock_cats(&mut self, ids: &[Uuid]) -> Result<Vec<CatEligibilityRow>, MatchStoreError> {
        cats::table
            .filter(cats::id.eq_any(ids))
            .order(cats::id.asc())
            .select(CatEligibilityRow::as_select())
            .for_no_key_update()
            .load(self.conn)
            .await
            .map_err(map_diesel_error)
    }

    async fn load_profiles(
        &mut self,
        ids: Vec<Uuid>,
    ) -> Result<Vec<CatProfile>, MatchStoreError> {
        let rows: Vec<CatProfileRow> = cats::table
            .filter(cats::id.eq_any(ids))
            .select(CatProfileRow::as_select())
            .load(self.conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(CatProfile::try_from).collect()
    }

    async fn load_issuers(
        &mut self,
        ids: Vec<Uuid>,
    ) -> Result<Vec<IssuerProfile>, MatchStoreError> {
        let rows: Vec<UserRow> = users::table
            .filter(users::id.eq_any(ids))
            .select(UserRow::as_select())
            .load(self.conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(IssuerProfile::from).collect())
    }
}

fn find_record(rows: &[CatRecord], id: &CatId) -> Option<CatRecord> {
    rows.iter().find(|cat| cat.id == *id).cloned()
}

#[async_trait]
impl<'c> CatCatalog for DieselMatchTransaction<'c> {
    async fn get_cat(&mut self, id: &CatId) -> Result<Option<CatRecord>, MatchStoreError> {
        let row: Option<CatEligibilityRow> = cats::table
            .find(id.as_uuid())
            .select(CatEligibilityRow::as_select())
            .first(self.conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(CatRecord::try_from).transpose()
    }

    async fn get_cat_pair(
        &mut self,
        first: &CatId,
        second: &CatId,
    ) -> Result<(Option<CatRecord>, Option<CatRecord>), MatchStoreError> {
        let rows = self
            .lock_cats(&[*first.as_uuid(), *second.as_uuid()])
            .await?
            .into_iter()
            .map(CatRecord::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((find_record(&rows, first), find_record(&rows, second)))
    }

    async fn set_matched(&mut self, ids: &[CatId]) -> Result<(), MatchStoreError> {
        let ids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        diesel::update(cats::table.filter(cats::id.eq_any(ids)))
            .set(cats::has_matched.eq(true))
            .execute(self.conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }
}

#[async_trait]
impl<'c> MatchRepository for DieselMatchTransaction<'c> {
    async fn insert(&mut self, request: &MatchRequest) -> Result<(), MatchStoreError> {
        diesel::insert_into(cat_matches::table)
            .values(NewMatchRow::from(request))
            .execute(self.conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn status(&mut self, id: &MatchId) -> Result<Option<MatchStatus>, MatchStoreError> {
        let raw: Option<String> = cat_matches::table
            .find(id.as_uuid())
            .select(cat_matches::status)
            .first(self.conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        raw.as_deref().map(parse_status).transpose()
    }

    async fn candidate_owner(&mut self, id: &MatchId) -> Result<Option<UserId>, MatchStoreError> {
        let owner: Option<Uuid> = cat_matches::table
            .inner_join(cats::table.on(cats::id.eq(cat_matches::match_cat_id)))
            .filter(cat_matches::id.eq(id.as_uuid()))
            .select(cats::owned_by_id)
            .first(self.conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(owner.map(UserId::from))
    }

    async fn has_waiting_duplicate(
        &mut self,
        requester_cat: &CatId,
        candidate_cat: &CatId,
    ) -> Result<bool, MatchStoreError> {
        diesel::select(exists(
            cat_matches::table
                .filter(cat_matches::user_cat_id.eq(requester_cat.as_uuid()))
                .filter(cat_matches::match_cat_id.eq(candidate_cat.as_uuid()))
                .filter(cat_matches::status.eq(WAITING)),
        ))
        .get_result(self.conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn list_by_participant(
        &mut self,
        user: &UserId,
    ) -> Result<Vec<MatchListing>, MatchStoreError> {
        let owned_cats = cats::table
            .filter(cats::owned_by_id.eq(user.as_uuid()))
            .select(cats::id);
        let rows: Vec<MatchRow> = cat_matches::table
            .filter(
                cat_matches::issued_by_id
                    .eq(user.as_uuid())
                    .or(cat_matches::match_cat_id.eq_any(owned_cats)),
            )
            .order((cat_matches::created_at.desc(), cat_matches::id.desc()))
            .select(MatchRow::as_select())
            .load(self.conn)
            .await
            .map_err(map_diesel_error)?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let cat_ids = rows
            .iter()
            .flat_map(|row| [row.match_cat_id, row.user_cat_id])
            .collect();
        let issuer_ids = rows.iter().map(|row| row.issued_by_id).collect();
        let profiles = self.load_profiles(cat_ids).await?;
        let issuers = self.load_issuers(issuer_ids).await?;

        let profile = |id: Uuid| {
            profiles
                .iter()
                .find(|cat| *cat.id.as_uuid() == id)
                .cloned()
                .ok_or_else(|| MatchStoreError::query(format!("cat {id} missing from listing")))
        };
        rows.into_iter()
            .map(|row| {
                let requester_cat = profile(row.user_cat_id)?;
                let candidate_cat = profile(row.match_cat_id)?;
                let issuer = issuers
                    .iter()
                    .find(|user| *user.id.as_uuid() == row.issued_by_id)
                    .cloned()
                    .ok_or_else(|| {
                        MatchStoreError::query(format!(
                            "user {} missing from listing",
                            row.issued_by_id
                        ))
                    })?;
                Ok(MatchListing {
                    request: MatchRequest::try_from(row)?,
                    requester_cat,
                    candidate_cat,
                    issuer,
                })
            })
            .collect()
    }

    async fn approve(&mut self, id: &MatchId) -> Result<ApprovalOutcome, MatchStoreError> {
        let pair: Option<(Uuid, Uuid)> = cat_matches::table
            .find(id.as_uuid())
            .select((cat_matches::user_cat_id, cat_matches::match_cat_id))
            .first(self.conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let Some((requester, candidate)) = pair else {
            return Ok(ApprovalOutcome::NotWaiting);
        };

        self.lock_cats(&[requester, candidate]).await?;

        let updated = diesel::update(
            cat_matches::table
                .filter(cat_matches::id.eq(id.as_uuid()))
                .filter(cat_matches::status.eq(WAITING)),
        )
        .set(cat_matches::status.eq(MatchStatus::Approved.as_str()))
        .execute(self.conn)
        .await
        .map_err(map_diesel_error)?;
        if updated == 0 {
            debug!(match_id = %id, "approval found the request no longer waiting");
            return Ok(ApprovalOutcome::NotWaiting);
        }

        let purged = diesel::delete(
            cat_matches::table
                .filter(cat_matches::match_cat_id.eq(candidate))
                .filter(cat_matches::status.eq(WAITING))
                .filter(cat_matches::id.ne(id.as_uuid())),
        )
        .execute(self.conn)
        .await
        .map_err(map_diesel_error)?;

        let (requester_cat, candidate_cat) = (CatId::from(requester), CatId::from(candidate));
        self.set_matched(&[requester_cat, candidate_cat]).await?;

        Ok(ApprovalOutcome::Approved {
            requester_cat,
            candidate_cat,
            purged,
        })
    }

    async fn reject(&mut self, id: &MatchId) -> Result<bool, MatchStoreError> {
        let updated = diesel::update(
            cat_matches::table
                .filter(cat_matches::id.eq(id.as_uuid()))
                .filter(cat_matches::status.eq(WAITING)),
        )
        .set(cat_matches::status.eq(MatchStatus::Rejected.as_str()))
        .execute(self.conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn delete(&mut self, id: &MatchId) -> Result<bool, MatchStoreError> {
        let deleted = diesel::delete(
            cat_matches::table
                .filter(cat_matches::id.eq(id.as_uuid()))
                .filter(cat_matches::status.eq(WAITING)),
        )
        .execute(self.conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn can_withdraw(
        &mut self,
        id: &MatchId,
        user: &UserId,
    ) -> Result<bool, MatchStoreError> {
        let issuer: Option<Uuid> = cat_matches::table
            .find(id.as_uuid())
            .select(cat_matches::issued_by_id)
            .first(self.conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(issuer.as_ref() == Some(user.as_uuid()))
    }
}

#[async_trait]
impl MatchStore for DieselMatchStore {
    async fn transaction<T, F>(&self, work: F) -> Result<T, DomainError>
    where
        T: Send + 'static,
        F: for<'t> FnOnce(&'t mut dyn MatchTransaction) -> TxFuture<'t, T> + Send + 'static,
    {
        let mut pooled = self.pool.get().await.map_err(|error| {
            DomainError::persistence(format!(
                "match store unavailable: {}",
                error.into_message()
            ))
        })?;
        let conn: &mut AsyncPgConnection = &mut pooled;

        conn.transaction(|conn| {
            async move {
                let mut tx = DieselMatchTransaction { conn };
                work(&mut tx).await.map_err(TransactionFailure::Domain)
            }
            .scope_boxed()
        })
        .await
        .map_err(TransactionFailure::into_domain)
    }
}
