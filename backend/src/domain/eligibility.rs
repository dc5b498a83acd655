//! Read-only predicates deciding whether a match proposal or decision is
//! legal.
//!
//! Each predicate issues exactly one read through the open transaction and
//! caches nothing, so the answer reflects the transaction the caller is about
//! to write in.

use crate::domain::ports::{CatCatalog, MatchRepository, MatchStoreError};
use crate::domain::{CatId, CatRecord, MatchId, UserId};

fn live(record: Option<CatRecord>) -> Option<CatRecord> {
    record.filter(CatRecord::is_live)
}

/// Both cats exist and neither is soft-deleted.
pub async fn both_cats_exist<C>(
    catalog: &mut C,
    first: &CatId,
    second: &CatId,
) -> Result<bool, MatchStoreError>
where
    C: CatCatalog + ?Sized,
{
    let (a, b) = catalog.get_cat_pair(first, second).await?;
    Ok(live(a).is_some() && live(b).is_some())
}

/// `user` owns `cat` and the cat is not soft-deleted.
pub async fn is_owner<C>(catalog: &mut C, cat: &CatId, user: &UserId) -> Result<bool, MatchStoreError>
where
    C: CatCatalog + ?Sized,
{
    let record = live(catalog.get_cat(cat).await?);
    Ok(record.is_some_and(|cat| cat.owner == *user))
}

/// Both cats have the same sex. Missing cats never compare equal.
pub async fn same_sex<C>(
    catalog: &mut C,
    first: &CatId,
    second: &CatId,
) -> Result<bool, MatchStoreError>
where
    C: CatCatalog + ?Sized,
{
    let pair = catalog.get_cat_pair(first, second).await?;
    Ok(matches!(pair, (Some(a), Some(b)) if a.sex == b.sex))
}

/// Either cat already has an approved match.
pub async fn already_matched<C>(
    catalog: &mut C,
    first: &CatId,
    second: &CatId,
) -> Result<bool, MatchStoreError>
where
    C: CatCatalog + ?Sized,
{
    let (a, b) = catalog.get_cat_pair(first, second).await?;
    Ok([a, b].into_iter().flatten().any(|cat| cat.has_matched))
}

/// Both cats belong to the same user.
pub async fn same_owner<C>(
    catalog: &mut C,
    first: &CatId,
    second: &CatId,
) -> Result<bool, MatchStoreError>
where
    C: CatCatalog + ?Sized,
{
    let pair = catalog.get_cat_pair(first, second).await?;
    Ok(matches!(pair, (Some(a), Some(b)) if a.owner == b.owner))
}

/// `user` owns the candidate cat of the request.
pub async fn is_candidate_receiver<R>(
    repository: &mut R,
    match_id: &MatchId,
    user: &UserId,
) -> Result<bool, MatchStoreError>
where
    R: MatchRepository + ?Sized,
{
    let owner = repository.candidate_owner(match_id).await?;
    Ok(owner.as_ref() == Some(user))
}

/// A waiting request already links this ordered pair.
pub async fn has_waiting_duplicate<R>(
    repository: &mut R,
    requester_cat: &CatId,
    candidate_cat: &CatId,
) -> Result<bool, MatchStoreError>
where
    R: MatchRepository + ?Sized,
{
    repository
        .has_waiting_duplicate(requester_cat, candidate_cat)
        .await
}
