//! Outward representation of match requests.
//!
//! Views are plain serialisable records built from a [`MatchListing`]. JSON
//! field names are camelCase; the candidate cat appears as `matchCatDetail`
//! and the requester cat as `userCatDetail`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ports::MatchListing;
use crate::domain::{CatId, CatProfile, CatSex, IssuerProfile, MatchId};

/// Summary of one cat inside a match view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatDetailView {
    /// Cat identifier.
    pub id: CatId,
    /// Display name.
    pub name: String,
    /// Breed as entered by the owner.
    pub race: String,
    /// Cat sex.
    pub sex: CatSex,
    /// Age in whole months.
    pub age_in_month: i32,
    /// Free-text description.
    pub description: String,
    /// Photo URLs in upload order.
    pub image_urls: Vec<String>,
    /// Whether the cat already has an approved match.
    pub has_matched: bool,
    /// When the cat was registered.
    pub created_at: DateTime<Utc>,
}

impl From<CatProfile> for CatDetailView {
    fn from(cat: CatProfile) -> Self {
        Self {
            id: cat.id,
            name: cat.name,
            race: cat.race,
            sex: cat.sex,
            age_in_month: cat.age_in_month,
            description: cat.description,
            image_urls: cat.image_urls,
            has_matched: cat.has_matched,
            created_at: cat.created_at,
        }
    }
}

/// Summary of the user who issued a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuerView {
    /// Display name of the issuer.
    pub name: String,
    /// Registered email address.
    pub email: String,
    /// When the issuer registered.
    pub created_at: DateTime<Utc>,
}

impl From<IssuerProfile> for IssuerView {
    fn from(issuer: IssuerProfile) -> Self {
        Self {
            name: issuer.name,
            email: issuer.email,
            created_at: issuer.created_at,
        }
    }
}

/// A match request as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRequestView {
    /// Request identifier.
    pub id: MatchId,
    /// When the request was issued.
    pub created_at: DateTime<Utc>,
    /// Message attached by the issuer.
    pub message: String,
    /// Cat being proposed to.
    pub match_cat_detail: CatDetailView,
    /// Cat proposed on behalf of the issuer.
    pub user_cat_detail: CatDetailView,
    /// User who issued the request.
    pub issued_by: IssuerView,
}

impl From<MatchListing> for MatchRequestView {
    fn from(listing: MatchListing) -> Self {
        let MatchListing {
            request,
            requester_cat,
            candidate_cat,
            issuer,
        } = listing;
        Self {
            id: request.id,
            created_at: request.created_at,
            message: request.message.into(),
            match_cat_detail: candidate_cat.into(),
            user_cat_detail: requester_cat.into(),
            issued_by: issuer.into(),
        }
    }
}
