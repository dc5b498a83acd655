//! Internal Diesel row structs for database operations.
//!
//! These types never leave the persistence layer. Conversions into domain
//! types validate stored enum text and report bad rows as query errors.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::ports::MatchStoreError;
use crate::domain::{
    AuthenticatedUser, CatId, CatProfile, CatRecord, CatSex, IssuerProfile, MatchId, MatchMessage,
    MatchRequest, MatchStatus, UserId,
};

use super::schema::{cat_matches, cats, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserRow> for IssuerProfile {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::from(row.id),
            name: row.name,
            email: row.email,
            created_at: row.created_at,
        }
    }
}

impl UserRow {
    /// Identity view of the row; `None` when the stored email is blank.
    pub fn into_authenticated(self) -> Option<AuthenticatedUser> {
        AuthenticatedUser::new(UserId::from(self.id), self.email).ok()
    }
}

/// Eligibility columns of the cats table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = cats)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CatEligibilityRow {
    pub id: Uuid,
    pub owned_by_id: Uuid,
    pub sex: String,
    pub has_matched: bool,
    pub deleted: bool,
}

impl TryFrom<CatEligibilityRow> for CatRecord {
    type Error = MatchStoreError;

    fn try_from(row: CatEligibilityRow) -> Result<Self, Self::Error> {
        let sex = parse_sex(&row.sex)?;
        Ok(Self {
            id: CatId::from(row.id),
            owner: UserId::from(row.owned_by_id),
            sex,
            has_matched: row.has_matched,
            soft_deleted: row.deleted,
        })
    }
}

/// Display columns of the cats table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = cats)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CatProfileRow {
    pub id: Uuid,
    pub name: String,
    pub race: String,
    pub sex: String,
    pub age_in_month: i32,
    pub description: String,
    pub image_urls: Vec<String>,
    pub has_matched: bool,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<CatProfileRow> for CatProfile {
    type Error = MatchStoreError;

    fn try_from(row: CatProfileRow) -> Result<Self, Self::Error> {
        let sex = parse_sex(&row.sex)?;
        Ok(Self {
            id: CatId::from(row.id),
            name: row.name,
            race: row.race,
            sex,
            age_in_month: row.age_in_month,
            description: row.description,
            image_urls: row.image_urls,
            has_matched: row.has_matched,
            created_at: row.created_at,
        })
    }
}

/// Row struct for reading from the cat_matches table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = cat_matches)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MatchRow {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub issued_by_id: Uuid,
    pub match_cat_id: Uuid,
    pub user_cat_id: Uuid,
    pub message: String,
    pub status: String,
}

impl TryFrom<MatchRow> for MatchRequest {
    type Error = MatchStoreError;

    fn try_from(row: MatchRow) -> Result<Self, Self::Error> {
        let status = parse_status(&row.status)?;
        let message = MatchMessage::new(row.message).map_err(|err| {
            MatchStoreError::query(format!("stored match {} has invalid message: {err}", row.id))
        })?;
        Ok(Self {
            id: MatchId::from(row.id),
            created_at: row.created_at,
            issuer: UserId::from(row.issued_by_id),
            requester_cat: CatId::from(row.user_cat_id),
            candidate_cat: CatId::from(row.match_cat_id),
            message,
            status,
        })
    }
}

/// Insertable struct for new match requests.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = cat_matches)]
pub(crate) struct NewMatchRow<'a> {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub issued_by_id: Uuid,
    pub match_cat_id: Uuid,
    pub user_cat_id: Uuid,
    pub message: &'a str,
    pub status: &'a str,
}

impl<'a> From<&'a MatchRequest> for NewMatchRow<'a> {
    fn from(request: &'a MatchRequest) -> Self {
        Self {
            id: *request.id.as_uuid(),
            created_at: request.created_at,
            issued_by_id: *request.issuer.as_uuid(),
            match_cat_id: *request.candidate_cat.as_uuid(),
            user_cat_id: *request.requester_cat.as_uuid(),
            message: request.message.as_ref(),
            status: request.status.as_str(),
        }
    }
}

pub(crate) fn parse_status(raw: &str) -> Result<MatchStatus, MatchStoreError> {
    raw.parse()
        .map_err(|err| MatchStoreError::query(format!("stored match status: {err}")))
}

fn parse_sex(raw: &str) -> Result<CatSex, MatchStoreError> {
    raw.parse()
        .map_err(|err| MatchStoreError::query(format!("stored cat sex: {err}")))
}
