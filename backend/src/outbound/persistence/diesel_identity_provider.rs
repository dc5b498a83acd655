//! PostgreSQL-backed `IdentityProvider` resolving users by email.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::AuthenticatedUser;
use crate::domain::ports::{IdentityError, IdentityProvider};

use super::error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::UserRow;
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed identity lookup over the `users` table.
#[derive(Clone)]
pub struct DieselIdentityProvider {
    pool: DbPool,
}

impl DieselIdentityProvider {
    /// Create a new provider with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> IdentityError {
    map_basic_pool_error(error, IdentityError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> IdentityError {
    map_basic_diesel_error(error, IdentityError::query, IdentityError::connection)
}

#[async_trait]
impl IdentityProvider for DieselIdentityProvider {
    async fn resolve(&self, email: &str) -> Result<Option<AuthenticatedUser>, IdentityError> {
        let email = email.trim();
        if email.is_empty() {
            return Ok(None);
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.and_then(UserRow::into_authenticated))
    }
}
