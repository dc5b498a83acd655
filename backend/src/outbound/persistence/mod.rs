//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Adapters translate between Diesel rows and domain types and contain no
//! match rules. Row structs (`models.rs`) and table definitions (`schema.rs`)
//! stay private to this module. Connections come from a `bb8` pool of
//! `diesel-async` connections.
//!
//! # Example
//!
//! ```ignore
//! use cats_social::outbound::persistence::{DbPool, DieselMatchStore, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/cats")).await?;
//! let store = DieselMatchStore::new(pool);
//! ```

mod diesel_identity_provider;
mod diesel_match_store;
mod error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_identity_provider::DieselIdentityProvider;
pub use diesel_match_store::DieselMatchStore;
pub use migrations::{
    MIGRATIONS, MigrationError, run_pending_migrations, run_pending_migrations_async,
};
pub use pool::{DbPool, PoolConfig, PoolError};
