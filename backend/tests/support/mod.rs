//! Shared helpers for integration tests that need embedded PostgreSQL.
//!
//! Integration tests compile as separate crates under `backend/tests/`; this
//! module is included with `mod support;` by each suite that needs it.

#![allow(dead_code)]

pub mod cluster_skip;
pub mod embedded_postgres;

pub use cluster_skip::handle_cluster_setup_failure;
pub use embedded_postgres::{provision_template_database, shared_cluster_handle};

/// Render a `postgres` error with enough detail to be useful in CI logs.
///
/// `postgres::Error` often displays as a bare `db error`; prefer the
/// database error's message and SQLSTATE when available.
pub fn format_postgres_error(error: &postgres::Error) -> String {
    let Some(db_error) = error.as_db_error() else {
        return error.to_string();
    };

    let mut summary = format!(
        "postgres error {:?}: {}",
        db_error.code(),
        db_error.message()
    );
    if let Some(detail) = db_error.detail() {
        summary.push_str("; detail: ");
        summary.push_str(detail);
    }
    summary
}
