//! Outbound adapters implementing domain ports.
//!
//! - **persistence**: PostgreSQL-backed match store and identity provider
//!   using Diesel ORM.
//! - **memory**: in-process match store used by tests and scenarios.
//!
//! Adapters are thin translators between domain types and infrastructure
//! representations. They contain no match rules.

pub mod memory;
pub mod persistence;
