//! Cats Social match engine.
//!
//! Users propose pairings between their cats and other users' cats; the
//! candidate cat's owner approves or rejects them. The crate follows a
//! hexagonal layout: [`domain`] holds the rules and ports, [`outbound`] the
//! storage adapters and [`inbound`] the command-line adapter.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
