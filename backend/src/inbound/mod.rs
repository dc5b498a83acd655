//! Inbound adapters that translate external requests into domain port calls
//! while keeping transport details at the edge.
//!
//! The command-line adapter lives under [`cli`].

pub mod cli;
