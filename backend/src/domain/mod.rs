//! Domain primitives, rules and services of the match engine.
//!
//! Purpose: define the strongly typed entities the lifecycle service works
//! with, the eligibility predicates guarding every transition and the ports
//! adapters implement. Nothing here depends on an adapter.
//!
//! Public surface:
//! - DomainError / ErrorCode: transport-agnostic failure with a stable code.
//! - UserId, AuthenticatedUser, IssuerProfile: acting and issuing users.
//! - CatId, CatSex, CatRecord, CatProfile: cat catalog views.
//! - MatchId, MatchStatus, MatchMessage, MatchRequest: the match aggregate.
//! - MatchRequestView: outward representation of a listed request.
//! - MatchLifecycleService: implementation of the driving ports.

pub mod eligibility;
pub mod error;
pub mod ports;

mod cat;
mod match_lifecycle;
mod match_request;
mod match_view;
mod user;

pub use self::cat::{CatId, CatProfile, CatRecord, CatSex, UnknownCatSex};
pub use self::error::{DomainError, DomainErrorValidationError, ErrorCode};
pub use self::match_lifecycle::MatchLifecycleService;
pub use self::match_request::{
    MATCH_MESSAGE_MAX, MATCH_MESSAGE_MIN, MatchId, MatchMessage, MatchMessageValidationError,
    MatchRequest, MatchStatus, UnknownMatchStatus,
};
pub use self::match_view::{CatDetailView, IssuerView, MatchRequestView};
pub use self::user::{AuthenticatedUser, IssuerProfile, UserId, UserValidationError};
