//! Command-line adapter for the match lifecycle.
//!
//! ```text
//! cats-match --as <email> create --user-cat <id> --match-cat <id> --message <text>
//! cats-match --as <email> list
//! cats-match --as <email> approve <match-id>
//! cats-match --as <email> reject <match-id>
//! cats-match --as <email> withdraw <match-id>
//! ```
//!
//! Every invocation resolves the acting user once, runs one port call and
//! prints a JSON envelope: `{"message", "data"}` on success and
//! `{"code", "message"}` on failure. Error codes map to distinct exit codes.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::error;

use crate::domain::ports::{CreateMatchRequest, IdentityProvider, MatchCommand, MatchQuery};
use crate::domain::{AuthenticatedUser, CatId, DomainError, ErrorCode, MatchId, MatchMessage};

/// Exit code for startup failures that happen before a command runs.
pub const EXIT_STARTUP_FAILURE: u8 = 1;

/// `cats-match` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "cats-match",
    about = "Propose, decide and list cat match requests",
    version
)]
pub struct CliArgs {
    /// Database connection URL. Overrides configuration and `DATABASE_URL`.
    #[arg(long = "database-url", value_name = "url")]
    pub database_url: Option<String>,
    /// Email of the registered user acting on the command.
    #[arg(long = "as", value_name = "email")]
    pub acting_as: String,
    /// Operation to run.
    #[command(subcommand)]
    pub command: MatchSubcommand,
}

/// Match lifecycle operations.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum MatchSubcommand {
    /// Propose a match between one of your cats and another user's cat.
    Create {
        /// Your cat.
        #[arg(long = "user-cat", value_name = "id")]
        user_cat: String,
        /// The cat you propose to.
        #[arg(long = "match-cat", value_name = "id")]
        match_cat: String,
        /// Note for the other owner, 5 to 120 characters.
        #[arg(long)]
        message: String,
    },
    /// List requests you issued or received, newest first.
    List,
    /// Approve a request targeting one of your cats.
    Approve {
        /// Match request id.
        id: String,
    },
    /// Reject a request targeting one of your cats.
    Reject {
        /// Match request id.
        id: String,
    },
    /// Withdraw a waiting request you issued.
    Withdraw {
        /// Match request id.
        id: String,
    },
}

/// Ports the adapter drives.
#[derive(Clone)]
pub struct CliState {
    /// Resolves `--as` into the acting user.
    pub identity: Arc<dyn IdentityProvider>,
    /// Create and decision operations.
    pub commands: Arc<dyn MatchCommand>,
    /// Listing operations.
    pub queries: Arc<dyn MatchQuery>,
}

impl CliState {
    /// Bundle the identity provider with the match ports.
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        commands: Arc<dyn MatchCommand>,
        queries: Arc<dyn MatchQuery>,
    ) -> Self {
        Self {
            identity,
            commands,
            queries,
        }
    }
}

/// Success payload printed to stdout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuccessEnvelope {
    /// Human-readable outcome.
    pub message: &'static str,
    /// Operation payload, omitted when the operation returns nothing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl SuccessEnvelope {
    fn message(message: &'static str) -> Self {
        Self {
            message,
            data: None,
        }
    }
}

/// Rendered outcome of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliOutput {
    /// Process exit code.
    pub exit_code: u8,
    /// JSON document for stdout.
    pub body: String,
}

/// Exit code for a domain error code.
pub fn exit_code(code: ErrorCode) -> u8 {
    match code {
        ErrorCode::InvalidRequest => 2,
        ErrorCode::Unauthorized => 3,
        ErrorCode::Forbidden => 4,
        ErrorCode::NotFound => 5,
        ErrorCode::InvalidOperation => 6,
        ErrorCode::PersistenceError => 7,
    }
}

async fn authenticate(
    identity: &dyn IdentityProvider,
    email: &str,
) -> Result<AuthenticatedUser, DomainError> {
    identity
        .resolve(email)
        .await
        .map_err(|err| {
            error!(error = %err, "identity lookup failed");
            DomainError::persistence(format!("identity lookup failed: {err}"))
        })?
        .ok_or_else(|| DomainError::unauthorized("user is not registered"))
}

fn parse_cat_id(raw: &str, field: &str) -> Result<CatId, DomainError> {
    CatId::parse(raw)
        .map_err(|_| DomainError::invalid_request(format!("{field} must be a valid UUID")))
}

// Malformed match ids cannot name an existing request.
fn parse_match_id(raw: &str) -> Result<MatchId, DomainError> {
    MatchId::parse(raw).map_err(|_| DomainError::not_found("cat match request is not found"))
}

/// Resolve the acting user and run one lifecycle operation.
pub async fn dispatch(
    state: &CliState,
    acting_as: &str,
    command: MatchSubcommand,
) -> Result<SuccessEnvelope, DomainError> {
    let user = authenticate(state.identity.as_ref(), acting_as).await?;

    match command {
        MatchSubcommand::Create {
            user_cat,
            match_cat,
            message,
        } => {
            let request = CreateMatchRequest {
                requester_cat: parse_cat_id(&user_cat, "userCatId")?,
                candidate_cat: parse_cat_id(&match_cat, "matchCatId")?,
                message: MatchMessage::new(message)
                    .map_err(|err| DomainError::invalid_request(err.to_string()))?,
            };
            let created = state.commands.create_match(&user, request).await?;
            Ok(SuccessEnvelope {
                message: "success create cat match",
                data: Some(json!({
                    "id": created.id,
                    "createdAt": created.created_at,
                })),
            })
        }
        MatchSubcommand::List => {
            let views = state.queries.list_matches_for_user(&user).await?;
            let data = serde_json::to_value(views).map_err(|err| {
                DomainError::persistence(format!("serialise match requests: {err}"))
            })?;
            Ok(SuccessEnvelope {
                message: "success",
                data: Some(data),
            })
        }
        MatchSubcommand::Approve { id } => {
            state
                .commands
                .approve_match(&user, parse_match_id(&id)?)
                .await?;
            Ok(SuccessEnvelope::message("success approve cat match"))
        }
        MatchSubcommand::Reject { id } => {
            state
                .commands
                .reject_match(&user, parse_match_id(&id)?)
                .await?;
            Ok(SuccessEnvelope::message("success reject cat match"))
        }
        MatchSubcommand::Withdraw { id } => {
            state
                .commands
                .withdraw_match(&user, parse_match_id(&id)?)
                .await?;
            Ok(SuccessEnvelope::message("success delete cat match request"))
        }
    }
}

/// Render a dispatch result as an exit code and JSON body.
pub fn render(result: Result<SuccessEnvelope, DomainError>) -> CliOutput {
    let (exit_code, body) = match result {
        Ok(envelope) => (0, serde_json::to_string_pretty(&envelope)),
        Err(err) => (exit_code(err.code()), serde_json::to_string_pretty(&err)),
    };
    match body {
        Ok(body) => CliOutput { exit_code, body },
        Err(err) => CliOutput {
            exit_code: exit_code.max(EXIT_STARTUP_FAILURE),
            body: format!(r#"{{"code":"persistence_error","message":"render output: {err}"}}"#),
        },
    }
}

/// Run one parsed invocation against `state`.
pub async fn run(state: &CliState, args: CliArgs) -> CliOutput {
    render(dispatch(state, &args.acting_as, args.command).await)
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
