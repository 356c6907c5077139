//! Shared helpers for CLI commands.

use std::process::ExitCode;

use anyhow::Result;
use quill_core::core::{CoreContext, CoreError, ErrorKind, QuillServices};
use quill_core::store::User;

/// Open services for the configured database.
pub fn open_services(ctx: &CoreContext) -> Result<QuillServices> {
    Ok(ctx.services()?)
}

/// Open services and resolve the calling user.
pub fn open_as_caller(ctx: &CoreContext, user: Option<i64>) -> Result<(QuillServices, User)> {
    let services = open_services(ctx)?;
    let caller = services.authenticate(user)?;
    Ok((services, caller))
}

/// Classify a command failure. Anything that is not a `CoreError` is internal.
pub fn error_kind(err: &anyhow::Error) -> ErrorKind {
    err.downcast_ref::<CoreError>()
        .map_or(ErrorKind::Internal, CoreError::kind)
}

/// Message shown to the caller. Internal failures stay opaque; their
/// cause chain only goes to the log.
pub fn failure_message(err: &anyhow::Error, kind: ErrorKind) -> String {
    match kind {
        ErrorKind::Internal => INTERNAL_MESSAGE.to_string(),
        _ => format!("{err:#}"),
    }
}

const INTERNAL_MESSAGE: &str = "internal error";

/// Process exit code for each failure kind.
pub fn exit_code(kind: ErrorKind) -> ExitCode {
    let code: u8 = match kind {
        ErrorKind::Internal => 1,
        ErrorKind::Validation => 3,
        ErrorKind::NotFound => 4,
        ErrorKind::Forbidden => 5,
        ErrorKind::Unauthenticated => 6,
        ErrorKind::NotInitialized => 7,
    };
    ExitCode::from(code)
}
