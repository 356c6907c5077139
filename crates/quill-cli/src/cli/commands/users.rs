//! Implementation of `quill users` subcommands.

use anyhow::Result;
use quill_core::core::CoreContext;

use crate::cli::commands::helpers::{open_as_caller, open_services};
use crate::output::{Formatter, OutputFormat};

/// Register a user.
#[tracing::instrument(skip(ctx, format))]
pub fn run_users_add(ctx: &CoreContext, nickname: &str, format: OutputFormat) -> Result<()> {
    let services = open_services(ctx)?;
    let user = services.directory().add_user(nickname)?;
    Formatter::new(format).print(&user)
}

/// Delete the calling user and everything they wrote.
#[tracing::instrument(skip(ctx, format))]
pub fn run_users_delete(
    ctx: &CoreContext,
    user_id: i64,
    caller: Option<i64>,
    format: OutputFormat,
) -> Result<()> {
    let (services, caller) = open_as_caller(ctx, caller)?;
    let ack = services.directory().remove_user(user_id, caller.user_id)?;
    Formatter::new(format).print(&ack)
}
