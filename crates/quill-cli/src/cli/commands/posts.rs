//! Implementation of `quill posts` subcommands.

use anyhow::Result;
use quill_core::core::CoreContext;

use crate::cli::commands::helpers::open_as_caller;
use crate::output::{Formatter, OutputFormat};

/// Publish a post as the calling user.
#[tracing::instrument(skip(ctx, format))]
pub fn run_posts_add(
    ctx: &CoreContext,
    title: &str,
    caller: Option<i64>,
    format: OutputFormat,
) -> Result<()> {
    let (services, caller) = open_as_caller(ctx, caller)?;
    let post = services.directory().add_post(caller.user_id, title)?;
    Formatter::new(format).print(&post)
}

/// Delete one of the caller's posts with its comments.
#[tracing::instrument(skip(ctx, format))]
pub fn run_posts_delete(
    ctx: &CoreContext,
    post_id: i64,
    caller: Option<i64>,
    format: OutputFormat,
) -> Result<()> {
    let (services, caller) = open_as_caller(ctx, caller)?;
    let ack = services.directory().remove_post(post_id, caller.user_id)?;
    Formatter::new(format).print(&ack)
}
