//! Implementation of `quill comments` subcommands.
//!
//! Listing is open to anyone; every mutation runs as the authenticated
//! caller, which the service checks against the comment's author.

use anyhow::Result;
use quill_core::core::CoreContext;

use crate::cli::commands::helpers::{open_as_caller, open_services};
use crate::output::{Formatter, OutputFormat};

/// List a post's comments, newest first.
#[tracing::instrument(skip(ctx, format))]
pub fn run_comments_list(ctx: &CoreContext, post_id: i64, format: OutputFormat) -> Result<()> {
    let services = open_services(ctx)?;
    let comments = services.comments().list(post_id)?;
    Formatter::new(format).print_list(&comments, "comments")
}

/// Comment on a post.
#[tracing::instrument(skip(ctx, content, format))]
pub fn run_comments_add(
    ctx: &CoreContext,
    post_id: i64,
    content: Option<&str>,
    caller: Option<i64>,
    format: OutputFormat,
) -> Result<()> {
    let (services, caller) = open_as_caller(ctx, caller)?;
    let ack = services
        .comments()
        .create(post_id, caller.user_id, content)?;
    Formatter::new(format).print(&ack)
}

/// Replace the content of the caller's comment.
#[tracing::instrument(skip(ctx, content, format))]
pub fn run_comments_edit(
    ctx: &CoreContext,
    post_id: i64,
    comment_id: i64,
    content: Option<&str>,
    caller: Option<i64>,
    format: OutputFormat,
) -> Result<()> {
    let (services, caller) = open_as_caller(ctx, caller)?;
    let ack = services
        .comments()
        .update(post_id, comment_id, caller.user_id, content)?;
    Formatter::new(format).print(&ack)
}

/// Delete the caller's comment.
#[tracing::instrument(skip(ctx, format))]
pub fn run_comments_delete(
    ctx: &CoreContext,
    post_id: i64,
    comment_id: i64,
    caller: Option<i64>,
    format: OutputFormat,
) -> Result<()> {
    let (services, caller) = open_as_caller(ctx, caller)?;
    let ack = services
        .comments()
        .delete(post_id, comment_id, caller.user_id)?;
    Formatter::new(format).print(&ack)
}
