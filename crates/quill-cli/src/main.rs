//! quill - comments on blog posts from the command line

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use quill_core::core::{CoreContext, ErrorKind};

mod cli;
mod output;
mod telemetry;

use cli::commands::{
    helpers, run_comments_add, run_comments_delete, run_comments_edit, run_comments_list,
    run_init, run_posts_add, run_posts_delete, run_users_add, run_users_delete,
};
use cli::{Cli, Commands, CommentsCommands, PostsCommands, UsersCommands};
use output::{Formatter, OutputFormat};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _telemetry = telemetry::init();

    let format = cli.output_format();
    match run(cli, format) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let kind = helpers::error_kind(&err);
            if kind == ErrorKind::Internal {
                tracing::error!(error = ?err, "command failed");
            } else {
                tracing::debug!(kind = kind.as_str(), error = %format!("{err:#}"), "command failed");
            }
            let message = helpers::failure_message(&err, kind);
            if let Err(print_err) = Formatter::new(format).print_failure(kind.as_str(), message) {
                eprintln!("{err:#} ({print_err})");
            }
            helpers::exit_code(kind)
        }
    }
}

fn run(cli: Cli, format: OutputFormat) -> Result<()> {
    let ctx = CoreContext::resolve(cli.db.as_deref());
    let caller = cli.user;

    match cli.command {
        Commands::Init => run_init(&ctx, format),

        Commands::Users(cmd) => match cmd {
            UsersCommands::Add { nickname } => run_users_add(&ctx, &nickname, format),
            UsersCommands::Delete { user_id } => run_users_delete(&ctx, user_id, caller, format),
        },

        Commands::Posts(cmd) => match cmd {
            PostsCommands::Add { title } => run_posts_add(&ctx, &title, caller, format),
            PostsCommands::Delete { post_id } => run_posts_delete(&ctx, post_id, caller, format),
        },

        Commands::Comments(cmd) => match cmd {
            CommentsCommands::List { post_id } => run_comments_list(&ctx, post_id, format),
            CommentsCommands::Add { post_id, content } => {
                run_comments_add(&ctx, post_id, content.as_deref(), caller, format)
            }
            CommentsCommands::Edit {
                post_id,
                comment_id,
                content,
            } => run_comments_edit(
                &ctx,
                post_id,
                comment_id,
                content.as_deref(),
                caller,
                format,
            ),
            CommentsCommands::Delete {
                post_id,
                comment_id,
            } => run_comments_delete(&ctx, post_id, comment_id, caller, format),
        },
    }
}
