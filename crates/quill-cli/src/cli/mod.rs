//! CLI command definitions and handlers.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;

pub mod commands;

/// Comments on blog posts, with author-only edits and deletes
#[derive(Parser, Debug)]
#[command(name = "quill")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Shorthand for --format json
    #[arg(long, global = true)]
    pub json: bool,

    /// Comment database (default: $QUILL_DB or .quill/comments.db)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Act as this user ID (default: $QUILL_USER)
    #[arg(long = "as", global = true, value_name = "USER_ID")]
    pub user: Option<i64>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Effective output format after applying `--json`.
    #[must_use]
    pub const fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            self.format
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the comment database
    Init,

    /// Manage users
    #[command(subcommand)]
    Users(UsersCommands),

    /// Manage posts
    #[command(subcommand)]
    Posts(PostsCommands),

    /// Manage comments on a post
    #[command(subcommand)]
    Comments(CommentsCommands),
}

// ============================================================================
// Users subcommands
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum UsersCommands {
    /// Register a user
    Add {
        /// Display nickname (must be unique)
        #[arg(long)]
        nickname: String,
    },

    /// Delete yourself, along with your posts and comments
    Delete {
        /// User ID
        user_id: i64,
    },
}

// ============================================================================
// Posts subcommands
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum PostsCommands {
    /// Publish a post as the current user
    Add {
        /// Post title
        #[arg(long)]
        title: String,
    },

    /// Delete one of your posts, along with its comments
    Delete {
        /// Post ID
        post_id: i64,
    },
}

// ============================================================================
// Comments subcommands
// ============================================================================

#[derive(Subcommand, Debug)]
pub enum CommentsCommands {
    /// List comments on a post, newest first
    List {
        /// Post ID
        post_id: i64,
    },

    /// Comment on a post as the current user
    Add {
        /// Post ID
        post_id: i64,

        /// Comment text
        #[arg(long)]
        content: Option<String>,
    },

    /// Replace the text of one of your comments
    Edit {
        /// Post ID
        post_id: i64,

        /// Comment ID
        comment_id: i64,

        /// New comment text
        #[arg(long)]
        content: Option<String>,
    },

    /// Delete one of your comments
    Delete {
        /// Post ID
        post_id: i64,

        /// Comment ID
        comment_id: i64,
    },
}
