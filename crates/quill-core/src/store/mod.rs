//! SQLite-backed comment store.
//!
//! Owns the `users`, `posts`, and `comments` tables. Referential integrity,
//! including cascading removal of comments when their post or author goes
//! away, is enforced by SQLite foreign keys rather than by callers.
//!
//! The service layer never sees [`CommentDb`] directly; it is handed the
//! [`PostLookup`] and [`CommentStore`] capabilities instead.

#![allow(clippy::missing_errors_doc)]

mod query;

pub use query::{AuthoredComment, Comment, Post, User};

use std::cell::Cell;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Connection;

use crate::core::{CoreError, CoreResult};

/// Identifier of a user row.
pub type UserId = i64;
/// Identifier of a post row.
pub type PostId = i64;
/// Identifier of a comment row.
pub type CommentId = i64;

/// How long a writer waits for another process to release the database lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Read access to posts, as needed by the comment workflow.
pub trait PostLookup {
    /// Find a post by ID.
    fn find_post(&self, post_id: PostId) -> CoreResult<Option<Post>>;
}

/// Keyed storage of comment records.
pub trait CommentStore {
    /// List a post's comments, newest first, with author nicknames resolved.
    fn list_comments(&self, post_id: PostId) -> CoreResult<Vec<AuthoredComment>>;

    /// Find a comment by ID.
    fn find_comment(&self, comment_id: CommentId) -> CoreResult<Option<Comment>>;

    /// Create a comment.
    ///
    /// Fails with `Validation` if `content` is empty or the post or author
    /// does not exist.
    fn create_comment(
        &self,
        author_id: UserId,
        post_id: PostId,
        content: &str,
    ) -> CoreResult<Comment>;

    /// Replace a comment's content and refresh `updated_at`.
    ///
    /// Fails with `NotFound` if the comment does not exist.
    fn update_comment(&self, comment_id: CommentId, content: &str) -> CoreResult<Comment>;

    /// Delete the comment matching both `comment_id` and `author_id`.
    ///
    /// Returns the number of rows removed; zero when nothing matched.
    fn delete_comment(&self, comment_id: CommentId, author_id: UserId) -> CoreResult<usize>;
}

/// Database holding users, posts, and comments.
pub struct CommentDb {
    conn: Connection,
    /// Last timestamp handed out, so every issued timestamp is strictly later.
    last_ts: Cell<Option<DateTime<Utc>>>,
}

impl CommentDb {
    /// Open or create a comment database at the given path.
    ///
    /// Creates parent directories if they don't exist.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create parent directories: {}", parent.display())
                })?;
            }
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.busy_timeout(BUSY_TIMEOUT)
            .context("Failed to set busy timeout")?;

        Self::from_connection(conn)
    }

    /// Create an in-memory comment database (for testing).
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        // Cascading deletes depend on this; SQLite ships with it off.
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .context("Failed to enable foreign keys")?;
        Ok(Self {
            conn,
            last_ts: Cell::new(None),
        })
    }

    /// Initialize the database schema.
    ///
    /// Creates all tables and indexes if they don't exist.
    pub fn init_schema(&self) -> Result<()> {
        self.conn
            .execute_batch(SCHEMA_SQL)
            .context("Failed to initialize schema")?;
        Ok(())
    }

    /// Get a reference to the underlying connection (for advanced queries).
    #[must_use]
    pub const fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Issue a timestamp strictly later than every earlier one from this
    /// database and than `floor`, if given.
    fn next_timestamp(&self, floor: Option<&str>) -> String {
        let floor = floor
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc));
        let last = match (self.last_ts.get(), floor) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };

        let mut now = Utc::now();
        if let Some(last) = last {
            if now <= last {
                now = last + chrono::Duration::nanoseconds(1);
            }
        }
        self.last_ts.set(Some(now));
        format_timestamp(now)
    }
}

/// Fixed-width RFC 3339 so that text ordering matches time ordering.
fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

impl PostLookup for CommentDb {
    fn find_post(&self, post_id: PostId) -> CoreResult<Option<Post>> {
        Ok(self.get_post(post_id)?)
    }
}

impl CommentStore for CommentDb {
    fn list_comments(&self, post_id: PostId) -> CoreResult<Vec<AuthoredComment>> {
        Ok(self.list_comments_for_post(post_id)?)
    }

    fn find_comment(&self, comment_id: CommentId) -> CoreResult<Option<Comment>> {
        Ok(self.get_comment(comment_id)?)
    }

    fn create_comment(
        &self,
        author_id: UserId,
        post_id: PostId,
        content: &str,
    ) -> CoreResult<Comment> {
        if content.is_empty() {
            return Err(CoreError::validation("content required"));
        }
        if self.get_post(post_id)?.is_none() {
            return Err(CoreError::validation(format!(
                "post {post_id} does not exist"
            )));
        }
        if self.get_user(author_id)?.is_none() {
            return Err(CoreError::validation(format!(
                "author {author_id} does not exist"
            )));
        }

        let now = self.next_timestamp(None);
        Ok(self.insert_comment(author_id, post_id, content, &now)?)
    }

    fn update_comment(&self, comment_id: CommentId, content: &str) -> CoreResult<Comment> {
        if content.is_empty() {
            return Err(CoreError::validation("content required"));
        }
        let existing = self
            .get_comment(comment_id)?
            .ok_or(CoreError::not_found("comment"))?;

        let now = self.next_timestamp(Some(&existing.updated_at));
        self.set_comment_content(comment_id, content, &now)?
            .ok_or(CoreError::not_found("comment"))
    }

    fn delete_comment(&self, comment_id: CommentId, author_id: UserId) -> CoreResult<usize> {
        Ok(self.delete_owned_comment(comment_id, author_id)?)
    }
}

// ============================================================================
// Schema
// ============================================================================

const SCHEMA_SQL: &str = r"
-- USERS
CREATE TABLE IF NOT EXISTS users (
    user_id INTEGER PRIMARY KEY AUTOINCREMENT,
    nickname TEXT NOT NULL UNIQUE CHECK (length(nickname) > 0),
    created_at TEXT NOT NULL
);

-- POSTS
CREATE TABLE IF NOT EXISTS posts (
    post_id INTEGER PRIMARY KEY AUTOINCREMENT,
    author_id INTEGER NOT NULL
        REFERENCES users(user_id) ON DELETE CASCADE ON UPDATE CASCADE,
    title TEXT NOT NULL CHECK (length(title) > 0),
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_posts_author ON posts(author_id);

-- COMMENTS
CREATE TABLE IF NOT EXISTS comments (
    comment_id INTEGER PRIMARY KEY AUTOINCREMENT,
    author_id INTEGER NOT NULL
        REFERENCES users(user_id) ON DELETE CASCADE ON UPDATE CASCADE,
    post_id INTEGER NOT NULL
        REFERENCES posts(post_id) ON DELETE CASCADE ON UPDATE CASCADE,
    content TEXT NOT NULL CHECK (length(content) > 0),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_comments_post_created ON comments(post_id, created_at DESC);
CREATE INDEX IF NOT EXISTS idx_comments_author ON comments(author_id);
";
