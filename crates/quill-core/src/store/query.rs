//! Row types and SQL for the comment database.
//!
//! All result types implement Serialize for text/JSON output.

use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension, Row};
use serde::Serialize;

use super::{CommentDb, CommentId, PostId, UserId};

// ============================================================================
// Query Result Types
// ============================================================================

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub user_id: UserId,
    pub nickname: String,
    pub created_at: String,
}

/// A blog post that comments attach to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    pub post_id: PostId,
    pub author_id: UserId,
    pub title: String,
    pub created_at: String,
}

/// A stored comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    pub comment_id: CommentId,
    pub author_id: UserId,
    pub post_id: PostId,
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
}

/// A comment joined with its author's nickname.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthoredComment {
    #[serde(flatten)]
    pub comment: Comment,
    pub author_nickname: String,
}

const COMMENT_COLUMNS: &str =
    "comment_id, author_id, post_id, content, created_at, updated_at";

impl Comment {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            comment_id: row.get(0)?,
            author_id: row.get(1)?,
            post_id: row.get(2)?,
            content: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }
}

impl User {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            user_id: row.get(0)?,
            nickname: row.get(1)?,
            created_at: row.get(2)?,
        })
    }
}

impl Post {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            post_id: row.get(0)?,
            author_id: row.get(1)?,
            title: row.get(2)?,
            created_at: row.get(3)?,
        })
    }
}

// ============================================================================
// Query Functions
// ============================================================================

impl CommentDb {
    // ========================================================================
    // Users
    // ========================================================================

    /// Insert a user and return the stored row.
    pub fn insert_user(&self, nickname: &str) -> Result<User> {
        let now = self.next_timestamp(None);
        self.conn
            .query_row(
                "INSERT INTO users (nickname, created_at) VALUES (?, ?)
                 RETURNING user_id, nickname, created_at",
                params![nickname, now],
                User::from_row,
            )
            .with_context(|| format!("Failed to insert user {nickname}"))
    }

    /// Get a user by ID.
    pub fn get_user(&self, user_id: UserId) -> Result<Option<User>> {
        self.conn
            .query_row(
                "SELECT user_id, nickname, created_at FROM users WHERE user_id = ?",
                params![user_id],
                User::from_row,
            )
            .optional()
            .context("Failed to query user")
    }

    /// Get a user by nickname.
    pub fn get_user_by_nickname(&self, nickname: &str) -> Result<Option<User>> {
        self.conn
            .query_row(
                "SELECT user_id, nickname, created_at FROM users WHERE nickname = ?",
                params![nickname],
                User::from_row,
            )
            .optional()
            .context("Failed to query user by nickname")
    }

    /// Delete a user. Their posts and comments go with them.
    ///
    /// Returns the number of rows removed from `users`.
    pub fn delete_user(&self, user_id: UserId) -> Result<usize> {
        self.conn
            .execute("DELETE FROM users WHERE user_id = ?", params![user_id])
            .context("Failed to delete user")
    }

    // ========================================================================
    // Posts
    // ========================================================================

    /// Insert a post and return the stored row.
    pub fn insert_post(&self, author_id: UserId, title: &str) -> Result<Post> {
        let now = self.next_timestamp(None);
        self.conn
            .query_row(
                "INSERT INTO posts (author_id, title, created_at) VALUES (?, ?, ?)
                 RETURNING post_id, author_id, title, created_at",
                params![author_id, title, now],
                Post::from_row,
            )
            .context("Failed to insert post")
    }

    /// Get a post by ID.
    pub fn get_post(&self, post_id: PostId) -> Result<Option<Post>> {
        self.conn
            .query_row(
                "SELECT post_id, author_id, title, created_at FROM posts WHERE post_id = ?",
                params![post_id],
                Post::from_row,
            )
            .optional()
            .context("Failed to query post")
    }

    /// Delete a post. Its comments go with it.
    ///
    /// Returns the number of rows removed from `posts`.
    pub fn delete_post(&self, post_id: PostId) -> Result<usize> {
        self.conn
            .execute("DELETE FROM posts WHERE post_id = ?", params![post_id])
            .context("Failed to delete post")
    }

    // ========================================================================
    // Comments
    // ========================================================================

    /// Get a comment by ID.
    pub fn get_comment(&self, comment_id: CommentId) -> Result<Option<Comment>> {
        self.conn
            .query_row(
                &format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE comment_id = ?"),
                params![comment_id],
                Comment::from_row,
            )
            .optional()
            .context("Failed to query comment")
    }

    /// List all comments for a post with author nicknames.
    ///
    /// Returns comments sorted newest first; ties fall back to the later ID.
    pub fn list_comments_for_post(&self, post_id: PostId) -> Result<Vec<AuthoredComment>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT c.comment_id, c.author_id, c.post_id, c.content,
                        c.created_at, c.updated_at, u.nickname
                 FROM comments c
                 JOIN users u ON u.user_id = c.author_id
                 WHERE c.post_id = ?
                 ORDER BY c.created_at DESC, c.comment_id DESC",
            )
            .context("Failed to prepare list_comments query")?;

        let rows = stmt
            .query_map(params![post_id], |row| {
                Ok(AuthoredComment {
                    comment: Comment::from_row(row)?,
                    author_nickname: row.get(6)?,
                })
            })
            .context("Failed to execute list_comments query")?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row.context("Failed to read comment row")?);
        }
        Ok(results)
    }

    /// Count comments on a post.
    pub fn count_comments_for_post(&self, post_id: PostId) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM comments WHERE post_id = ?",
                params![post_id],
                |row| row.get(0),
            )
            .context("Failed to count comments")?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// Insert a comment and return the stored row.
    pub(super) fn insert_comment(
        &self,
        author_id: UserId,
        post_id: PostId,
        content: &str,
        now: &str,
    ) -> Result<Comment> {
        self.conn
            .query_row(
                &format!(
                    "INSERT INTO comments (author_id, post_id, content, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?4)
                     RETURNING {COMMENT_COLUMNS}"
                ),
                params![author_id, post_id, content, now],
                Comment::from_row,
            )
            .context("Failed to insert comment")
    }

    /// Replace a comment's content. Returns `None` if the comment is gone.
    pub(super) fn set_comment_content(
        &self,
        comment_id: CommentId,
        content: &str,
        now: &str,
    ) -> Result<Option<Comment>> {
        self.conn
            .query_row(
                &format!(
                    "UPDATE comments SET content = ?, updated_at = ?
                     WHERE comment_id = ?
                     RETURNING {COMMENT_COLUMNS}"
                ),
                params![content, now, comment_id],
                Comment::from_row,
            )
            .optional()
            .context("Failed to update comment")
    }

    /// Delete a comment only if it belongs to `author_id`.
    pub(super) fn delete_owned_comment(
        &self,
        comment_id: CommentId,
        author_id: UserId,
    ) -> Result<usize> {
        self.conn
            .execute(
                "DELETE FROM comments WHERE comment_id = ? AND author_id = ?",
                params![comment_id, author_id],
            )
            .context("Failed to delete comment")
    }
}

// ============================================================================
// Tests
// ============================================================================
