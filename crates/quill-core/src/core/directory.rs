//! Directory service: the users and posts that comments reference.
//!
//! Removing a user or post also removes every comment that depends on it;
//! the database does that through its foreign keys.

use crate::store::{CommentDb, Post, PostId, User, UserId};

use super::{Ack, CoreError, CoreResult};

/// Service for user and post records.
pub struct DirectoryService<'a> {
    db: &'a CommentDb,
}

impl<'a> DirectoryService<'a> {
    pub(crate) const fn new(db: &'a CommentDb) -> Self {
        Self { db }
    }

    /// Register a user under a unique, non-empty nickname.
    #[tracing::instrument(skip(self))]
    pub fn add_user(&self, nickname: &str) -> CoreResult<User> {
        if nickname.is_empty() {
            return Err(CoreError::validation("nickname required"));
        }
        if self.db.get_user_by_nickname(nickname)?.is_some() {
            return Err(CoreError::validation(format!(
                "nickname '{nickname}' is already taken"
            )));
        }
        Ok(self.db.insert_user(nickname)?)
    }

    /// Remove a user with their posts and comments.
    ///
    /// Users may only remove themselves.
    #[tracing::instrument(skip(self))]
    pub fn remove_user(&self, user_id: UserId, caller: UserId) -> CoreResult<Ack> {
        if user_id != caller {
            return Err(CoreError::Forbidden {
                resource: "user",
                resource_id: user_id,
                user_id: caller,
            });
        }
        if self.db.delete_user(user_id)? == 0 {
            return Err(CoreError::not_found("user"));
        }
        Ok(Ack::new("user deleted"))
    }

    /// Publish a post as `author_id`.
    #[tracing::instrument(skip(self))]
    pub fn add_post(&self, author_id: UserId, title: &str) -> CoreResult<Post> {
        if title.is_empty() {
            return Err(CoreError::validation("title required"));
        }
        if self.db.get_user(author_id)?.is_none() {
            return Err(CoreError::not_found("user"));
        }
        Ok(self.db.insert_post(author_id, title)?)
    }

    /// Remove a post with its comments.
    ///
    /// Only the post's author may remove it.
    #[tracing::instrument(skip(self))]
    pub fn remove_post(&self, post_id: PostId, caller: UserId) -> CoreResult<Ack> {
        let post = self
            .db
            .get_post(post_id)?
            .ok_or(CoreError::not_found("post"))?;
        if post.author_id != caller {
            return Err(CoreError::Forbidden {
                resource: "post",
                resource_id: post_id,
                user_id: caller,
            });
        }
        let comments = self.db.count_comments_for_post(post_id)?;
        self.db.delete_post(post_id)?;
        tracing::debug!(post_id, comments, "post deleted with its comments");
        Ok(Ack::new("post deleted"))
    }
}
