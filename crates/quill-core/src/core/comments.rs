//! Comment service: list, create, update, delete comments on a post.
//!
//! Each operation checks its preconditions in a fixed order and stops at
//! the first failure, so the same bad request always yields the same error.

use serde::Serialize;
use tracing::{debug, error, warn};

use crate::store::{Comment, CommentId, CommentStore, Post, PostId, PostLookup, UserId};

use super::{Ack, CoreError, CoreResult};

/// One entry of a post's comment listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentListing {
    pub comment_id: CommentId,
    pub author_nickname: String,
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Service for comment operations.
pub struct CommentService<'a> {
    posts: &'a dyn PostLookup,
    comments: &'a dyn CommentStore,
}

impl<'a> CommentService<'a> {
    /// Build a service over the given post lookup and comment store.
    #[must_use]
    pub fn new(posts: &'a dyn PostLookup, comments: &'a dyn CommentStore) -> Self {
        Self { posts, comments }
    }

    /// List a post's comments, newest first.
    ///
    /// Fails with `NotFound("comments")` when the post has none.
    #[tracing::instrument(skip(self))]
    pub fn list(&self, post_id: PostId) -> CoreResult<Vec<CommentListing>> {
        let result = self.try_list(post_id);
        log_outcome("list", result)
    }

    fn try_list(&self, post_id: PostId) -> CoreResult<Vec<CommentListing>> {
        self.require_post(post_id)?;

        let comments = self.comments.list_comments(post_id)?;
        if comments.is_empty() {
            return Err(CoreError::not_found("comments"));
        }

        Ok(comments
            .into_iter()
            .map(|c| CommentListing {
                comment_id: c.comment.comment_id,
                author_nickname: c.author_nickname,
                content: c.comment.content,
                created_at: c.comment.created_at,
                updated_at: c.comment.updated_at,
            })
            .collect())
    }

    /// Add a comment to a post as `author_id`.
    ///
    /// Content is checked before the post, so empty content is a validation
    /// error even on a missing post.
    #[tracing::instrument(skip(self, content))]
    pub fn create(
        &self,
        post_id: PostId,
        author_id: UserId,
        content: Option<&str>,
    ) -> CoreResult<Ack> {
        let result = self.try_create(post_id, author_id, content);
        log_outcome("create", result)
    }

    fn try_create(
        &self,
        post_id: PostId,
        author_id: UserId,
        content: Option<&str>,
    ) -> CoreResult<Ack> {
        let content = require_content(content)?;
        self.require_post(post_id)?;

        let comment = self.comments.create_comment(author_id, post_id, content)?;
        debug!(comment_id = comment.comment_id, "comment created");
        Ok(Ack::with_comment("comment created", comment.comment_id))
    }

    /// Replace the content of a comment owned by `author_id`.
    ///
    /// Ownership is checked before content: a non-author sending empty
    /// content gets `Forbidden`, not a validation error.
    #[tracing::instrument(skip(self, content))]
    pub fn update(
        &self,
        post_id: PostId,
        comment_id: CommentId,
        author_id: UserId,
        content: Option<&str>,
    ) -> CoreResult<Ack> {
        let result = self.try_update(post_id, comment_id, author_id, content);
        log_outcome("update", result)
    }

    fn try_update(
        &self,
        post_id: PostId,
        comment_id: CommentId,
        author_id: UserId,
        content: Option<&str>,
    ) -> CoreResult<Ack> {
        self.require_post(post_id)?;
        let comment = self.require_comment(post_id, comment_id)?;
        require_owner(&comment, author_id)?;
        let content = require_content(content)?;

        self.comments.update_comment(comment_id, content)?;
        Ok(Ack::with_comment("comment updated", comment_id))
    }

    /// Delete a comment owned by `author_id`.
    #[tracing::instrument(skip(self))]
    pub fn delete(
        &self,
        post_id: PostId,
        comment_id: CommentId,
        author_id: UserId,
    ) -> CoreResult<Ack> {
        let result = self.try_delete(post_id, comment_id, author_id);
        log_outcome("delete", result)
    }

    fn try_delete(
        &self,
        post_id: PostId,
        comment_id: CommentId,
        author_id: UserId,
    ) -> CoreResult<Ack> {
        self.require_post(post_id)?;
        let comment = self.require_comment(post_id, comment_id)?;
        require_owner(&comment, author_id)?;

        // The store filters on the author again; ownership is never implied
        // by the comment ID alone.
        let removed = self.comments.delete_comment(comment_id, author_id)?;
        if removed == 0 {
            warn!(comment_id, "comment vanished between ownership check and delete");
        }
        Ok(Ack::with_comment("comment deleted", comment_id))
    }

    fn require_post(&self, post_id: PostId) -> CoreResult<Post> {
        self.posts
            .find_post(post_id)?
            .ok_or(CoreError::not_found("post"))
    }

    /// Find a comment that belongs to `post_id`.
    fn require_comment(&self, post_id: PostId, comment_id: CommentId) -> CoreResult<Comment> {
        self.comments
            .find_comment(comment_id)?
            .filter(|c| c.post_id == post_id)
            .ok_or(CoreError::not_found("comment"))
    }
}

fn require_content(content: Option<&str>) -> CoreResult<&str> {
    match content {
        Some(c) if !c.is_empty() => Ok(c),
        _ => Err(CoreError::validation("content required")),
    }
}

fn require_owner(comment: &Comment, author_id: UserId) -> CoreResult<()> {
    if comment.author_id == author_id {
        Ok(())
    } else {
        Err(CoreError::Forbidden {
            resource: "comment",
            resource_id: comment.comment_id,
            user_id: author_id,
        })
    }
}

/// Expected failures are logged quietly; store failures loudly.
fn log_outcome<T>(op: &'static str, result: CoreResult<T>) -> CoreResult<T> {
    match &result {
        Err(CoreError::Internal(err)) => error!(op, error = ?err, "comment operation failed"),
        Err(err) => debug!(op, kind = err.kind().as_str(), %err, "comment request rejected"),
        Ok(_) => {}
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ErrorKind;
    use crate::store::{AuthoredComment, CommentDb, User};

    fn setup_db() -> CommentDb {
        let db = CommentDb::open_in_memory().unwrap();
        db.init_schema().unwrap();
        db
    }

    struct Fixture {
        db: CommentDb,
        alice: User,
        bob: User,
        post: Post,
    }

    impl Fixture {
        fn new() -> Self {
            let db = setup_db();
            let alice = db.insert_user("alice").unwrap();
            let bob = db.insert_user("bob").unwrap();
            let post = db.insert_post(alice.user_id, "First post").unwrap();
            Self {
                db,
                alice,
                bob,
                post,
            }
        }

        fn service(&self) -> CommentService<'_> {
            CommentService::new(&self.db, &self.db)
        }

        fn comment_by(&self, author: &User, content: &str) -> CommentId {
            self.service()
                .create(self.post.post_id, author.user_id, Some(content))
                .unwrap()
                .comment_id
                .unwrap()
        }

        fn missing_post(&self) -> PostId {
            self.post.post_id + 100
        }
    }

    // ========================================================================
    // list
    // ========================================================================

    #[test]
    fn test_list_missing_post() {
        let fx = Fixture::new();
        let err = fx.service().list(fx.missing_post()).unwrap_err();
        assert!(matches!(err, CoreError::NotFound { resource: "post" }));
    }

    #[test]
    fn test_list_no_comments() {
        let fx = Fixture::new();
        let err = fx.service().list(fx.post.post_id).unwrap_err();
        assert!(matches!(err, CoreError::NotFound { resource: "comments" }));
    }

    #[test]
    fn test_list_projects_nickname() {
        let fx = Fixture::new();
        let id = fx.comment_by(&fx.bob, "hello");

        let listed = fx.service().list(fx.post.post_id).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].comment_id, id);
        assert_eq!(listed[0].author_nickname, "bob");
        assert_eq!(listed[0].content, "hello");
    }

    #[test]
    fn test_list_newest_first() {
        let fx = Fixture::new();
        let ids: Vec<_> = (0..4)
            .map(|i| fx.comment_by(&fx.alice, &format!("c{i}")))
            .collect();

        let listed = fx.service().list(fx.post.post_id).unwrap();
        let listed_ids: Vec<_> = listed.iter().map(|c| c.comment_id).collect();
        let mut expected = ids;
        expected.reverse();
        assert_eq!(listed_ids, expected);
        assert!(listed.windows(2).all(|w| w[0].created_at > w[1].created_at));
    }

    // ========================================================================
    // create
    // ========================================================================

    #[test]
    fn test_create_acknowledges() {
        let fx = Fixture::new();
        let ack = fx
            .service()
            .create(fx.post.post_id, fx.bob.user_id, Some("hello"))
            .unwrap();
        assert_eq!(ack.message, "comment created");

        let stored = fx.db.get_comment(ack.comment_id.unwrap()).unwrap().unwrap();
        assert_eq!(stored.author_id, fx.bob.user_id);
        assert_eq!(stored.post_id, fx.post.post_id);
    }

    #[test]
    fn test_create_empty_content_checked_before_post() {
        let fx = Fixture::new();
        for post_id in [fx.post.post_id, fx.missing_post()] {
            for content in [None, Some("")] {
                let err = fx
                    .service()
                    .create(post_id, fx.alice.user_id, content)
                    .unwrap_err();
                assert_eq!(err.kind(), ErrorKind::Validation);
            }
        }
    }

    #[test]
    fn test_create_missing_post() {
        let fx = Fixture::new();
        let err = fx
            .service()
            .create(fx.missing_post(), fx.alice.user_id, Some("hello"))
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound { resource: "post" }));
    }

    // ========================================================================
    // update
    // ========================================================================

    #[test]
    fn test_update_by_author() {
        let fx = Fixture::new();
        let id = fx.comment_by(&fx.alice, "hello");
        let before = fx.db.get_comment(id).unwrap().unwrap();

        let ack = fx
            .service()
            .update(fx.post.post_id, id, fx.alice.user_id, Some("edited"))
            .unwrap();
        assert_eq!(ack.message, "comment updated");

        let after = fx.db.get_comment(id).unwrap().unwrap();
        assert_eq!(after.content, "edited");
        assert!(after.updated_at > before.updated_at);
        assert_eq!(after.created_at, before.created_at);
        assert_eq!(after.author_id, before.author_id);
        assert_eq!(after.post_id, before.post_id);
    }

    #[test]
    fn test_update_by_other_user_forbidden() {
        let fx = Fixture::new();
        let id = fx.comment_by(&fx.alice, "hello");

        let err = fx
            .service()
            .update(fx.post.post_id, id, fx.bob.user_id, Some("edited"))
            .unwrap_err();
        assert!(matches!(err, CoreError::Forbidden { .. }));
        assert_eq!(fx.db.get_comment(id).unwrap().unwrap().content, "hello");
    }

    #[test]
    fn test_update_ownership_checked_before_content() {
        let fx = Fixture::new();
        let id = fx.comment_by(&fx.alice, "hello");

        let err = fx
            .service()
            .update(fx.post.post_id, id, fx.bob.user_id, Some(""))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);

        let err = fx
            .service()
            .update(fx.post.post_id, id, fx.alice.user_id, None)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_update_missing_post_and_comment() {
        let fx = Fixture::new();
        let id = fx.comment_by(&fx.alice, "hello");

        let err = fx
            .service()
            .update(fx.missing_post(), id, fx.alice.user_id, Some("x"))
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound { resource: "post" }));

        let err = fx
            .service()
            .update(fx.post.post_id, id + 1, fx.alice.user_id, Some("x"))
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound { resource: "comment" }));
    }

    #[test]
    fn test_update_comment_on_other_post_not_found() {
        let fx = Fixture::new();
        let other = fx.db.insert_post(fx.alice.user_id, "Second post").unwrap();
        let id = fx.comment_by(&fx.alice, "hello");

        let err = fx
            .service()
            .update(other.post_id, id, fx.alice.user_id, Some("x"))
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound { resource: "comment" }));
    }

    // ========================================================================
    // delete
    // ========================================================================

    #[test]
    fn test_delete_by_author_then_update_not_found() {
        let fx = Fixture::new();
        let id = fx.comment_by(&fx.alice, "hello");

        let ack = fx
            .service()
            .delete(fx.post.post_id, id, fx.alice.user_id)
            .unwrap();
        assert_eq!(ack.message, "comment deleted");
        assert!(fx.db.get_comment(id).unwrap().is_none());

        let err = fx
            .service()
            .update(fx.post.post_id, id, fx.alice.user_id, Some("again"))
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound { resource: "comment" }));
    }

    #[test]
    fn test_delete_by_other_user_forbidden() {
        let fx = Fixture::new();
        let id = fx.comment_by(&fx.alice, "hello");

        let err = fx
            .service()
            .delete(fx.post.post_id, id, fx.bob.user_id)
            .unwrap_err();
        assert!(matches!(err, CoreError::Forbidden { .. }));
        assert!(fx.db.get_comment(id).unwrap().is_some());
    }

    #[test]
    fn test_delete_comment_on_other_post_not_found() {
        let fx = Fixture::new();
        let other = fx.db.insert_post(fx.alice.user_id, "Second post").unwrap();
        let id = fx.comment_by(&fx.alice, "hello");

        let err = fx
            .service()
            .delete(other.post_id, id, fx.alice.user_id)
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound { resource: "comment" }));
        assert!(fx.db.get_comment(id).unwrap().is_some());
    }

    #[test]
    fn test_delete_missing_post_and_comment() {
        let fx = Fixture::new();
        let err = fx
            .service()
            .delete(fx.missing_post(), 1, fx.alice.user_id)
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound { resource: "post" }));

        let err = fx
            .service()
            .delete(fx.post.post_id, 99, fx.alice.user_id)
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound { resource: "comment" }));
    }

    // ========================================================================
    // store failures and races
    // ========================================================================

    /// Store whose comment side always fails.
    struct BrokenStore;

    impl CommentStore for BrokenStore {
        fn list_comments(&self, _: PostId) -> CoreResult<Vec<AuthoredComment>> {
            Err(anyhow::anyhow!("database is locked").into())
        }

        fn find_comment(&self, _: CommentId) -> CoreResult<Option<Comment>> {
            Err(anyhow::anyhow!("database is locked").into())
        }

        fn create_comment(&self, _: UserId, _: PostId, _: &str) -> CoreResult<Comment> {
            Err(anyhow::anyhow!("database is locked").into())
        }

        fn update_comment(&self, _: CommentId, _: &str) -> CoreResult<Comment> {
            Err(anyhow::anyhow!("database is locked").into())
        }

        fn delete_comment(&self, _: CommentId, _: UserId) -> CoreResult<usize> {
            Err(anyhow::anyhow!("database is locked").into())
        }
    }

    #[test]
    fn test_store_failure_is_internal() {
        let fx = Fixture::new();
        let service = CommentService::new(&fx.db, &BrokenStore);

        assert_eq!(
            service.list(fx.post.post_id).unwrap_err().kind(),
            ErrorKind::Internal
        );
        assert_eq!(
            service
                .create(fx.post.post_id, fx.alice.user_id, Some("hello"))
                .unwrap_err()
                .kind(),
            ErrorKind::Internal
        );
        assert_eq!(
            service
                .delete(fx.post.post_id, 1, fx.alice.user_id)
                .unwrap_err()
                .kind(),
            ErrorKind::Internal
        );
    }

    /// Store that reports a comment but finds nothing to delete, as when a
    /// concurrent request removed it first.
    struct RacingStore(Comment);

    impl CommentStore for RacingStore {
        fn list_comments(&self, _: PostId) -> CoreResult<Vec<AuthoredComment>> {
            Ok(Vec::new())
        }

        fn find_comment(&self, _: CommentId) -> CoreResult<Option<Comment>> {
            Ok(Some(self.0.clone()))
        }

        fn create_comment(&self, _: UserId, _: PostId, _: &str) -> CoreResult<Comment> {
            Ok(self.0.clone())
        }

        fn update_comment(&self, _: CommentId, _: &str) -> CoreResult<Comment> {
            Err(CoreError::not_found("comment"))
        }

        fn delete_comment(&self, _: CommentId, _: UserId) -> CoreResult<usize> {
            Ok(0)
        }
    }

    #[test]
    fn test_delete_race_still_acknowledged() {
        let fx = Fixture::new();
        let store = RacingStore(Comment {
            comment_id: 1,
            author_id: fx.alice.user_id,
            post_id: fx.post.post_id,
            content: "hello".to_string(),
            created_at: "2026-01-01T00:00:00.000000000Z".to_string(),
            updated_at: "2026-01-01T00:00:00.000000000Z".to_string(),
        });
        let service = CommentService::new(&fx.db, &store);

        let ack = service.delete(fx.post.post_id, 1, fx.alice.user_id).unwrap();
        assert_eq!(ack.comment_id, Some(1));

        let err = service
            .update(fx.post.post_id, 1, fx.alice.user_id, Some("late"))
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound { resource: "comment" }));
    }
}
