//! Service layer for quill-core.
//!
//! Provides typed, high-level APIs for comment operations and for the user
//! and post directory they hang off. The service layer hides database
//! management behind a clean interface.
//!
//! # Usage
//!
//! ```no_run
//! use std::path::Path;
//! use quill_core::core::CoreContext;
//!
//! let ctx = CoreContext::new(Path::new(".quill/comments.db"));
//! let services = ctx.services().unwrap();
//! let comments = services.comments().list(1).unwrap();
//! ```

pub mod comments;
pub mod directory;
pub mod errors;

pub use errors::{CoreError, CoreResult, ErrorKind};

use std::env;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::identity;
use crate::store::{CommentDb, CommentId, User, UserId};

/// Environment variable overriding the database location.
pub const DB_PATH_VAR: &str = "QUILL_DB";

/// Database location used when neither `--db` nor `QUILL_DB` is set.
pub const DEFAULT_DB_PATH: &str = ".quill/comments.db";

/// Acknowledgment returned by mutating operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ack {
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_id: Option<CommentId>,
}

impl Ack {
    pub(crate) const fn new(message: &'static str) -> Self {
        Self {
            message,
            comment_id: None,
        }
    }

    pub(crate) const fn with_comment(message: &'static str, comment_id: CommentId) -> Self {
        Self {
            message,
            comment_id: Some(comment_id),
        }
    }
}

/// Context for quill-core services.
///
/// Holds the resolved location of the comment database. Create one per
/// process and open services from it as needed.
#[derive(Debug, Clone)]
pub struct CoreContext {
    db_path: PathBuf,
}

impl CoreContext {
    /// Create a context for the database at `db_path`.
    #[must_use]
    pub fn new(db_path: &Path) -> Self {
        Self {
            db_path: db_path.to_path_buf(),
        }
    }

    /// Create a context from an optional explicit path.
    ///
    /// Resolution order:
    /// 1. Explicit path (`--db`)
    /// 2. `QUILL_DB` environment variable
    /// 3. `.quill/comments.db`
    #[must_use]
    pub fn resolve(explicit: Option<&Path>) -> Self {
        let path = explicit.map_or_else(
            || {
                env::var(DB_PATH_VAR)
                    .ok()
                    .filter(|s| !s.is_empty())
                    .map_or_else(|| PathBuf::from(DEFAULT_DB_PATH), PathBuf::from)
            },
            Path::to_path_buf,
        );
        Self { db_path: path }
    }

    /// Path to the comment database.
    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Create the database file and schema. Safe to run more than once.
    pub fn init(&self) -> CoreResult<()> {
        let db = CommentDb::open(&self.db_path)?;
        db.init_schema()?;
        tracing::info!(path = %self.db_path.display(), "initialized comment database");
        Ok(())
    }

    /// Open the existing database.
    ///
    /// Fails with `NotInitialized` if `init` has never run for this path.
    pub fn open(&self) -> CoreResult<CommentDb> {
        if !self.db_path.exists() {
            return Err(CoreError::NotInitialized {
                path: self.db_path.display().to_string(),
            });
        }
        let db = CommentDb::open(&self.db_path)?;
        db.init_schema()?;
        Ok(db)
    }

    /// Create a `QuillServices` instance backed by this context.
    pub fn services(&self) -> CoreResult<QuillServices> {
        let db = self.open()?;
        Ok(QuillServices { db })
    }
}

/// Facade providing all quill service APIs over one open database.
pub struct QuillServices {
    db: CommentDb,
}

impl QuillServices {
    /// Wrap an already-open database.
    #[must_use]
    pub const fn from_db(db: CommentDb) -> Self {
        Self { db }
    }

    /// Access comment operations.
    #[must_use]
    pub fn comments(&self) -> comments::CommentService<'_> {
        comments::CommentService::new(&self.db, &self.db)
    }

    /// Access user and post directory operations.
    #[must_use]
    pub fn directory(&self) -> directory::DirectoryService<'_> {
        directory::DirectoryService::new(&self.db)
    }

    /// Resolve and verify the calling user.
    pub fn authenticate(&self, explicit: Option<UserId>) -> CoreResult<User> {
        identity::authenticate(&self.db, explicit)
    }

    /// Get a reference to the underlying database.
    ///
    /// Useful for advanced queries not covered by the service layer.
    #[must_use]
    pub const fn db(&self) -> &CommentDb {
        &self.db
    }
}
