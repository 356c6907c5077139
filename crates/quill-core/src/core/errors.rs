//! Typed error types for the quill-core service layer.

use thiserror::Error;

use crate::store::UserId;

/// Result type alias for core service operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in the quill-core service layer.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The comment database has not been created yet.
    #[error("No comment database at {path}. Run 'quill init' first.")]
    NotInitialized { path: String },

    /// Request input is missing or malformed.
    #[error("{message}")]
    Validation { message: String },

    /// A referenced post, comment, or user does not exist.
    #[error("{resource} not found")]
    NotFound { resource: &'static str },

    /// The caller is authenticated but does not own the resource.
    #[error("User {user_id} is not the author of {resource} {resource_id}")]
    Forbidden {
        resource: &'static str,
        resource_id: i64,
        user_id: UserId,
    },

    /// No caller identity could be established.
    #[error("Authentication required: {reason}")]
    Unauthenticated { reason: String },

    /// An internal storage or database error.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CoreError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub(crate) const fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }

    /// Classify this error for transport layers.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotInitialized { .. } => ErrorKind::NotInitialized,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::Unauthenticated { .. } => ErrorKind::Unauthenticated,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }
}

/// Coarse error classification shared by every transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotInitialized,
    Validation,
    NotFound,
    Forbidden,
    Unauthenticated,
    Internal,
}

impl ErrorKind {
    /// Stable machine-readable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotInitialized => "not_initialized",
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::Forbidden => "forbidden",
            Self::Unauthenticated => "unauthenticated",
            Self::Internal => "internal",
        }
    }

    /// Status code an HTTP transport would answer with.
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::Validation => 400,
            Self::Unauthenticated => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::NotInitialized => 503,
            Self::Internal => 500,
        }
    }
}
