//! Caller identity resolution.
//!
//! Stands in for the authentication middleware of a web deployment: a
//! request is attributed to a user ID taken from an explicit override or
//! the environment, and that user must exist before any comment operation
//! runs.

use std::env;

use crate::core::{CoreError, CoreResult};
use crate::store::{CommentDb, User, UserId};

/// Environment variables checked for the caller's user ID, in priority order.
const IDENTITY_VARS: &[&str] = &["QUILL_USER", "QUILL_USER_ID"];

/// Resolve the caller's user ID.
///
/// Resolution order:
/// 1. Explicit override (`--as`)
/// 2. `QUILL_USER` environment variable
/// 3. `QUILL_USER_ID` environment variable
pub fn resolve_user_id(explicit: Option<UserId>) -> CoreResult<UserId> {
    resolve_user_id_with(explicit, |var| env::var(var).ok())
}

fn resolve_user_id_with(
    explicit: Option<UserId>,
    lookup: impl Fn(&str) -> Option<String>,
) -> CoreResult<UserId> {
    if let Some(id) = explicit {
        return Ok(id);
    }

    for &var in IDENTITY_VARS {
        let Some(raw) = lookup(var) else { continue };
        let raw = raw.trim();
        if !raw.is_empty() {
            return raw
                .parse()
                .map_err(|_| CoreError::Unauthenticated {
                    reason: format!("{var}={raw} is not a user ID"),
                });
        }
    }

    Err(CoreError::Unauthenticated {
        reason: "no user given. Use --as <user_id> or set QUILL_USER".to_string(),
    })
}

/// Resolve the caller and confirm the user exists.
pub fn authenticate(db: &CommentDb, explicit: Option<UserId>) -> CoreResult<User> {
    let user_id = resolve_user_id(explicit)?;
    let user = db
        .get_user(user_id)?
        .ok_or_else(|| CoreError::Unauthenticated {
            reason: format!("unknown user {user_id}"),
        })?;
    tracing::debug!(user_id, nickname = %user.nickname, "authenticated caller");
    Ok(user)
}
