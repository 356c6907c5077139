//! quill-core: comment lifecycle and authorization for a blog-post service.
//!
//! This crate owns the comment store, caller identity resolution, and the
//! service layer that enforces existence and ownership rules.

pub mod core;
pub mod identity;
pub mod store;
