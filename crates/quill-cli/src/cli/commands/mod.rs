//! Command implementations.

mod comments;
pub mod helpers;
mod init;
mod posts;
mod users;

pub use comments::{run_comments_add, run_comments_delete, run_comments_edit, run_comments_list};
pub use init::run_init;
pub use posts::{run_posts_add, run_posts_delete};
pub use users::{run_users_add, run_users_delete};
