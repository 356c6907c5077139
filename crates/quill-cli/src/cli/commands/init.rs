//! Implementation of `quill init`.

use anyhow::Result;
use quill_core::core::CoreContext;

use crate::output::{Formatter, OutputFormat};

/// Create the comment database and schema.
pub fn run_init(ctx: &CoreContext, format: OutputFormat) -> Result<()> {
    ctx.init()?;

    let output = serde_json::json!({
        "message": "initialized",
        "db": ctx.db_path().display().to_string(),
    });
    Formatter::new(format).print(&output)
}
