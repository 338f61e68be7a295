//! Request entry points, one per input format.

pub(crate) mod csv;
pub(crate) mod json;

use crate::context::LoadContext;
use crate::error::Result;
use crate::io::path::resolve;
use crate::plan::{Format, OptionPlan, ReadOptions};
use crate::runner::Runner;
use crate::shards::Shards;
use std::path::Path;

/// Resolve → plan → run → wrap. Shared by every format.
pub(crate) fn load(
    ctx: &LoadContext,
    format: Format,
    path: &Path,
    options: ReadOptions,
) -> Result<Shards> {
    let span = tracing::info_span!(
        "load",
        format = ?format,
        backend = ?ctx.backend,
        path = %path.display()
    );
    let _enter = span.enter();

    let parts = resolve(path)?;
    let plan = OptionPlan::build(format, options)?;
    let shards = Runner::from_context(ctx).run(&parts, &plan)?;
    tracing::info!(partitions = shards.len(), "load complete");
    Ok(Shards::new(shards))
}
