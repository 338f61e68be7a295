use crate::context::{LoadContext, default_context};
use crate::error::Result;
use crate::plan::{Format, ReadOptions};
use crate::shards::Shards;
use std::path::Path;

// --------- Sources: JSON records ----------

/// Load JSON records (one object per line, or an array of objects) using the
/// process-wide default [`LoadContext`].
///
/// `header` and `delimiter` do not apply; `names`, `usecols`, `dtype`,
/// `index_col` and `squeeze` behave as for [`read_csv`](crate::read_csv).
///
/// # Errors
/// See [`ShardError`](crate::ShardError).
#[cfg(feature = "io-json")]
pub fn read_json(path: impl AsRef<Path>, options: ReadOptions) -> Result<Shards> {
    read_json_with(&default_context(), path, options)
}

/// [`read_json`] with an explicit context.
#[cfg(feature = "io-json")]
pub fn read_json_with(
    ctx: &LoadContext,
    path: impl AsRef<Path>,
    options: ReadOptions,
) -> Result<Shards> {
    super::load(ctx, Format::Json, path.as_ref(), options)
}
