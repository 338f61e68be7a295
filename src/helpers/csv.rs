use crate::context::{LoadContext, default_context};
use crate::error::Result;
use crate::plan::{Format, ReadOptions};
use crate::shards::Shards;
use std::path::Path;

// --------- Sources: CSV ----------

/// Load delimited text from a file, a directory of part files, or a glob,
/// using the process-wide default [`LoadContext`].
///
/// Each part file becomes one partition of the returned [`Shards`].
///
/// # Errors
/// See [`ShardError`](crate::ShardError); an unresolvable path yields
/// `InvalidPath` ("The file path is invalid/empty").
#[cfg(feature = "io-csv")]
pub fn read_csv(path: impl AsRef<Path>, options: ReadOptions) -> Result<Shards> {
    read_csv_with(&default_context(), path, options)
}

/// [`read_csv`] with an explicit context.
#[cfg(feature = "io-csv")]
pub fn read_csv_with(
    ctx: &LoadContext,
    path: impl AsRef<Path>,
    options: ReadOptions,
) -> Result<Shards> {
    super::load(ctx, Format::Csv, path.as_ref(), options)
}
