//! # shardframe
//!
//! A **partitioned dataset loader** for Rust. shardframe reads tabular data
//! (CSV and JSON records) from a path that may hold many part files, loads
//! every part file as its own shard, and hands back the ordered collection of
//! in-memory frames.
//!
//! ## Key Features
//!
//! - **Path resolution** - single files, directories of part files, or glob patterns
//! - **pandas-style read options** - header inference, explicit names, column
//!   selection, dtype coercion, index promotion, squeeze
//! - **Two backends** - local (in-process) or distributed (one unit of work per
//!   partition on a cluster engine), with identical results
//! - **Deterministic order** - partition `i` always comes from the `i`-th part file
//! - **Transparent decompression** - gzip, zstd, bzip2 and xz part files (feature flags)
//!
//! ## Quick Start
//!
//! ```no_run
//! use shardframe::*;
//!
//! # fn main() -> Result<()> {
//! let shards = read_csv(
//!     "data/mortgages",
//!     ReadOptions::new()
//!         .usecols_names(["ID", "sale_price"])
//!         .dtype_for("sale_price", DataType::Float64)
//!         .index_col("ID"),
//! )?;
//!
//! for shard in shards.collect() {
//!     let frame = shard.as_frame().expect("two columns stay a frame");
//!     println!("{} rows, columns {:?}", frame.num_rows(), frame.columns());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! ### Part files
//!
//! [`io::path::resolve`] turns the caller's path into an ordered list of
//! [`PartFile`]s. A directory contributes the files directly inside it, sorted
//! by name; marker files such as `_SUCCESS` are skipped. A path that resolves
//! to nothing fails with [`ShardError::InvalidPath`], whose message contains
//! `"The file path is invalid/empty"`.
//!
//! ### Read options
//!
//! [`ReadOptions`] collects what the caller asked for; [`OptionPlan::build`]
//! validates it once per request. The same plan is applied to every partition:
//!
//! 1. parse (`header` inferred from the first row, or positional `"0".."k-1"`)
//! 2. rename with `names`
//! 3. select with `usecols` (positions, names, or a predicate)
//! 4. infer types and cast with `dtype`
//! 5. promote `index_col` to the row index
//! 6. `squeeze` a single remaining column into a [`Series`]
//!
//! ### Backends
//!
//! A [`LoadContext`] picks the [`Backend`]:
//! - **Local** - sequential, or a bounded thread pool when `workers > 1`
//! - **Distributed** - each partition is a unit of work on a [`ClusterEngine`]
//!   (a dedicated thread pool by default); results are re-sorted by partition key
//!
//! Pass a context to the `*_with` functions, or install a process-wide default
//! with [`set_default_context`].
//!
//! ### Shards
//!
//! A successful load returns [`Shards`]: one [`Shard`] (a [`Frame`] or a
//! [`Series`]) per part file. [`Shards::collect`] is a pure read and can be
//! called any number of times.
//!
//! ## Errors
//!
//! Every failure is a [`ShardError`]. The first fatal error aborts the load;
//! no partial result is returned. Failures on the distributed backend are
//! wrapped in [`ShardError::BackendExecution`], which keeps the cause's
//! message; [`ShardError::root_cause`] unwraps it.
//!
//! ## Feature Flags
//!
//! - `io-csv` - delimited text input
//! - `io-json` - JSON records input
//! - `compression-gzip`, `compression-zstd`, `compression-bzip2`, `compression-xz` -
//!   transparent decompression of part files
//!
//! ## Module Overview
//!
//! - [`io`] - path resolution, parsing primitives, decompression
//! - [`plan`] - read options and the per-request plan
//! - [`reader`] - one part file into one shard
//! - [`runner`] - backends and cluster engines
//! - [`frame`] - frames, series, values and types
//! - [`testing`] - fixtures, assertions and mock engines

pub mod context;
mod dtype;
pub mod error;
pub mod frame;
pub mod helpers;
pub mod io;
pub mod plan;
pub mod reader;
pub mod runner;
pub mod shards;
pub mod testing;

// General re-exports
pub use context::{Backend, LoadContext, default_context, reset_default_context, set_default_context};
pub use error::{Result, ShardError};
pub use frame::{Column, DataType, Frame, Index, Series, Shard, Value};
pub use io::path::PartFile;
pub use plan::{DtypeSpec, Format, HeaderPolicy, IndexCol, OptionPlan, ReadOptions, UseCols};
pub use runner::{ClusterEngine, Completed, Runner, ThreadPoolEngine};
pub use shards::Shards;

// Gated re-exports
#[cfg(feature = "io-csv")]
pub use helpers::csv::{read_csv, read_csv_with};

#[cfg(feature = "io-json")]
pub use helpers::json::{read_json, read_json_with};
