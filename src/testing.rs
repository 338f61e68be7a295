//! Testing utilities for shardframe loads.
//!
//! This module gives end-users (and this crate's own tests) the pieces needed
//! to test code that loads partitioned datasets:
//!
//! - **Fixtures**: [`TempDataset`] lays out part files in a temporary
//!   directory; [`MortgageFixture`] writes a small ready-made dataset.
//! - **Assertions**: compare whole loads or check one partition's columns.
//! - **Mock engines**: [`ReverseOrderEngine`] hands results back in reverse
//!   order, the way a cluster that finishes late partitions first would.
//!
//! # Quick Start
//!
//! ```no_run
//! use shardframe::testing::*;
//! use shardframe::{LoadContext, ReadOptions, read_csv_with};
//!
//! # fn main() -> anyhow::Result<()> {
//! let fixture = MortgageFixture::new()?;
//! let local = read_csv_with(&LoadContext::local(), fixture.csv_dir(), ReadOptions::new())?;
//! let distributed = read_csv_with(&LoadContext::distributed(), fixture.csv_dir(), ReadOptions::new())?;
//!
//! assert_shards_equal(&local, &distributed);
//! assert_columns(&local.collect()[0], &["ID", "sale_price", "location"]);
//! # Ok(())
//! # }
//! ```

pub mod assertions;
pub mod fixtures;
pub mod mock_engine;

pub use assertions::*;
pub use fixtures::*;
pub use mock_engine::*;
