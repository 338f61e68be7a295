//! The process-wide default context. Kept in its own test binary because it
//! mutates global state.

use anyhow::Result;
use shardframe::testing::*;
use shardframe::{
    Backend, LoadContext, ReadOptions, default_context, read_csv, reset_default_context,
    set_default_context,
};
use std::sync::Arc;

#[test]
fn default_context_drives_plain_entry_points() -> Result<()> {
    let f = MortgageFixture::new()?;
    assert_eq!(default_context().backend, Backend::Local);

    let engine = Arc::new(ReverseOrderEngine::new());
    set_default_context(LoadContext::distributed().with_engine(engine.clone()));
    let distributed = read_csv(f.csv_dir(), ReadOptions::new())?;
    assert_eq!(engine.executed(), 2);

    reset_default_context();
    assert_eq!(default_context().backend, Backend::Local);
    let local = read_csv(f.csv_dir(), ReadOptions::new())?;
    assert_eq!(engine.executed(), 2, "reset context must not reach the engine");

    assert_shards_equal(&distributed, &local);
    Ok(())
}
