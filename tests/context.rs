//! Loading a context from configuration sources.

use anyhow::Result;
use shardframe::testing::TempDataset;
use shardframe::{Backend, LoadContext, ShardError};

#[test]
fn context_from_json_file() -> Result<()> {
    let data = TempDataset::new()?;
    let file = data.write("ctx.json", r#"{"backend": "distributed", "workers": 3}"#)?;

    let ctx = LoadContext::from_json_file(&file)?;
    assert_eq!(ctx.backend, Backend::Distributed);
    assert_eq!(ctx.workers, Some(3));
    Ok(())
}

#[test]
fn partial_json_uses_defaults() -> Result<()> {
    let data = TempDataset::new()?;
    let file = data.write("ctx.json", "{}")?;

    let ctx = LoadContext::from_json_file(&file)?;
    assert_eq!(ctx.backend, Backend::Local);
    assert_eq!(ctx.workers, None);
    Ok(())
}

#[test]
fn bad_context_documents() -> Result<()> {
    let data = TempDataset::new()?;
    let file = data.write("ctx.json", r#"{"backend": "dask"}"#)?;

    let err = LoadContext::from_json_file(&file).unwrap_err();
    assert!(matches!(err, ShardError::InvalidOption(_)), "{err}");

    let err = LoadContext::from_json_file(data.path("missing.json")).unwrap_err();
    assert!(matches!(err, ShardError::Io { .. }), "{err}");
    Ok(())
}

#[test]
fn context_from_lookup() -> Result<()> {
    let ctx = LoadContext::from_lookup(|key| match key {
        "SHARDFRAME_BACKEND" => Some("distributed".to_string()),
        "SHARDFRAME_WORKERS" => Some(" 8 ".to_string()),
        _ => None,
    })?;
    assert_eq!(ctx.backend, Backend::Distributed);
    assert_eq!(ctx.workers, Some(8));

    let empty = LoadContext::from_lookup(|_| None)?;
    assert_eq!(empty.backend, Backend::Local);
    Ok(())
}
