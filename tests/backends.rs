//! Local and distributed backends must agree on every load.

use anyhow::Result;
use shardframe::testing::*;
use shardframe::{
    Backend, DataType, LoadContext, ReadOptions, ShardError, Value, read_csv_with, read_json_with,
};
use std::sync::Arc;

fn both_backends() -> Vec<LoadContext> {
    vec![
        LoadContext::local(),
        LoadContext::local().with_workers(4),
        LoadContext::distributed().with_workers(2),
    ]
}

fn first_ids(shard: &shardframe::Shard) -> Vec<Value> {
    shard.as_frame().unwrap().column("ID").unwrap().values.clone()
}

#[test]
fn partitions_follow_discovery_order() -> Result<()> {
    let f = MortgageFixture::new()?;
    for ctx in both_backends() {
        let shards = read_csv_with(&ctx, f.csv_dir(), ReadOptions::new())?;
        let data = shards.collect();
        assert_eq!(data.len(), 2, "{ctx:?}");
        assert_eq!(first_ids(&data[0])[0], Value::Int(100521), "{ctx:?}");
        assert_eq!(first_ids(&data[1])[0], Value::Int(100541), "{ctx:?}");
    }
    Ok(())
}

#[test]
fn backends_produce_identical_shards() -> Result<()> {
    let f = MortgageFixture::new()?;
    let options = || {
        ReadOptions::new()
            .usecols_names(["ID", "sale_price"])
            .dtype_for("sale_price", DataType::Float64)
            .index_col("ID")
            .squeeze(true)
    };

    let local = read_csv_with(&LoadContext::local(), f.csv_dir(), options())?;
    let distributed = read_csv_with(&LoadContext::distributed(), f.csv_dir(), options())?;
    assert_shards_equal(&distributed, &local);

    let local = read_json_with(&LoadContext::local(), f.json_dir(), ReadOptions::new())?;
    let distributed = read_json_with(&LoadContext::distributed(), f.json_dir(), ReadOptions::new())?;
    assert_shards_equal(&distributed, &local);
    Ok(())
}

#[test]
fn out_of_order_completions_are_resorted() -> Result<()> {
    let f = MortgageFixture::new()?;
    let engine = Arc::new(ReverseOrderEngine::new());
    let ctx = LoadContext::distributed().with_engine(engine.clone());

    let shards = read_csv_with(&ctx, f.csv_dir(), ReadOptions::new())?;
    assert_eq!(engine.executed(), 2, "one unit of work per partition");

    let expected = read_csv_with(&LoadContext::local(), f.csv_dir(), ReadOptions::new())?;
    assert_shards_equal(&shards, &expected);
    Ok(())
}

#[test]
fn missing_results_are_detected() -> Result<()> {
    let f = MortgageFixture::new()?;
    let ctx = LoadContext::distributed().with_engine(Arc::new(LossyEngine));

    let err = read_csv_with(&ctx, f.csv_dir(), ReadOptions::new()).unwrap_err();
    assert!(matches!(err, ShardError::EngineUnavailable(_)), "{err}");
    Ok(())
}

#[test]
fn distributed_failures_keep_the_cause_message() -> Result<()> {
    let f = MortgageFixture::new()?;
    let options = || ReadOptions::new().index_col("zip");

    let local = read_csv_with(&LoadContext::local(), f.csv_dir(), options()).unwrap_err();
    assert!(matches!(local, ShardError::InvalidOption(_)), "{local}");

    let distributed =
        read_csv_with(&LoadContext::distributed(), f.csv_dir(), options()).unwrap_err();
    match &distributed {
        ShardError::BackendExecution { partition, .. } => assert_eq!(*partition, 0),
        other => panic!("expected BackendExecution, got {other}"),
    }
    assert!(distributed.to_string().contains("Index zip invalid"), "{distributed}");
    assert_eq!(distributed.root_cause().to_string(), local.to_string());
    Ok(())
}

#[test]
fn lowest_failing_partition_is_reported() -> Result<()> {
    let data = TempDataset::new()?;
    data.write("out/part-0.csv", "a\n1\n")?;
    data.write("out/part-1.csv", "a\nx\n")?;
    data.write("out/part-2.csv", "a\ny\n")?;

    let ctx = LoadContext::distributed().with_engine(Arc::new(ReverseOrderEngine::new()));
    let err = read_csv_with(
        &ctx,
        data.path("out"),
        ReadOptions::new().dtype(DataType::Int64),
    )
    .unwrap_err();
    match err {
        ShardError::BackendExecution { partition, cause, .. } => {
            assert_eq!(partition, 1);
            assert!(matches!(*cause, ShardError::TypeCoercion { .. }));
        }
        other => panic!("expected BackendExecution, got {other}"),
    }
    Ok(())
}

#[test]
fn worker_panics_become_errors() -> Result<()> {
    let f = MortgageFixture::new()?;
    let options = ReadOptions::new().usecols_where(|name| {
        assert_ne!(name, "location", "predicate refused column");
        true
    });

    for ctx in both_backends() {
        let err = read_csv_with(&ctx, f.csv_dir(), options.clone()).unwrap_err();
        match err.root_cause() {
            ShardError::WorkerPanic(message) => {
                assert!(message.contains("predicate refused column"), "{ctx:?}: {message}");
            }
            other => panic!("{ctx:?}: expected WorkerPanic, got {other}"),
        }
    }
    Ok(())
}

#[test]
fn every_backend_reports_the_same_failing_partition() -> Result<()> {
    let data = TempDataset::new()?;
    // Partition 0 fails late in a long file, partition 1 fails on its first
    // row, so a pool would see partition 1 fail first.
    let mut long = String::from("a\n");
    for i in 0..50_000 {
        long.push_str(&format!("{i}\n"));
    }
    long.push_str("zero\n");
    data.write("out/part-0.csv", &long)?;
    data.write("out/part-1.csv", "a\none\n")?;

    for ctx in both_backends() {
        let err = read_csv_with(&ctx, data.path("out"), ReadOptions::new().dtype(DataType::Int64))
            .unwrap_err();
        match err.root_cause() {
            ShardError::TypeCoercion { reason, .. } => {
                assert!(reason.contains("'zero'"), "{ctx:?}: {reason}");
                assert!(reason.contains("row 50000"), "{ctx:?}: {reason}");
            }
            other => panic!("{ctx:?}: expected TypeCoercion, got {other}"),
        }
    }
    Ok(())
}

#[test]
fn invalid_paths_fail_the_same_way_on_every_backend() -> Result<()> {
    let f = MortgageFixture::new()?;
    let missing = f.root().join("abc");

    for ctx in both_backends() {
        let csv = read_csv_with(&ctx, &missing, ReadOptions::new()).unwrap_err();
        let json = read_json_with(&ctx, &missing, ReadOptions::new()).unwrap_err();
        for err in [csv, json] {
            assert!(err.is_invalid_path(), "{ctx:?}: {err}");
            assert!(
                err.to_string().contains("The file path is invalid/empty"),
                "{ctx:?}: {err}"
            );
        }
    }
    Ok(())
}

#[test]
fn inconsistent_partitions_are_rejected() -> Result<()> {
    let data = TempDataset::new()?;
    data.write("cols/part-0.csv", "a,b\n1,2\n")?;
    data.write("cols/part-1.csv", "a,c\n1,2\n")?;
    data.write("types/part-0.csv", "a\n1\n")?;
    data.write("types/part-1.csv", "a\nred\n")?;

    for ctx in both_backends() {
        for dir in ["cols", "types"] {
            let err = read_csv_with(&ctx, data.path(dir), ReadOptions::new()).unwrap_err();
            match err {
                ShardError::SchemaMismatch { partition, .. } => assert_eq!(partition, 1),
                other => panic!("{dir} on {:?}: expected SchemaMismatch, got {other}", ctx.backend),
            }
        }
    }
    Ok(())
}

#[test]
fn empty_partition_does_not_conflict_on_types() -> Result<()> {
    let data = TempDataset::new()?;
    data.write("out/part-0.csv", "a,b\n1,x\n")?;
    data.write("out/part-1.csv", "a,b\n")?;

    let shards = read_csv_with(&LoadContext::distributed(), data.path("out"), ReadOptions::new())?;
    assert_eq!(shards.num_partitions(), 2);
    assert_eq!(shards.get(1).map(|s| s.num_rows()), Some(0));
    Ok(())
}

#[test]
fn collect_is_repeatable() -> Result<()> {
    let f = MortgageFixture::new()?;
    let engine = Arc::new(ReverseOrderEngine::new());
    let ctx = LoadContext::distributed().with_engine(engine.clone());
    let shards = read_csv_with(&ctx, f.csv_dir(), ReadOptions::new())?;

    let first = shards.collect();
    let second = shards.collect();
    assert_eq!(first, second);
    assert_eq!(engine.executed(), 2, "collect must not re-run the load");
    assert_eq!(shards.num_rows(), 5);
    Ok(())
}

#[test]
fn single_file_on_distributed_backend() -> Result<()> {
    let f = MortgageFixture::new()?;
    let ctx = LoadContext::new(Backend::Distributed);
    let shards = read_csv_with(&ctx, f.first_part(), ReadOptions::new().index_col("ID"))?;
    assert_eq!(shards.num_partitions(), 1);
    assert!(shards.collect()[0].index().contains(100529));
    Ok(())
}
