//! Execution of partition reads.
//!
//! A [`Runner`] applies [`read_part`] to every part file of a request and
//! returns the shards in discovery order:
//!
//! - **Local**: sequential, or a bounded rayon pool whose ordered collect
//!   keeps discovery order.
//! - **Distributed**: every part is submitted as an independent unit of work
//!   to a [`ClusterEngine`]. Engines report completions in whatever order they
//!   finish; the runner re-sorts them by part key.
//!
//! Either way the failure of the lowest-keyed partition aborts the load, and
//! a panicking read is reported as [`ShardError::WorkerPanic`] instead of
//! unwinding into the caller. Successful results are then checked for a
//! consistent schema across partitions.

use crate::context::{Backend, LoadContext};
use crate::error::{Result, ShardError};
use crate::frame::Shard;
use crate::io::path::PartFile;
use crate::plan::OptionPlan;
use crate::reader::read_part;
use rayon::prelude::*;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, mpsc};

/// The per-partition work handed to an engine.
pub type ReadFn<'a> = dyn Fn(&PartFile) -> Result<Shard> + Sync + 'a;

/// Outcome of one unit of work, tagged with the part key it belongs to.
#[derive(Debug)]
pub struct Completed {
    pub key: usize,
    pub outcome: Result<Shard>,
}

/// The contract a distributed substrate must meet.
///
/// `map_parts` runs `read` exactly once for every part and returns one
/// [`Completed`] per part, in any order. Engines may retry internally but
/// must not drop or duplicate results.
pub trait ClusterEngine: Send + Sync {
    fn name(&self) -> &str;

    fn map_parts(&self, parts: &[PartFile], read: &ReadFn<'_>) -> Vec<Completed>;
}

/// In-process [`ClusterEngine`] backed by a dedicated rayon pool.
///
/// Results are gathered through a channel in completion order, so callers
/// see the same reordering a real cluster would produce.
pub struct ThreadPoolEngine {
    pool: rayon::ThreadPool,
}

impl ThreadPoolEngine {
    /// # Errors
    /// `EngineUnavailable` if the pool cannot be created.
    pub fn new(workers: usize) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers.max(1))
            .thread_name(|i| format!("shardframe-worker-{i}"))
            .build()
            .map_err(|e| ShardError::EngineUnavailable(e.to_string()))?;
        Ok(Self { pool })
    }

    #[must_use]
    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }
}

impl ClusterEngine for ThreadPoolEngine {
    fn name(&self) -> &str {
        "thread-pool"
    }

    fn map_parts(&self, parts: &[PartFile], read: &ReadFn<'_>) -> Vec<Completed> {
        let (tx, rx) = mpsc::channel();
        self.pool.scope(|s| {
            for part in parts {
                let tx = tx.clone();
                s.spawn(move |_| {
                    let outcome = catch_panic(|| read(part));
                    // The receiver outlives the scope; a send can only fail if it was dropped.
                    let _ = tx.send(Completed {
                        key: part.key,
                        outcome,
                    });
                });
            }
        });
        drop(tx);
        rx.into_iter().collect()
    }
}

/// Run `read`, turning a panic into `WorkerPanic` so it reaches the caller
/// as an error on every backend.
fn catch_panic(read: impl FnOnce() -> Result<Shard>) -> Result<Shard> {
    panic::catch_unwind(AssertUnwindSafe(read))
        .unwrap_or_else(|payload| Err(ShardError::WorkerPanic(panic_message(&*payload))))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Runs partition reads for one request.
pub struct Runner {
    pub backend: Backend,
    pub workers: Option<usize>,
    engine: Option<Arc<dyn ClusterEngine>>,
}

impl Default for Runner {
    fn default() -> Self {
        Self::from_context(&LoadContext::default())
    }
}

impl Runner {
    #[must_use]
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            workers: None,
            engine: None,
        }
    }

    #[must_use]
    pub fn from_context(ctx: &LoadContext) -> Self {
        Self {
            backend: ctx.backend,
            workers: ctx.workers,
            engine: ctx.engine.clone(),
        }
    }

    #[must_use]
    pub fn with_engine(mut self, engine: Arc<dyn ClusterEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Read every part with `plan` and return the shards in discovery order.
    ///
    /// # Errors
    /// The first partition failure, or `SchemaMismatch` if the partitions
    /// disagree on their columns.
    pub fn run(&self, parts: &[PartFile], plan: &OptionPlan) -> Result<Vec<Shard>> {
        let shards = match self.backend {
            Backend::Local => exec_local(parts, plan, self.workers.unwrap_or(1))?,
            Backend::Distributed => {
                let engine: Arc<dyn ClusterEngine> = match &self.engine {
                    Some(engine) => Arc::clone(engine),
                    None => Arc::new(ThreadPoolEngine::new(
                        self.workers.unwrap_or_else(num_cpus::get),
                    )?),
                };
                exec_distributed(engine.as_ref(), parts, plan)?
            }
        };
        validate_schemas(&shards)?;
        Ok(shards)
    }
}

/// Local executor (sequential, or a bounded pool when `workers > 1`)
fn exec_local(parts: &[PartFile], plan: &OptionPlan, workers: usize) -> Result<Vec<Shard>> {
    let read = |part: &PartFile| catch_panic(|| read_part(part, plan));
    if workers <= 1 || parts.len() <= 1 {
        return parts.iter().map(read).collect();
    }
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers.min(parts.len()))
        .build()
        .map_err(|e| ShardError::EngineUnavailable(e.to_string()))?;
    // Gather every outcome in input order so the reported failure is the
    // lowest-key one, not the first to finish.
    let outcomes: Vec<Result<Shard>> = pool.install(|| parts.par_iter().map(read).collect());
    outcomes.into_iter().collect()
}

/// Distributed executor (submit every part → gather → re-sort by key)
fn exec_distributed(
    engine: &dyn ClusterEngine,
    parts: &[PartFile],
    plan: &OptionPlan,
) -> Result<Vec<Shard>> {
    tracing::debug!(engine = engine.name(), parts = parts.len(), "submitting partitions");
    let read = |part: &PartFile| read_part(part, plan);
    let mut done = engine.map_parts(parts, &read);
    done.sort_by_key(|c| c.key);

    let keys_match = done.len() == parts.len()
        && done.iter().zip(parts).all(|(c, p)| c.key == p.key);
    if !keys_match {
        return Err(ShardError::EngineUnavailable(format!(
            "engine '{}' returned {} results for {} partitions",
            engine.name(),
            done.len(),
            parts.len()
        )));
    }

    let mut shards = Vec::with_capacity(done.len());
    for (completed, part) in done.into_iter().zip(parts) {
        match completed.outcome {
            Ok(shard) => shards.push(shard),
            Err(cause) => {
                tracing::warn!(
                    partition = part.key,
                    path = %part.path.display(),
                    error = %cause,
                    "partition failed on distributed backend"
                );
                return Err(ShardError::BackendExecution {
                    partition: part.key,
                    path: part.path.clone(),
                    cause: Box::new(cause),
                });
            }
        }
    }
    Ok(shards)
}

/// Every partition must have the same column names and shape as the first;
/// partitions with rows must also agree on dtypes.
fn validate_schemas(shards: &[Shard]) -> Result<()> {
    let Some(first) = shards.first() else {
        return Ok(());
    };
    let names = first.column_names();
    for (i, shard) in shards.iter().enumerate().skip(1) {
        if shard.is_series() != first.is_series() {
            return Err(ShardError::SchemaMismatch {
                partition: i,
                reason: "only some partitions were squeezed to a series".into(),
            });
        }
        let other = shard.column_names();
        if other != names {
            return Err(ShardError::SchemaMismatch {
                partition: i,
                reason: format!("columns {other:?} differ from {names:?}"),
            });
        }
    }

    let mut populated = shards.iter().enumerate().filter(|(_, s)| s.num_rows() > 0);
    if let Some((_, reference)) = populated.next() {
        let expected = reference.schema();
        for (i, shard) in populated {
            let actual = shard.schema();
            if actual != expected {
                return Err(ShardError::SchemaMismatch {
                    partition: i,
                    reason: format!("dtypes {actual:?} differ from {expected:?}"),
                });
            }
        }
    }
    Ok(())
}
