//! Load configuration: which backend runs partition reads and how wide.
//!
//! A [`LoadContext`] can be passed explicitly to the `*_with` entry points,
//! or installed once as the process-wide default with
//! [`set_default_context`]. The default is snapshotted at the start of each
//! request, so changing it never affects a load already in flight.

use crate::error::{Result, ShardError};
use crate::runner::ClusterEngine;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::{Arc, RwLock};

/// Environment variable selecting the backend.
pub const BACKEND_ENV: &str = "SHARDFRAME_BACKEND";
/// Environment variable setting the worker count.
pub const WORKERS_ENV: &str = "SHARDFRAME_WORKERS";

static DEFAULT_CONTEXT: RwLock<Option<LoadContext>> = RwLock::new(None);

/// Execution strategy for partition reads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// In-process, sequential unless more than one worker is configured.
    #[default]
    Local,
    /// One unit of work per partition submitted to a [`ClusterEngine`].
    Distributed,
}

impl FromStr for Backend {
    type Err = ShardError;

    /// `local`/`pandas` and `distributed`/`spark`, case-insensitive.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" | "pandas" => Ok(Backend::Local),
            "distributed" | "spark" => Ok(Backend::Distributed),
            other => Err(ShardError::InvalidOption(format!("unknown backend '{other}'"))),
        }
    }
}

/// Configuration read once per load.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadContext {
    pub backend: Backend,
    /// Worker threads. `None` means sequential for `Local` and one per CPU
    /// for `Distributed`.
    pub workers: Option<usize>,
    /// Engine for the distributed backend; a thread pool is created per
    /// load when unset.
    #[serde(skip)]
    pub engine: Option<Arc<dyn ClusterEngine>>,
}

impl fmt::Debug for LoadContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadContext")
            .field("backend", &self.backend)
            .field("workers", &self.workers)
            .field("engine", &self.engine.as_ref().map(|e| e.name().to_string()))
            .finish()
    }
}

impl LoadContext {
    #[must_use]
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn local() -> Self {
        Self::new(Backend::Local)
    }

    #[must_use]
    pub fn distributed() -> Self {
        Self::new(Backend::Distributed)
    }

    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    #[must_use]
    pub fn with_engine(mut self, engine: Arc<dyn ClusterEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Build a context from `SHARDFRAME_BACKEND` and `SHARDFRAME_WORKERS`.
    ///
    /// # Errors
    /// `InvalidOption` on an unknown backend name or a non-numeric worker count.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    ///
    /// ```
    /// use shardframe::{Backend, LoadContext};
    ///
    /// let ctx = LoadContext::from_lookup(|k| match k {
    ///     "SHARDFRAME_BACKEND" => Some("spark".to_string()),
    ///     _ => None,
    /// })
    /// .unwrap();
    /// assert_eq!(ctx.backend, Backend::Distributed);
    /// ```
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut ctx = Self::default();
        if let Some(backend) = lookup(BACKEND_ENV) {
            ctx.backend = backend.parse()?;
        }
        if let Some(workers) = lookup(WORKERS_ENV) {
            let n = workers.trim().parse::<usize>().map_err(|_| {
                ShardError::InvalidOption(format!("{WORKERS_ENV} must be a number, got '{workers}'"))
            })?;
            ctx.workers = Some(n);
        }
        Ok(ctx)
    }

    /// Load a context from a JSON file such as
    /// `{"backend": "distributed", "workers": 4}`.
    ///
    /// # Errors
    /// `Io` if the file cannot be read, `InvalidOption` if it is not a valid
    /// context document.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ShardError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|e| {
            ShardError::InvalidOption(format!("bad load context in {}: {e}", path.display()))
        })
    }
}

/// Install `ctx` as the default for loads that do not pass one.
pub fn set_default_context(ctx: LoadContext) {
    let mut lock = DEFAULT_CONTEXT
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *lock = Some(ctx);
}

/// Drop the installed default, reverting to [`LoadContext::default`].
pub fn reset_default_context() {
    let mut lock = DEFAULT_CONTEXT
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *lock = None;
}

/// Snapshot of the current default context.
#[must_use]
pub fn default_context() -> LoadContext {
    DEFAULT_CONTEXT
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_aliases() {
        assert_eq!("pandas".parse::<Backend>().unwrap(), Backend::Local);
        assert_eq!("Spark".parse::<Backend>().unwrap(), Backend::Distributed);
        assert!("dask".parse::<Backend>().is_err());
    }

    #[test]
    fn lookup_rejects_bad_worker_count() {
        let err = LoadContext::from_lookup(|k| (k == WORKERS_ENV).then(|| "many".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains(WORKERS_ENV));
    }

    #[test]
    fn json_document_round_trip() {
        let ctx: LoadContext = serde_json::from_str(r#"{"backend": "distributed", "workers": 3}"#).unwrap();
        assert_eq!(ctx.backend, Backend::Distributed);
        assert_eq!(ctx.workers, Some(3));
        assert!(ctx.engine.is_none());
    }
}
