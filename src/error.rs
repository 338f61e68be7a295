//! Error taxonomy for shard loading.
//!
//! Every entry point returns [`ShardError`]. A failed load never yields a
//! partial [`Shards`](crate::Shards): the first fatal error aborts the whole
//! request and is handed back unchanged, or, on the distributed backend,
//! wrapped in [`ShardError::BackendExecution`] with the cause's message
//! embedded verbatim.

use crate::frame::DataType;
use std::path::PathBuf;
use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, ShardError>;

#[derive(Debug, Error)]
pub enum ShardError {
    /// The path does not exist, is empty, or resolves to no files.
    #[error("The file path is invalid/empty: {path}")]
    InvalidPath { path: String },

    /// Options contradict each other or the header of a partition.
    #[error("invalid option: {0}")]
    InvalidOption(String),

    /// A column's values cannot be cast to the requested type.
    #[error("cannot cast column '{column}' to {target}: {reason}")]
    TypeCoercion {
        column: String,
        target: DataType,
        reason: String,
    },

    /// A partition read failed on a distributed worker.
    #[error("partition {partition} ({}) failed on the distributed backend: {cause}", path.display())]
    BackendExecution {
        partition: usize,
        path: PathBuf,
        cause: Box<ShardError>,
    },

    #[error("worker panicked: {0}")]
    WorkerPanic(String),

    #[error("execution engine unavailable: {0}")]
    EngineUnavailable(String),

    /// Partitions of one request disagree on their columns or types.
    #[error("partition {partition} does not match the first partition: {reason}")]
    SchemaMismatch { partition: usize, reason: String },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
}

impl ShardError {
    pub(crate) fn invalid_path(path: impl Into<String>) -> Self {
        ShardError::InvalidPath { path: path.into() }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ShardError::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// The error that actually stopped the load, with any distributed
    /// wrapping removed.
    ///
    /// ```
    /// use shardframe::ShardError;
    ///
    /// let inner = ShardError::InvalidOption("names has 2 entries".into());
    /// let wrapped = ShardError::BackendExecution {
    ///     partition: 1,
    ///     path: "part-1.csv".into(),
    ///     cause: Box::new(inner),
    /// };
    /// assert!(matches!(wrapped.root_cause(), ShardError::InvalidOption(_)));
    /// ```
    #[must_use]
    pub fn root_cause(&self) -> &ShardError {
        let mut cur = self;
        while let ShardError::BackendExecution { cause, .. } = cur {
            cur = cause;
        }
        cur
    }

    /// Whether this error (or its root cause) is an invalid-path failure.
    #[must_use]
    pub fn is_invalid_path(&self) -> bool {
        matches!(self.root_cause(), ShardError::InvalidPath { .. })
    }
}
