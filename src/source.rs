//! Storage driver traits.
//!
//! A store backend participates in parallel reads through three narrow
//! capabilities: sampling its shard layout, intersecting row sets, and
//! opening scan streams. [`StoreDriver`] bundles the three with connection
//! establishment so a [`crate::client::Client`] can be built over any
//! backend, in-memory or remote.

use async_trait::async_trait;
use thiserror::Error;

use crate::{
    client::{ClientConfig, ConnectError},
    row::ColumnId,
    row_set::RowSet,
    stream::RowStream,
};

/// Error raised while planning or running a scan.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The named table does not exist in the store.
    #[error("unknown table {0:?}")]
    UnknownTable(String),
    /// A requested column names a family the table does not carry.
    #[error("unknown column family {family:?} in table {table:?}")]
    UnknownFamily {
        /// Table the scan addressed.
        table: String,
        /// Family named by the offending column.
        family: String,
    },
    /// The store gave up on a scan it had already started answering.
    #[error("scan interrupted after {rows} rows: {reason}")]
    Interrupted {
        /// Rows the scan yielded before failing.
        rows: usize,
        /// Store-reported cause.
        reason: String,
    },
    /// Failure surfaced by the backing storage driver.
    #[error(transparent)]
    External(Box<dyn std::error::Error + Send + Sync>),
}

/// Samples a table's physical partitioning.
#[async_trait]
pub trait ShardSampler: Send + Sync {
    /// Return up to `desired_count` disjoint shard row sets, in key order,
    /// together covering every part of the key space that `row_set` could
    /// reach. The store may return fewer shards than requested, never more.
    async fn sample_shards(
        &self,
        table_id: &str,
        row_set: &RowSet,
        desired_count: usize,
    ) -> Result<Vec<RowSet>, ScanError>;
}

/// Computes row set intersections inside the store's own range engine.
#[async_trait]
pub trait ShardIntersector: Send + Sync {
    /// Restrict `row_set` to the keys also covered by `shard`.
    ///
    /// The result may be normalized however the store likes, as long as its
    /// key membership is exactly the intersection of the two arguments.
    async fn intersect(&self, row_set: &RowSet, shard: &RowSet) -> Result<RowSet, ScanError>;
}

/// Opens lazy row scans against a table.
#[async_trait]
pub trait ScanSource: Send + Sync {
    /// Start one scan over `row_set`, yielding each matching row exactly
    /// once in key order, with one cell per entry of `columns`.
    async fn open_scan(
        &self,
        table_id: &str,
        columns: &[ColumnId],
        row_set: &RowSet,
    ) -> Result<RowStream, ScanError>;
}

/// Full storage backend surface required by [`crate::client::Client`].
#[async_trait]
pub trait StoreDriver: ShardSampler + ShardIntersector + ScanSource {
    /// Reach the store and validate `config`, credentials included.
    async fn connect(&self, config: &ClientConfig) -> Result<(), ConnectError>;
}
