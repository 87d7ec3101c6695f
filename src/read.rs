//! Read planning: per-call options and the scan pipelines behind
//! [`crate::client::Table`].

use std::sync::Arc;

use futures_util::{stream, StreamExt, TryStreamExt};

use crate::{
    logging::scan_log,
    row::ColumnId,
    row_set::RowSet,
    source::{ScanError, StoreDriver},
    stream::{interleave::InterleaveStream, shard::ShardScan, RowStream},
};

/// Per-call options for a parallel read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReadOptions {
    pub(crate) concurrency: usize,
    pub(crate) ordered: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        ReadOptions {
            concurrency: 1,
            ordered: false,
        }
    }
}

impl ReadOptions {
    /// Options with one scan slot and unordered interleaving.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of shard scans allowed to run at once, also handed to the
    /// store as its shard count hint. Zero is treated as one.
    pub fn concurrency(self, concurrency: usize) -> Self {
        ReadOptions {
            concurrency: concurrency.max(1),
            ..self
        }
    }

    /// Interleave with a strict round-robin so repeated reads of an
    /// unchanged table produce rows in the same order.
    pub fn ordered(self, ordered: bool) -> Self {
        ReadOptions { ordered, ..self }
    }
}

/// One scan over the whole row set, yielding rows in key order.
pub(crate) fn single_scan(
    driver: Arc<dyn StoreDriver>,
    table_id: String,
    columns: Arc<[ColumnId]>,
    row_set: RowSet,
) -> RowStream {
    ShardScan::new(0, &driver, &table_id, &columns, row_set).boxed()
}

/// Shard the row set through the store's sampler and interleave one scan
/// per populated shard, at most `options.concurrency` of them at a time.
///
/// Planning is deferred into the stream: sampling and intersection only run
/// once the caller polls, and a shard whose intersection with `row_set` is
/// empty never opens a scan.
pub(crate) fn parallel_scan(
    driver: Arc<dyn StoreDriver>,
    table_id: String,
    columns: Arc<[ColumnId]>,
    row_set: RowSet,
    options: ReadOptions,
) -> RowStream {
    let plan = async move {
        let shards = driver
            .sample_shards(&table_id, &row_set, options.concurrency)
            .await?;
        let mut scans = Vec::with_capacity(shards.len());
        for (shard, shard_set) in shards.iter().enumerate() {
            let clipped = driver.intersect(&row_set, shard_set).await?;
            if clipped.is_empty() {
                continue;
            }
            scans.push(ShardScan::new(
                shard,
                &driver,
                &table_id,
                &columns,
                clipped,
            ));
        }
        scan_log!(
            log::Level::Debug,
            "shard_plan",
            "table={} shards={} scans={} concurrency={} ordered={}",
            table_id,
            shards.len(),
            scans.len(),
            options.concurrency,
            options.ordered,
        );
        Ok::<_, ScanError>(InterleaveStream::new(
            scans,
            options.concurrency,
            options.ordered,
        ))
    };
    stream::once(plan).try_flatten().boxed()
}
