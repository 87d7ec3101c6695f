//! In-memory store backend.
//!
//! [`MemStore`] implements the whole [`StoreDriver`] surface over ordinary
//! maps, close enough to a real sharded store to exercise every read path:
//! tables carry column families and split keys, split keys partition the key
//! space into tablets, and the sampler hands tablets out as shards. It also
//! offers the fault and accounting hooks the integration tests lean on.

mod normalize;

use std::{
    collections::{BTreeMap, HashMap},
    ops::Bound,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, RwLock,
    },
    vec,
};

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{stream, StreamExt};

use crate::{
    client::{ClientConfig, ConnectError},
    key::RowKey,
    mem::normalize::{clip, normalize, to_row_set},
    range::RowRange,
    row::{ColumnId, Row},
    row_set::RowSet,
    source::{ScanError, ScanSource, ShardIntersector, ShardSampler, StoreDriver},
    stream::RowStream,
};

#[derive(Default)]
struct TableState {
    families: Vec<String>,
    splits: Vec<RowKey>,
    rows: BTreeMap<RowKey, HashMap<ColumnId, Bytes>>,
    fail_after: Option<usize>,
}

#[derive(Default)]
struct StoreState {
    tables: HashMap<String, TableState>,
    refuse_connections: bool,
}

/// In-memory sharded store.
///
/// A table created with `k` split keys consists of `k + 1` tablets:
/// everything before the first split, one tablet per adjacent split pair,
/// and everything from the last split on. Sampling groups contiguous
/// tablets so that at most the desired number of shards comes back.
#[derive(Default)]
pub struct MemStore {
    state: RwLock<StoreState>,
    open_scans: Arc<AtomicUsize>,
    started_scans: AtomicUsize,
}

impl MemStore {
    /// An empty store with no tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create (or replace) a table with its column families and split keys.
    pub fn create_table(&self, table_id: &str, families: &[&str], splits: &[&str]) {
        let mut split_keys: Vec<RowKey> = splits.iter().map(|split| RowKey::from(*split)).collect();
        split_keys.sort();
        split_keys.dedup();
        let table = TableState {
            families: families.iter().map(|family| (*family).to_owned()).collect(),
            splits: split_keys,
            rows: BTreeMap::new(),
            fail_after: None,
        };
        self.state
            .write()
            .expect("store lock poisoned")
            .tables
            .insert(table_id.to_owned(), table);
    }

    /// Write one cell.
    pub fn write(
        &self,
        table_id: &str,
        key: impl Into<RowKey>,
        column: &ColumnId,
        value: impl Into<Bytes>,
    ) -> Result<(), ScanError> {
        let mut state = self.state.write().expect("store lock poisoned");
        let table = state
            .tables
            .get_mut(table_id)
            .ok_or_else(|| ScanError::UnknownTable(table_id.to_owned()))?;
        if !table.families.iter().any(|family| family == column.family()) {
            return Err(ScanError::UnknownFamily {
                table: table_id.to_owned(),
                family: column.family().to_owned(),
            });
        }
        table
            .rows
            .entry(key.into())
            .or_default()
            .insert(column.clone(), value.into());
        Ok(())
    }

    /// Make every scan opened on `table_id` from now on fail after yielding
    /// `rows` rows.
    pub fn fail_scans_after(&self, table_id: &str, rows: usize) -> Result<(), ScanError> {
        let mut state = self.state.write().expect("store lock poisoned");
        let table = state
            .tables
            .get_mut(table_id)
            .ok_or_else(|| ScanError::UnknownTable(table_id.to_owned()))?;
        table.fail_after = Some(rows);
        Ok(())
    }

    /// Refuse every connection attempt from now on.
    pub fn refuse_connections(&self) {
        self.state
            .write()
            .expect("store lock poisoned")
            .refuse_connections = true;
    }

    /// Scans whose streams are neither drained nor dropped yet.
    pub fn open_scans(&self) -> usize {
        self.open_scans.load(Ordering::SeqCst)
    }

    /// Scans opened over the lifetime of the store.
    pub fn scans_started(&self) -> usize {
        self.started_scans.load(Ordering::SeqCst)
    }
}

/// Tablet ranges of a table, in key order.
fn tablets(table: &TableState) -> Vec<RowRange> {
    let mut tablets = Vec::with_capacity(table.splits.len() + 1);
    let mut lower: Bound<RowKey> = Bound::Unbounded;
    for split in &table.splits {
        tablets.push(RowRange::from_bounds(lower, Bound::Excluded(split.clone())));
        lower = Bound::Included(split.clone());
    }
    tablets.push(RowRange::from_bounds(lower, Bound::Unbounded));
    tablets
}

/// Decrements the open scan gauge when a scan stream completes or is
/// dropped mid-way.
struct ScanGuard(Arc<AtomicUsize>);

impl Drop for ScanGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

struct TableScan {
    rows: vec::IntoIter<Row>,
    yielded: usize,
    fail_after: Option<usize>,
    failed: bool,
    _guard: ScanGuard,
}

impl Iterator for TableScan {
    type Item = Result<Row, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        if let Some(limit) = self.fail_after {
            if self.yielded >= limit {
                self.failed = true;
                return Some(Err(ScanError::Interrupted {
                    rows: self.yielded,
                    reason: "injected fault".to_owned(),
                }));
            }
        }
        let row = self.rows.next()?;
        self.yielded += 1;
        Some(Ok(row))
    }
}

#[async_trait]
impl ShardSampler for MemStore {
    async fn sample_shards(
        &self,
        table_id: &str,
        row_set: &RowSet,
        desired_count: usize,
    ) -> Result<Vec<RowSet>, ScanError> {
        let state = self.state.read().expect("store lock poisoned");
        let table = state
            .tables
            .get(table_id)
            .ok_or_else(|| ScanError::UnknownTable(table_id.to_owned()))?;

        let tablets = tablets(table);
        let per_shard = tablets.len().div_ceil(desired_count.max(1));
        let caller = normalize(row_set);

        let mut shards = Vec::new();
        for group in tablets.chunks(per_shard) {
            let span = RowRange::from_bounds(
                group[0].bounds().0.cloned(),
                group[group.len() - 1].bounds().1.cloned(),
            );
            let clipped = clip(&caller, &[span]);
            if clipped.is_empty() {
                continue;
            }
            shards.push(to_row_set(clipped));
        }
        Ok(shards)
    }
}

#[async_trait]
impl ShardIntersector for MemStore {
    async fn intersect(&self, row_set: &RowSet, shard: &RowSet) -> Result<RowSet, ScanError> {
        Ok(to_row_set(clip(&normalize(row_set), &normalize(shard))))
    }
}

#[async_trait]
impl ScanSource for MemStore {
    async fn open_scan(
        &self,
        table_id: &str,
        columns: &[ColumnId],
        row_set: &RowSet,
    ) -> Result<RowStream, ScanError> {
        let state = self.state.read().expect("store lock poisoned");
        let table = state
            .tables
            .get(table_id)
            .ok_or_else(|| ScanError::UnknownTable(table_id.to_owned()))?;
        for column in columns {
            if !table.families.iter().any(|family| family == column.family()) {
                return Err(ScanError::UnknownFamily {
                    table: table_id.to_owned(),
                    family: column.family().to_owned(),
                });
            }
        }

        // Normalized ranges are sorted and disjoint, so one pass over them
        // visits every matching row exactly once in key order.
        let mut rows = Vec::new();
        for range in normalize(row_set) {
            for (key, cells) in table.rows.range(range.bounds()) {
                let values = columns
                    .iter()
                    .map(|column| cells.get(column).cloned().unwrap_or_default())
                    .collect();
                rows.push(Row::new(key.clone(), values));
            }
        }

        self.started_scans.fetch_add(1, Ordering::SeqCst);
        self.open_scans.fetch_add(1, Ordering::SeqCst);
        let scan = TableScan {
            rows: rows.into_iter(),
            yielded: 0,
            fail_after: table.fail_after,
            failed: false,
            _guard: ScanGuard(Arc::clone(&self.open_scans)),
        };
        Ok(stream::iter(scan).boxed())
    }
}

#[async_trait]
impl StoreDriver for MemStore {
    async fn connect(&self, config: &ClientConfig) -> Result<(), ConnectError> {
        if self.state.read().expect("store lock poisoned").refuse_connections {
            return Err(ConnectError::Connection {
                project_id: config.project_id().to_owned(),
                instance_id: config.instance_id().to_owned(),
                reason: "connection refused".to_owned(),
            });
        }
        if let Some(provider) = config.credential_provider() {
            if provider.credentials().is_empty() {
                return Err(ConnectError::Authentication {
                    project_id: config.project_id().to_owned(),
                    instance_id: config.instance_id().to_owned(),
                });
            }
        }
        Ok(())
    }
}
