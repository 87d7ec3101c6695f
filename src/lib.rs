#![deny(missing_docs)]
//! Parallel scan scheduling for sorted wide-column stores.
//!
//! The store's key space is split into shards sampled from its physical
//! layout; a parallel read opens one lazy scan per shard, runs a bounded
//! number of them at once, and interleaves their rows into a single stream.
//! The storage backend stays behind the [`source`] traits, so the same
//! pipeline drives a remote store or the bundled in-memory one.

mod logging;
pub mod mem;

// Re-export the handle types so users can do `shardscan::Client`.
pub use crate::{
    client::{Client, ClientConfig, Table},
    key::RowKey,
    range::RowRange,
    read::ReadOptions,
    row::{ColumnId, Row},
    row_set::RowSet,
    stream::RowStream,
};

/// Client and table handles plus connection configuration.
pub mod client;

/// Row keys and their byte-successor arithmetic.
pub mod key;

/// Row ranges with inclusive, exclusive, and infinite bounds.
pub mod range;

/// Per-call read options and the scan pipelines.
pub mod read;

/// Rows and column identifiers.
pub mod row;

/// Unordered unions of keys and ranges.
pub mod row_set;

/// Storage driver traits a backend implements.
pub mod source;

/// Lazy row streams.
pub mod stream;
