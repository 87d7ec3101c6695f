//! Lazy row streams and the combinators that compose them.

pub(crate) mod interleave;
pub(crate) mod shard;

use futures_util::stream::BoxStream;

use crate::{row::Row, source::ScanError};

/// Lazy, fallible stream of scanned rows.
///
/// No store work happens until the stream is polled, and dropping it cancels
/// whatever scans it still holds open.
pub type RowStream = BoxStream<'static, Result<Row, ScanError>>;
