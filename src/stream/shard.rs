use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use futures_core::Stream;

use crate::{
    logging::scan_log,
    row::{ColumnId, Row},
    row_set::RowSet,
    source::{ScanError, ScanSource},
    stream::RowStream,
};

enum ScanState {
    Opening(Pin<Box<dyn Future<Output = Result<RowStream, ScanError>> + Send>>),
    Scanning(RowStream),
    Drained,
}

/// Stream over one shard's rows.
///
/// The underlying scan is not opened until the stream is first polled, so a
/// `ShardScan` that is built and then dropped never touches the store. After
/// an error the stream is fused: it reports the failure once and ends.
pub(crate) struct ShardScan {
    shard: usize,
    yielded: usize,
    state: ScanState,
}

impl ShardScan {
    pub(crate) fn new<S>(
        shard: usize,
        source: &Arc<S>,
        table_id: &str,
        columns: &Arc<[ColumnId]>,
        row_set: RowSet,
    ) -> Self
    where
        S: ScanSource + ?Sized + 'static,
    {
        let source = Arc::clone(source);
        let table_id = table_id.to_owned();
        let columns = Arc::clone(columns);
        let open = async move { source.open_scan(&table_id, &columns, &row_set).await };
        Self {
            shard,
            yielded: 0,
            state: ScanState::Opening(Box::pin(open)),
        }
    }
}

impl Stream for ShardScan {
    type Item = Result<Row, ScanError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            return match &mut self.state {
                ScanState::Opening(open) => match Pin::new(open).poll(cx) {
                    Poll::Ready(Ok(rows)) => {
                        scan_log!(log::Level::Trace, "shard_scan_open", "shard={}", self.shard);
                        self.state = ScanState::Scanning(rows);
                        continue;
                    }
                    Poll::Ready(Err(err)) => {
                        self.state = ScanState::Drained;
                        Poll::Ready(Some(Err(err)))
                    }
                    Poll::Pending => Poll::Pending,
                },
                ScanState::Scanning(rows) => match rows.as_mut().poll_next(cx) {
                    Poll::Ready(Some(Ok(row))) => {
                        self.yielded += 1;
                        Poll::Ready(Some(Ok(row)))
                    }
                    Poll::Ready(Some(Err(err))) => {
                        self.state = ScanState::Drained;
                        Poll::Ready(Some(Err(err)))
                    }
                    Poll::Ready(None) => {
                        scan_log!(
                            log::Level::Trace,
                            "shard_scan_done",
                            "shard={} rows={}",
                            self.shard,
                            self.yielded,
                        );
                        self.state = ScanState::Drained;
                        Poll::Ready(None)
                    }
                    Poll::Pending => Poll::Pending,
                },
                ScanState::Drained => Poll::Ready(None),
            };
        }
    }
}
