use std::{
    collections::VecDeque,
    pin::Pin,
    task::{Context, Poll},
};

use futures_core::Stream;
use pin_project_lite::pin_project;

use crate::{logging::scan_log, row::Row, source::ScanError, stream::shard::ShardScan};

pin_project! {
    /// Merges shard scans into one stream, running at most `concurrency` of
    /// them at a time.
    ///
    /// The first `concurrency` scans occupy slots; the rest wait in a queue
    /// and take over a slot as soon as its scan is exhausted, so no more
    /// than `concurrency` scans are ever open at once. Rows are taken one
    /// per slot per round. With `ordered` set the round-robin is strict:
    /// the stream waits on the cursor slot instead of skipping past a slot
    /// that is not ready, making the output sequence reproducible.
    ///
    /// The first scan error ends the stream: the remaining slots and the
    /// queue are dropped, which cancels their scans, and the error is
    /// yielded once before the stream fuses.
    pub(crate) struct InterleaveStream {
        slots: Vec<ShardScan>,
        pending: VecDeque<ShardScan>,
        cursor: usize,
        ordered: bool,
        failed: bool,
    }
}

impl InterleaveStream {
    pub(crate) fn new(scans: Vec<ShardScan>, concurrency: usize, ordered: bool) -> Self {
        let mut pending: VecDeque<ShardScan> = scans.into();
        let slots = pending
            .drain(..concurrency.max(1).min(pending.len()))
            .collect();
        Self {
            slots,
            pending,
            cursor: 0,
            ordered,
            failed: false,
        }
    }
}

impl Stream for InterleaveStream {
    type Item = Result<Row, ScanError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();
        if *this.failed {
            return Poll::Ready(None);
        }
        // Slots seen Pending since the last time one made progress.
        let mut idle = 0;
        while !this.slots.is_empty() {
            if *this.cursor >= this.slots.len() {
                *this.cursor = 0;
            }
            let idx = *this.cursor;
            match Pin::new(&mut this.slots[idx]).poll_next(cx) {
                Poll::Ready(Some(Ok(row))) => {
                    *this.cursor = idx + 1;
                    return Poll::Ready(Some(Ok(row)));
                }
                Poll::Ready(Some(Err(err))) => {
                    let siblings = this.slots.len() - 1 + this.pending.len();
                    this.slots.clear();
                    this.pending.clear();
                    *this.failed = true;
                    scan_log!(
                        log::Level::Warn,
                        "scan_failed",
                        "dropped_siblings={} error={}",
                        siblings,
                        err,
                    );
                    return Poll::Ready(Some(Err(err)));
                }
                Poll::Ready(None) => {
                    match this.pending.pop_front() {
                        Some(next) => this.slots[idx] = next,
                        None => {
                            this.slots.remove(idx);
                        }
                    }
                    idle = 0;
                }
                Poll::Pending => {
                    if *this.ordered {
                        return Poll::Pending;
                    }
                    *this.cursor = idx + 1;
                    idle += 1;
                    if idle >= this.slots.len() {
                        return Poll::Pending;
                    }
                }
            }
        }
        Poll::Ready(None)
    }
}
