// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: MIT

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;

/// Quiet window before a refresh request is acted on; edits arriving within
/// it replace the pending request.
pub const DEFAULT_QUIET: Duration = Duration::from_millis(350);

/// Sends refresh requests into a [`RefreshCoalescer`].
#[derive(Debug, Clone)]
pub struct RefreshHandle<T> {
    tx: mpsc::UnboundedSender<T>,
}

impl<T> RefreshHandle<T> {
    /// Queue a refresh. Returns false when the coalescer is gone.
    pub fn request(&self, value: T) -> bool {
        self.tx.send(value).is_ok()
    }
}

/// Debounces bursts of refresh requests down to the most recent one.
#[derive(Debug)]
pub struct RefreshCoalescer<T> {
    rx: mpsc::UnboundedReceiver<T>,
    quiet: Duration,
}

/// Create a linked handle/coalescer pair with the given quiet window.
pub fn channel<T>(quiet: Duration) -> (RefreshHandle<T>, RefreshCoalescer<T>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (RefreshHandle { tx }, RefreshCoalescer { rx, quiet })
}

impl<T> RefreshCoalescer<T> {
    /// Wait for the next settled refresh request.
    ///
    /// Blocks until a request arrives, then keeps absorbing newer requests
    /// until the channel stays quiet for the configured window; the latest
    /// request wins. `None` once every handle is dropped and the queue is
    /// drained.
    pub async fn next(&mut self) -> Option<T> {
        let mut latest = self.rx.recv().await?;
        loop {
            match timeout(self.quiet, self.rx.recv()).await {
                Ok(Some(value)) => latest = value,
                Ok(None) | Err(_) => return Some(latest),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::channel;

    #[tokio::test]
    async fn burst_collapses_to_the_latest_request() {
        let (handle, mut coalescer) = channel(Duration::from_millis(30));
        handle.request(1);
        handle.request(2);
        handle.request(3);
        assert_eq!(coalescer.next().await, Some(3));
    }

    #[tokio::test]
    async fn separated_requests_arrive_one_by_one() {
        let (handle, mut coalescer) = channel(Duration::from_millis(10));
        handle.request("first");
        assert_eq!(coalescer.next().await, Some("first"));
        handle.request("second");
        assert_eq!(coalescer.next().await, Some("second"));
    }

    #[tokio::test]
    async fn request_within_the_quiet_window_replaces_the_pending_one() {
        let (handle, mut coalescer) = channel(Duration::from_millis(50));
        handle.request(1);
        let waiter = tokio::spawn(async move { coalescer.next().await });
        tokio::time::sleep(Duration::from_millis(20)).await;
        handle.request(2);
        assert_eq!(waiter.await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn dropped_handle_ends_the_stream() {
        let (handle, mut coalescer) = channel::<u32>(Duration::from_millis(5));
        handle.request(7);
        drop(handle);
        assert_eq!(coalescer.next().await, Some(7));
        assert_eq!(coalescer.next().await, None);
    }
}
