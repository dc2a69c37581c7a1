//! Non-blocking metrics forwarding.

use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use unicorn_core::{MetricEvent, MetricsSink, MetricsTracker};

#[derive(Debug)]
enum SinkMessage {
    Event(MetricEvent),
    Flush(oneshot::Sender<()>),
}

/// Forwards metric events to a background task over an unbounded channel.
///
/// `record` never waits on the tracker lock; a closed channel is logged
/// and the event dropped.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: UnboundedSender<SinkMessage>,
}

impl ChannelSink {
    /// Create the sink and spawn the task that feeds `tracker`.
    ///
    /// The task ends once every sink clone is dropped.
    pub fn spawn(tracker: Arc<MetricsTracker>) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(drain(rx, tracker));
        (Self { tx }, handle)
    }

    /// Wait until every event recorded before this call reached the tracker.
    ///
    /// Returns immediately if the background task is gone.
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(SinkMessage::Flush(done_tx)).is_err() {
            debug!("Metrics channel closed, nothing to flush");
            return;
        }
        let _ = done_rx.await;
    }
}

impl MetricsSink for ChannelSink {
    fn record(&self, event: MetricEvent) {
        if let Err(e) = self.tx.send(SinkMessage::Event(event)) {
            if let SinkMessage::Event(event) = e.0 {
                warn!(kind = ?event.kind, "Metrics channel closed, dropping event");
            }
        }
    }
}

async fn drain(mut rx: UnboundedReceiver<SinkMessage>, tracker: Arc<MetricsTracker>) {
    while let Some(message) = rx.recv().await {
        match message {
            SinkMessage::Event(event) => tracker.record(event),
            SinkMessage::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    debug!("Metrics channel drained");
}

#[cfg(test)]
mod tests {
    use super::*;
    use unicorn_core::TurnKind;

    #[tokio::test]
    async fn test_events_reach_tracker() {
        let tracker = Arc::new(MetricsTracker::new());
        let (sink, handle) = ChannelSink::spawn(Arc::clone(&tracker));

        sink.record(MetricEvent::new(TurnKind::Answer, 1.0));
        sink.record(MetricEvent::new(TurnKind::Clarification, 3.0));
        drop(sink);
        handle.await.unwrap();

        let summary = tracker.summary();
        assert_eq!(summary.total_queries, 2);
        assert_eq!(summary.clarifications_triggered, 1);
    }

    #[tokio::test]
    async fn test_flush_waits_for_pending_events() {
        let tracker = Arc::new(MetricsTracker::new());
        let (sink, _handle) = ChannelSink::spawn(Arc::clone(&tracker));

        for _ in 0..50 {
            sink.record(MetricEvent::new(TurnKind::Answer, 2.0));
        }
        sink.record(MetricEvent::new(TurnKind::Error, 0.0));
        sink.flush().await;

        let summary = tracker.summary();
        assert_eq!(summary.total_queries, 51);
        assert_eq!(summary.errors, 1);
    }

    #[tokio::test]
    async fn test_flush_after_task_ends_returns() {
        let tracker = Arc::new(MetricsTracker::new());
        let (sink, handle) = ChannelSink::spawn(Arc::clone(&tracker));
        handle.abort();
        let _ = handle.await;

        sink.flush().await;
        assert_eq!(tracker.summary().total_queries, 0);
    }

    #[tokio::test]
    async fn test_closed_channel_does_not_panic() {
        let tracker = Arc::new(MetricsTracker::new());
        let (sink, handle) = ChannelSink::spawn(Arc::clone(&tracker));
        handle.abort();
        let _ = handle.await;

        sink.record(MetricEvent::new(TurnKind::Error, 0.0));
        assert_eq!(tracker.summary().total_queries, 0);
    }
}
