use tokio::sync::mpsc;

/// Receives human-readable status updates from running operations.
///
/// Reporting is fire-and-forget: implementations must not block, and a
/// failing sink never fails the operation that reported into it. Reports
/// arrive from the operation's background task; observers that render on
/// their own thread redispatch themselves.
pub trait ProgressSink: Send + Sync {
    fn report(&self, message: &str);
}

/// Sink that forwards every report over an unbounded channel.
///
/// The receiving end is whatever composes the system (a UI loop, a test).
/// If the receiver is gone the report is dropped silently.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelSink {
    /// Creates a sink together with the receiver that observes it.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ProgressSink for ChannelSink {
    fn report(&self, message: &str) {
        let _ = self.tx.send(message.to_owned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delivers_reports_in_order() {
        let (sink, mut rx) = ChannelSink::channel();
        sink.report("one");
        sink.report("two");
        assert_eq!(rx.recv().await.unwrap(), "one");
        assert_eq!(rx.recv().await.unwrap(), "two");
    }

    #[test]
    fn swallows_reports_after_receiver_drop() {
        let (sink, rx) = ChannelSink::channel();
        drop(rx);
        sink.report("nobody listens");
    }
}
