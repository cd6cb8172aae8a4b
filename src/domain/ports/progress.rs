//! Progress observer port.

use tokio::sync::mpsc;

use crate::domain::models::ProgressEvent;

/// Receives a notification for every step of a verification.
///
/// Called synchronously from the loop; implementations should return quickly.
pub trait ProgressObserver: Send + Sync {
    fn on_event(&self, event: &ProgressEvent);
}

/// Observer that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressObserver for NoopProgress {
    fn on_event(&self, _event: &ProgressEvent) {}
}

impl<F> ProgressObserver for F
where
    F: Fn(&ProgressEvent) + Send + Sync,
{
    fn on_event(&self, event: &ProgressEvent) {
        self(event);
    }
}

/// Forwards events into a channel so a UI can consume them as a stream.
///
/// Events are dropped once the receiver is gone.
#[derive(Debug, Clone)]
pub struct ChannelProgress(mpsc::UnboundedSender<ProgressEvent>);

impl ChannelProgress {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self(tx), rx)
    }
}

impl ProgressObserver for ChannelProgress {
    fn on_event(&self, event: &ProgressEvent) {
        let _ = self.0.send(event.clone());
    }
}
