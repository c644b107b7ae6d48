//! Diagnostic channel for problems that are reported instead of returned.

use crate::error::DataLayerError;
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

/// Default number of buffered diagnostics before the oldest are dropped.
pub const DEFAULT_DIAGNOSTICS_BUFFER: usize = 1000;

/// Logs problems and forwards them to a bounded channel.
#[derive(Clone, Debug)]
pub struct Diagnostics {
    sender: Sender<DataLayerError>,
    receiver: Receiver<DataLayerError>,
}

impl Diagnostics {
    pub fn new(buffer_size: usize) -> Self {
        let (sender, receiver) = bounded(buffer_size.max(1));
        Self { sender, receiver }
    }

    /// Report a problem. Never blocks; when the buffer is full the oldest
    /// buffered diagnostic makes room for the new one.
    pub fn report(&self, error: DataLayerError) {
        tracing::error!(error = %error, "data layer diagnostic");
        if let Err(TrySendError::Full(error)) = self.sender.try_send(error) {
            let _ = self.receiver.try_recv();
            tracing::debug!("diagnostics buffer full, dropped oldest");
            // Another reporter may refill the slot first; then this one is lost.
            let _ = self.sender.try_send(error);
        }
    }

    /// A receiver for reported problems. All receivers share one queue.
    pub fn subscribe(&self) -> Receiver<DataLayerError> {
        self.receiver.clone()
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new(DEFAULT_DIAGNOSTICS_BUFFER)
    }
}
