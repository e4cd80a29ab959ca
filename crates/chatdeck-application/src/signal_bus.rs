//! In-process bus for application-level signals.
//!
//! The parent view creates one bus per screen and hands subscriptions to the
//! components that react to signals. Dropping a subscription unsubscribes it;
//! dropping the bus ends every subscription.

use chatdeck_core::signal::AppSignal;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

const DEFAULT_CAPACITY: usize = 64;

/// Broadcast channel for [`AppSignal`]s.
#[derive(Clone)]
pub struct SignalBus {
    sender: broadcast::Sender<AppSignal>,
}

impl SignalBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes a signal; returns how many subscriptions will see it.
    pub fn publish(&self, signal: AppSignal) -> usize {
        match self.sender.send(signal) {
            Ok(receivers) => receivers,
            Err(_) => {
                tracing::debug!("[SignalBus] Signal dropped: no subscribers");
                0
            }
        }
    }

    pub fn subscribe(&self) -> SignalSubscription {
        SignalSubscription {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for SignalBus {
    fn default() -> Self {
        Self::new()
    }
}

/// A live subscription to a [`SignalBus`].
pub struct SignalSubscription {
    receiver: broadcast::Receiver<AppSignal>,
}

impl SignalSubscription {
    /// Waits for the next signal; `None` once the bus is gone.
    ///
    /// If the subscriber fell behind, the skipped signals are logged and
    /// reception continues with the oldest retained one.
    pub async fn recv(&mut self) -> Option<AppSignal> {
        loop {
            match self.receiver.recv().await {
                Ok(signal) => return Some(signal),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("[SignalBus] Subscriber lagged, {} signal(s) skipped", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Returns the next queued signal without waiting.
    pub fn try_recv(&mut self) -> Option<AppSignal> {
        loop {
            match self.receiver.try_recv() {
                Ok(signal) => return Some(signal),
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!("[SignalBus] Subscriber lagged, {} signal(s) skipped", skipped);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }
}
