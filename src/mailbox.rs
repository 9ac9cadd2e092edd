//! Bounded task mailboxes

use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, channel::Channel};

/// The capacity of every task mailbox
pub const MAILBOX_CAPACITY: usize = 10;

/// Bounded FIFO mailbox consumed by exactly one task.
///
/// Sending blocks while the mailbox is full and receiving blocks while it is empty; messages are
/// never dropped.
pub struct Mailbox<T> {
    /// The underlying channel
    channel: Channel<CriticalSectionRawMutex, T, MAILBOX_CAPACITY>,
}

impl<T> Mailbox<T> {
    /// Creates an empty mailbox
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
        }
    }

    /// Queues a message, waiting for room if the mailbox is full
    pub async fn send(&self, message: T) {
        self.channel.send(message).await;
    }

    /// Waits for the next message
    pub async fn receive(&self) -> T {
        self.channel.receive().await
    }

    /// Takes the next message if one is queued
    pub fn try_receive(&self) -> Option<T> {
        self.channel.try_receive().ok()
    }

    /// Number of queued messages
    pub fn len(&self) -> usize {
        self.channel.len()
    }

    /// Whether no message is queued
    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }
}

impl<T> Default for Mailbox<T> {
    fn default() -> Self {
        Self::new()
    }
}
