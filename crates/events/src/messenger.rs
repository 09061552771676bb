//! Outbound message hub toward the hosting page.
//!
//! [`HostMessenger`] is the widget-side sender: pipeline completion
//! publishes measurement and recommendation envelopes here, and
//! whatever embeds the widget subscribes and forwards them across the
//! window boundary. Backed by a `tokio::sync::broadcast` channel so
//! any number of hosting adapters can listen independently.

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

use saia_core::measurements::Measurements;
use saia_core::recommendation::Recommendation;

use crate::message::WidgetMessage;

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// A widget message addressed to a hosting context.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    /// The origin the message is scoped to; hosts on another origin
    /// must discard it.
    pub origin: String,
    pub message: WidgetMessage,
    /// When the message was published (UTC).
    pub sent_at: DateTime<Utc>,
}

/// Widget-side message sender.
#[derive(Debug, Clone)]
pub struct HostMessenger {
    sender: broadcast::Sender<OutboundMessage>,
    origin: String,
}

impl HostMessenger {
    /// Create a messenger scoped to the declared host origin.
    pub fn new(origin: impl Into<String>) -> Self {
        Self::with_capacity(origin, DEFAULT_CAPACITY)
    }

    /// Create a messenger with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are
    /// dropped and slow receivers observe a `RecvError::Lagged`.
    pub fn with_capacity(origin: impl Into<String>, capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            origin: origin.into(),
        }
    }

    /// The origin outbound messages are scoped to.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Subscribe to all messages published by this messenger.
    pub fn subscribe(&self) -> broadcast::Receiver<OutboundMessage> {
        self.sender.subscribe()
    }

    /// Publish a message to all current subscribers.
    ///
    /// If there are no active subscribers the message is silently
    /// dropped; the widget must keep working when nothing embeds it.
    pub fn publish(&self, message: WidgetMessage) {
        let envelope = OutboundMessage {
            origin: self.origin.clone(),
            message,
            sent_at: Utc::now(),
        };
        // Ignore the SendError -- it only means there are zero receivers.
        let _ = self.sender.send(envelope);
    }

    /// Notify the host of computed measurements.
    pub fn send_data(&self, measurements: &Measurements) {
        self.publish(WidgetMessage::data(measurements));
    }

    /// Notify the host of the (possibly absent) size recommendation.
    pub fn send_recommendations(&self, recommendation: Option<&Recommendation>) {
        self.publish(WidgetMessage::recommendations(recommendation));
    }

    /// Ask the host to close the embedded view.
    pub fn send_close(&self) {
        self.publish(WidgetMessage::close());
    }
}
