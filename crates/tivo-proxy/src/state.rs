//! Transport connection state
//!
//! A single flag written by the transport's status callback and readable
//! from any thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

/// Transport operation a status event refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    /// Subscribing to the inbound channel
    Subscribe,
    /// Unsubscribing from the inbound channel
    Unsubscribe,
    /// Publishing a message
    Publish,
}

/// Outcome reported by a status event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusCategory {
    /// Connection established
    Connected,
    /// Connection lost or closed
    Disconnected,
    /// Connection re-established after a drop
    Reconnected,
}

/// Status notification from the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEvent {
    /// Operation the status belongs to
    pub operation: Operation,
    /// What happened
    pub category: StatusCategory,
}

impl StatusEvent {
    /// Subscription established
    pub fn connected() -> Self {
        Self {
            operation: Operation::Subscribe,
            category: StatusCategory::Connected,
        }
    }

    /// Subscription lost
    pub fn disconnected() -> Self {
        Self {
            operation: Operation::Subscribe,
            category: StatusCategory::Disconnected,
        }
    }
}

/// Shared connected/disconnected flag
///
/// Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct ConnectionState {
    connected: Arc<AtomicBool>,
}

impl ConnectionState {
    /// Create a flag in the disconnected state
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the transport is connected
    pub fn is_set(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Apply a transport status event
    ///
    /// Only subscribe/unsubscribe events carrying `Connected` or
    /// `Disconnected` change the flag. Returns true if the flag changed.
    pub fn apply(&self, status: &StatusEvent) -> bool {
        if !matches!(status.operation, Operation::Subscribe | Operation::Unsubscribe) {
            return false;
        }
        let connected = match status.category {
            StatusCategory::Connected => true,
            StatusCategory::Disconnected => false,
            StatusCategory::Reconnected => return false,
        };
        let previous = self.connected.swap(connected, Ordering::AcqRel);
        if previous != connected {
            info!(
                "Transport {}",
                if connected { "connected" } else { "disconnected" }
            );
        }
        previous != connected
    }
}
