//! Broadcast channel for real-time WebSocket updates.
//!
//! Uses a tokio broadcast channel for in-process communication between the
//! route handlers and connected dashboard clients.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// WebSocket message types for real-time updates.
#[derive(Clone, Serialize, Deserialize, Debug)]
#[serde(tag = "type", content = "data")]
pub enum WebSocketMessage {
    /// A request's fields or step pointer changed.
    RequestUpdated { request_id: String, step: u8 },
    /// An admin decision was recorded.
    DecisionRecorded { request_id: String, status: String },
    /// Request a full dashboard refresh.
    DashboardRefresh,
}

/// Type alias for the broadcast sender.
pub type BroadcastSender = broadcast::Sender<WebSocketMessage>;

/// Type alias for the broadcast receiver.
pub type BroadcastReceiver = broadcast::Receiver<WebSocketMessage>;

/// Create a new broadcast channel with default capacity.
pub fn create_broadcast_channel() -> BroadcastSender {
    let (tx, _rx) = broadcast::channel(100);
    tx
}
