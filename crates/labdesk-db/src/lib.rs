//! LabDesk Data Layer
//!
//! Async Redis-based persistence for maintenance request records.

pub mod broadcast;
pub mod client;
pub mod queries;

pub use broadcast::{
    BroadcastReceiver, BroadcastSender, WebSocketMessage, create_broadcast_channel,
};
pub use client::{DbError, DbPool, DbResult, init_pool};
pub use queries::requests;

/// Initialize a pool reading LABDESK_REDIS_URL / REDIS_URL from the
/// environment, falling back to the local default.
pub async fn init_pool_from_env() -> DbResult<DbPool> {
    let url = std::env::var("LABDESK_REDIS_URL")
        .or_else(|_| std::env::var("REDIS_URL"))
        .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
    client::init_pool(&url).await
}
