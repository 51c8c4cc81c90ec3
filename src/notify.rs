//! Broadcast fan-out
//!
//! After a successful ingestion every registered user gets a notification.
//! Delivery is best-effort: one unreachable recipient never stops the
//! rest, permanently unreachable recipients (blocked the bot, deleted
//! their account) are evicted from the registry, and the admin only ever
//! sees the final success count.

use crate::core::types::NewContentEvent;
use crate::storage::db::{self, DbPool};
use crate::storage::registry;
use async_trait::async_trait;
use thiserror::Error;

/// Why one delivery attempt failed
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The recipient can never be reached again - evict from the registry
    #[error("recipient is permanently unreachable")]
    Blocked,

    /// A passing failure - keep the recipient, skip this round
    #[error("delivery failed: {0}")]
    Transient(String),
}

/// The transport seam for outbound messages. The host implements this over
/// its messaging platform; tests implement it over a vec.
#[async_trait]
pub trait Delivery: Send + Sync {
    async fn deliver(&self, recipient: i64, text: &str) -> Result<(), DeliveryError>;
}

/// Broadcasts `event` to every registered user; returns how many
/// deliveries succeeded.
pub async fn broadcast(delivery: &dyn Delivery, pool: &DbPool, event: &NewContentEvent) -> usize {
    let recipients = match db::get_connection(pool) {
        Ok(conn) => match registry::all_user_ids(&conn) {
            Ok(ids) => ids,
            Err(e) => {
                log::error!("Failed to list broadcast recipients: {}", e);
                return 0;
            }
        },
        Err(e) => {
            log::error!("Failed to get DB connection for broadcast: {}", e);
            return 0;
        }
    };

    let text = event.broadcast_text();
    let total = recipients.len();
    let mut delivered = 0;

    for recipient in recipients {
        match delivery.deliver(recipient, &text).await {
            Ok(()) => delivered += 1,
            Err(DeliveryError::Blocked) => {
                log::info!("Recipient {} permanently unreachable, evicting", recipient);
                match db::get_connection(pool) {
                    Ok(conn) => {
                        if let Err(e) = registry::remove_user(&conn, recipient) {
                            log::warn!("Failed to evict {}: {}", recipient, e);
                        }
                    }
                    Err(e) => log::warn!("Failed to get DB connection for eviction: {}", e),
                }
            }
            Err(DeliveryError::Transient(reason)) => {
                log::warn!("Delivery to {} failed, skipping: {}", recipient, reason);
            }
        }
    }

    log::info!("Broadcast delivered to {}/{} recipients", delivered, total);
    delivered
}
