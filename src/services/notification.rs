//! Notification service implementation
//!
//! Fire-and-forget outbound sends: birthday greetings, admin broadcasts,
//! startup pings. Delivery failure (user blocked the bot, network trouble)
//! is logged and counted but never becomes the triggering actor's error,
//! and it never rolls back ledger state that was already committed.
//!
//! Handlers replying directly to the user who sent the current event use
//! the bot handle instead; those failures do propagate.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use serde::Serialize;
use teloxide::{Bot, types::ChatId, prelude::*};
use tracing::{debug, info};

use crate::utils::logging::log_delivery_failure;

/// Running delivery counters
#[derive(Debug, Default, Clone, Serialize)]
pub struct DeliveryStats {
    pub sent: u64,
    pub failed: u64,
}

/// Result of a broadcast run
#[derive(Debug, Default, Clone, Copy)]
pub struct BroadcastReport {
    pub sent: u32,
    pub failed: u32,
}

/// Pause between consecutive broadcast sends, to stay under Telegram limits
const BROADCAST_PACING: Duration = Duration::from_millis(100);

#[derive(Clone)]
pub struct NotificationService {
    bot: Bot,
    stats: Arc<Mutex<DeliveryStats>>,
}

impl NotificationService {
    pub fn new(bot: Bot) -> Self {
        Self {
            bot,
            stats: Arc::new(Mutex::new(DeliveryStats::default())),
        }
    }

    /// Send a plain text message. Returns whether delivery succeeded;
    /// failure is logged and counted, never returned as an error.
    pub async fn send_text(&self, chat_id: ChatId, text: &str) -> bool {
        match self.bot.send_message(chat_id, text).await {
            Ok(_) => {
                debug!(chat_id = chat_id.0, "Notification delivered");
                self.record(true);
                true
            }
            Err(e) => {
                log_delivery_failure(chat_id.0, &e.to_string());
                self.record(false);
                false
            }
        }
    }

    /// Send the same text to every listed user, pacing between sends.
    pub async fn broadcast(&self, user_ids: &[i64], text: &str) -> BroadcastReport {
        info!(count = user_ids.len(), "Starting broadcast");

        let mut report = BroadcastReport::default();
        for &user_id in user_ids {
            if self.send_text(ChatId(user_id), text).await {
                report.sent += 1;
            } else {
                report.failed += 1;
            }
            tokio::time::sleep(BROADCAST_PACING).await;
        }

        info!(sent = report.sent, failed = report.failed, "Broadcast finished");
        report
    }

    pub fn stats(&self) -> DeliveryStats {
        self.stats.lock().map(|s| s.clone()).unwrap_or_default()
    }

    fn record(&self, delivered: bool) {
        if let Ok(mut stats) = self.stats.lock() {
            if delivered {
                stats.sent += 1;
            } else {
                stats.failed += 1;
            }
        }
    }
}

impl std::fmt::Debug for NotificationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationService")
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}
