//! State storage implementation
//!
//! An explicitly constructed keyed store mapping user id to conversation
//! context. It is injected into the dispatcher and handlers so the backing
//! can later be swapped for a persistent store without touching the flows.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use super::context::ConversationContext;

/// In-memory keyed state store
#[derive(Debug, Clone, Default)]
pub struct StateStorage {
    contexts: Arc<RwLock<HashMap<i64, ConversationContext>>>,
}

impl StateStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a user's conversation context, if any
    pub async fn load_context(&self, user_id: i64) -> Option<ConversationContext> {
        self.contexts.read().await.get(&user_id).cloned()
    }

    /// Save (or replace) a user's conversation context
    pub async fn save_context(&self, context: &ConversationContext) {
        debug!(user_id = context.user_id, state = ?context.state, "Saving conversation context");
        self.contexts
            .write()
            .await
            .insert(context.user_id, context.clone());
    }

    /// Drop a user's conversation context entirely
    pub async fn delete_context(&self, user_id: i64) {
        if self.contexts.write().await.remove(&user_id).is_some() {
            debug!(user_id = user_id, "Deleted conversation context");
        }
    }

    /// Number of users currently mid-flow
    pub async fn active_count(&self) -> usize {
        self.contexts.read().await.len()
    }
}
