//! Conversation context management
//!
//! Tracks which step of a multi-turn flow a user is in, plus the transient
//! data collected along the way (pending name, pending referrer, managed
//! user id). A context lives from the first state-set until the flow
//! completes, is cancelled, or errors out; starting a new top-level flow
//! always drops the previous data bag so nothing leaks between flows.

use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

use crate::utils::errors::{BonusClubError, Result};

/// Flat set of conversation states. User flows and admin flows share the
/// same keyed store; role gating happens in the dispatcher, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConversationState {
    // User registration flow
    AwaitingFullName,
    AwaitingBirthDate,
    // User redemption flow
    AwaitingRedeemAmount,
    // Admin: promotion CRUD
    AddPromotionTitle,
    AddPromotionDescription,
    DeletePromotion,
    // Admin: broadcast
    Broadcast,
    // Admin: user balance management
    ManageUserSelect,
    ManageUserAction,
    ManageUserAmount,
    // Admin: codeword CRUD
    AddBonusWord,
    EditBonusWordSelect,
    EditBonusWordNew,
    DeleteBonusWord,
}

impl ConversationState {
    /// States reachable only through the admin panel
    pub fn is_admin_flow(self) -> bool {
        !matches!(
            self,
            Self::AwaitingFullName | Self::AwaitingBirthDate | Self::AwaitingRedeemAmount
        )
    }
}

/// Per-user conversation context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationContext {
    pub user_id: i64,
    pub state: Option<ConversationState>,
    /// Flow-scoped data bag
    pub data: HashMap<String, serde_json::Value>,
    pub updated_at: DateTime<Utc>,
}

impl ConversationContext {
    pub fn new(user_id: i64) -> Self {
        Self {
            user_id,
            state: None,
            data: HashMap::new(),
            updated_at: Utc::now(),
        }
    }

    /// Enter a top-level flow: clears any stale data from a previous flow.
    pub fn begin(&mut self, state: ConversationState) {
        self.state = Some(state);
        self.data.clear();
        self.updated_at = Utc::now();
    }

    /// Advance within the current flow, keeping the data bag.
    pub fn advance(&mut self, state: ConversationState) -> Result<()> {
        if self.state.is_none() {
            return Err(BonusClubError::InvalidStateTransition {
                from: "none".to_string(),
                to: format!("{state:?}"),
            });
        }
        self.state = Some(state);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Terminal transition: flow completed, cancelled, or abandoned.
    pub fn clear(&mut self) {
        self.state = None;
        self.data.clear();
        self.updated_at = Utc::now();
    }

    pub fn is_in(&self, state: ConversationState) -> bool {
        self.state == Some(state)
    }

    pub fn set_data<T: Serialize>(&mut self, key: &str, value: T) -> Result<()> {
        let json_value = serde_json::to_value(value)?;
        self.data.insert(key.to_string(), json_value);
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn get_data<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        self.data
            .get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get_data::<String>(key)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get_data::<i64>(key)
    }
}
