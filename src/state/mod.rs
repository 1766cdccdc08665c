//! Conversation state management

pub mod context;
pub mod storage;

pub use context::{ConversationContext, ConversationState};
pub use storage::StateStorage;
