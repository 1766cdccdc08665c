//! Update handlers
//!
//! Routing order for an incoming update: callback queries resolve
//! state-scoped data before the global set; messages resolve commands
//! first, then the current conversation state, then menu labels, and
//! unmatched text is ignored.

pub mod callbacks;
pub mod commands;
pub mod keyboards;
pub mod messages;

pub use commands::Command;

use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use crate::utils::errors::BonusClubError;

/// The full dptree handler schema, wired in `main`.
pub fn schema() -> UpdateHandler<BonusClubError> {
    dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(commands::handle_command),
        )
        .branch(Update::filter_callback_query().endpoint(callbacks::handle_callback))
        .branch(Update::filter_message().endpoint(messages::handle_message))
}
