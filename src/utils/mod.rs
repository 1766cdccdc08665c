//! Utility modules

pub mod errors;
pub mod logging;
pub mod validation;

pub use errors::{BonusClubError, Result};
