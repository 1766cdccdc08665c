//! Logging configuration and setup
//!
//! Structured logging initialization and a few helpers for the log events
//! that matter to the ledger audit trail.

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use crate::config::LoggingConfig;
use crate::utils::errors::Result;

/// Initialize logging based on configuration.
///
/// Returns the appender guard; dropping it stops the file writer, so the
/// caller must keep it alive for the process lifetime.
pub fn init_logging(config: &LoggingConfig) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let file_appender = tracing_appender::rolling::daily(&config.file_path, "bonusclub.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking))
        .init();

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log a posted ledger mutation with structured data
pub fn log_ledger_posting(user_id: i64, amount: i64, operation: &str, description: &str) {
    info!(
        user_id = user_id,
        amount = amount,
        operation = operation,
        description = description,
        "Ledger transaction posted"
    );
}

/// Log admin actions
pub fn log_admin_action(admin_id: i64, action: &str, target: Option<i64>) {
    warn!(
        admin_id = admin_id,
        action = action,
        target_id = target,
        "Admin action performed"
    );
}

/// Log an outbound delivery failure. Delivery failures are non-fatal and are
/// never surfaced to the actor that triggered the send.
pub fn log_delivery_failure(chat_id: i64, error: &str) {
    warn!(
        chat_id = chat_id,
        error = error,
        "Outbound delivery failed"
    );
}
