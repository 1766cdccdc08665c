//! BonusClub Telegram Bot
//!
//! Main application entry point

use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::ChatId;
use tracing::{info, warn};

use BonusClub::{
    config::Settings,
    database::connection::{self, DatabaseConfig},
    handlers,
    services::{spawn_birthday_scheduler, ServiceFactory},
    state::StateStorage,
    utils::logging,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new()?;
    settings.validate()?;

    // Initialize logging; the guard must outlive the dispatcher
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", BonusClub::info());

    // Initialize database connection
    info!("Connecting to database...");
    let db_config = DatabaseConfig {
        url: settings.database.url.clone(),
        max_connections: settings.database.max_connections,
        min_connections: settings.database.min_connections,
        ..DatabaseConfig::default()
    };
    let db_pool = connection::create_pool(&db_config).await?;
    connection::run_migrations(&db_pool).await?;

    // Initialize bot and services
    let bot = Bot::new(&settings.bot.token);
    let services = ServiceFactory::new(bot.clone(), &settings, db_pool)?;
    let state_storage = StateStorage::new();

    // Daily birthday sweep; the config validator guarantees the time parses
    if let Some((hour, minute)) = settings.bonus.sweep_time_utc() {
        spawn_birthday_scheduler(
            services.bonus.clone(),
            services.notification.clone(),
            hour,
            minute,
        );
    }

    info!("Setting up bot handlers...");
    let services_arc = Arc::new(services);

    let mut dispatcher = Dispatcher::builder(bot, handlers::schema())
        .dependencies(dptree::deps![services_arc.clone(), state_storage])
        .default_handler(|upd| async move {
            warn!("Unhandled update: {:?}", upd);
        })
        .enable_ctrlc_handler()
        .build();

    // Admin pings ride the fire-and-forget path: an unreachable admin
    // must not keep the bot from starting or stopping.
    let admin_chat = ChatId(settings.bot.admin_id);
    services_arc
        .notification
        .send_text(admin_chat, "🤖 BonusClub bot started")
        .await;

    info!("BonusClub bot is ready, starting polling...");
    dispatcher.dispatch().await;

    services_arc
        .notification
        .send_text(admin_chat, "🛑 BonusClub bot stopped")
        .await;

    info!("BonusClub bot has been shut down.");
    Ok(())
}
