//! Service layer

pub mod auth;
pub mod bonus;
pub mod notification;
pub mod scheduler;

pub use auth::{AuthService, Role};
pub use bonus::BonusService;
pub use notification::NotificationService;
pub use scheduler::spawn_birthday_scheduler;

use teloxide::Bot;
use crate::config::Settings;
use crate::database::{DatabasePool, LedgerService};
use crate::utils::errors::Result;

/// Bundle of the application services, constructed once at startup and
/// injected into the dispatcher.
#[derive(Debug, Clone)]
pub struct ServiceFactory {
    pub ledger: LedgerService,
    pub bonus: BonusService,
    pub notification: NotificationService,
    pub auth: AuthService,
}

impl ServiceFactory {
    pub fn new(bot: Bot, settings: &Settings, pool: DatabasePool) -> Result<Self> {
        let ledger = LedgerService::new(pool);
        let bonus = BonusService::new(ledger.clone(), settings.bonus.clone());
        let notification = NotificationService::new(bot);
        let auth = AuthService::new(settings.bot.admin_id);

        Ok(Self {
            ledger,
            bonus,
            notification,
            auth,
        })
    }
}
