//! Daily birthday sweep scheduling
//!
//! A background task that wakes at the configured HH:MM (UTC) once per day
//! and runs the birthday sweep. The task only reads the clock and delegates;
//! all idempotence lives in the ledger, so an extra run is harmless.

use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::services::bonus::BonusService;
use crate::services::notification::NotificationService;

/// Spawn the daily sweep task. Aborting the returned handle stops it.
pub fn spawn_birthday_scheduler(
    bonus: BonusService,
    notifier: NotificationService,
    hour: u32,
    minute: u32,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(hour = hour, minute = minute, "Birthday scheduler started (UTC)");
        loop {
            let now = Utc::now();
            let next = next_run_after(now, hour, minute);
            let wait = (next - now)
                .to_std()
                .unwrap_or_else(|_| std::time::Duration::from_secs(60));
            info!(next_run = %next, "Birthday sweep scheduled");
            tokio::time::sleep(wait).await;

            let today = Utc::now().date_naive();
            match bonus.run_birthday_sweep(today, &notifier).await {
                Ok(report) => {
                    info!(
                        credited = report.credited,
                        notified = report.notified,
                        failed = report.failed_notifications,
                        "Scheduled birthday sweep finished"
                    );
                }
                Err(e) => {
                    error!(error = %e, "Scheduled birthday sweep failed");
                }
            }
        }
    })
}

/// First HH:MM (UTC) strictly after `now`
fn next_run_after(now: DateTime<Utc>, hour: u32, minute: u32) -> DateTime<Utc> {
    let today_at = now
        .date_naive()
        .and_hms_opt(hour, minute, 0)
        .map(|dt| Utc.from_utc_datetime(&dt));

    match today_at {
        Some(at) if at > now => at,
        Some(at) => at + ChronoDuration::days(1),
        // hour/minute are validated at config load; fall back to a day out
        None => now + ChronoDuration::days(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.from_utc_datetime(
            &NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(h, min, 0)
                .unwrap(),
        )
    }

    #[test]
    fn test_next_run_later_today() {
        let now = utc(2024, 3, 10, 8, 0);
        assert_eq!(next_run_after(now, 10, 30), utc(2024, 3, 10, 10, 30));
    }

    #[test]
    fn test_next_run_rolls_to_tomorrow() {
        let now = utc(2024, 3, 10, 11, 0);
        assert_eq!(next_run_after(now, 10, 30), utc(2024, 3, 11, 10, 30));
    }

    #[test]
    fn test_next_run_exact_time_rolls_over() {
        let now = utc(2024, 3, 10, 10, 30);
        assert_eq!(next_run_after(now, 10, 30), utc(2024, 3, 11, 10, 30));
    }
}
