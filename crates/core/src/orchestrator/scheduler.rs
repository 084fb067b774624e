//! Daily trigger scheduler.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{Duration, Local, NaiveDateTime, NaiveTime};
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use super::backup::BackupController;
use super::config::{ScheduleConfig, ScheduleError};
use super::publish::PublishController;
use super::trigger::TriggerController;

/// Fires each controller once per day at its configured local time.
///
/// One loop per trigger; a loop sleeps until its next slot, runs its
/// controller to completion, then sleeps again, so the same controller
/// never overlaps itself.
pub struct Scheduler {
    trigger: Arc<TriggerController>,
    backup: Arc<BackupController>,
    publish_primary: Arc<PublishController>,
    publish_secondary: Arc<PublishController>,
    schedule: ScheduleConfig,

    running: Arc<AtomicBool>,
    shutdown_tx: broadcast::Sender<()>,
}

impl Scheduler {
    pub fn new(
        trigger: Arc<TriggerController>,
        backup: Arc<BackupController>,
        publish_primary: Arc<PublishController>,
        publish_secondary: Arc<PublishController>,
        schedule: ScheduleConfig,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            trigger,
            backup,
            publish_primary,
            publish_secondary,
            schedule,
            running: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Start the scheduler (spawns one loop per daily trigger).
    pub fn start(&self) -> Result<(), ScheduleError> {
        self.schedule.validate()?;

        if !self.schedule.enabled {
            info!("scheduler disabled by configuration");
            return Ok(());
        }
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("scheduler already running");
            return Ok(());
        }

        info!(
            main = %self.schedule.main,
            backup_check = %self.schedule.backup_check,
            publish_primary = %self.schedule.publish_primary,
            publish_secondary = %self.schedule.publish_secondary,
            "starting scheduler"
        );

        let slot = ScheduleConfig::parse_slot(&self.schedule.main)?;
        let trigger = Arc::clone(&self.trigger);
        self.spawn_daily("main", slot, move || {
            let trigger = Arc::clone(&trigger);
            async move {
                if let Err(e) = trigger.run().await {
                    error!(error = %e, "main trigger failed");
                }
            }
        });

        let slot = ScheduleConfig::parse_slot(&self.schedule.backup_check)?;
        let backup = Arc::clone(&self.backup);
        self.spawn_daily("backup_check", slot, move || {
            let backup = Arc::clone(&backup);
            async move {
                if let Err(e) = backup.run().await {
                    error!(error = %e, "backup check failed");
                }
            }
        });

        let slot = ScheduleConfig::parse_slot(&self.schedule.publish_primary)?;
        let publish = Arc::clone(&self.publish_primary);
        self.spawn_daily("publish_primary", slot, move || {
            let publish = Arc::clone(&publish);
            async move {
                if let Err(e) = publish.run().await {
                    error!(error = %e, "primary publish failed");
                }
            }
        });

        let slot = ScheduleConfig::parse_slot(&self.schedule.publish_secondary)?;
        let publish = Arc::clone(&self.publish_secondary);
        self.spawn_daily("publish_secondary", slot, move || {
            let publish = Arc::clone(&publish);
            async move {
                if let Err(e) = publish.run().await {
                    error!(error = %e, "secondary publish failed");
                }
            }
        });

        Ok(())
    }

    /// Stop the scheduler gracefully.
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        info!("stopping scheduler");
        let _ = self.shutdown_tx.send(());
    }

    fn spawn_daily<F, Fut>(&self, name: &'static str, slot: NaiveTime, task: F)
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let running = Arc::clone(&self.running);
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            info!(trigger = name, slot = %slot.format("%H:%M"), "trigger loop started");
            loop {
                let wait = duration_until_next(Local::now().naive_local(), slot);
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!(trigger = name, "trigger loop received shutdown signal");
                        break;
                    }
                    _ = tokio::time::sleep(wait) => {
                        if !running.load(Ordering::Relaxed) {
                            break;
                        }
                        info!(trigger = name, "trigger firing");
                        task().await;
                    }
                }
            }
        });
    }
}

/// Time until the next occurrence of `slot`, local wall clock.
fn duration_until_next(now: NaiveDateTime, slot: NaiveTime) -> std::time::Duration {
    let today = now.date().and_time(slot);
    let next = if today > now {
        today
    } else {
        today + Duration::days(1)
    };
    (next - now).to_std().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 14)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_slot_later_today() {
        let wait = duration_until_next(at(16, 0, 0), NaiveTime::from_hms_opt(17, 0, 0).unwrap());
        assert_eq!(wait.as_secs(), 3600);
    }

    #[test]
    fn test_slot_already_passed_wraps_to_tomorrow() {
        let wait = duration_until_next(at(17, 30, 0), NaiveTime::from_hms_opt(17, 0, 0).unwrap());
        assert_eq!(wait.as_secs(), 23 * 3600 + 1800);
    }

    #[test]
    fn test_slot_exactly_now_waits_a_full_day() {
        let now = at(17, 0, 0);
        let wait = duration_until_next(now, now.time().with_second(0).unwrap());
        assert_eq!(wait.as_secs(), 24 * 3600);
    }
}
