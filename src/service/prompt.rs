//! Rest prompt handling: the reminder timer, prompt visibility and the busy
//! watchdog that hides an unattended prompt.

use super::ReminderService;
use crate::config::{minutes, validate_minutes, TIP_WINDOW};
use crate::error::{Result, ServiceError};
use tokio::sync::broadcast::error::TryRecvError;

impl ReminderService {
    /// Changes the reminder interval and restarts the timers.
    ///
    /// Does nothing if the interval already equals `warn_time` minutes.
    pub fn set_warn_time(&mut self, warn_time: u32) -> Result<()> {
        validate_minutes("warn_time", warn_time)?;

        let interval = minutes(warn_time);
        if self.main_timer.interval() == interval {
            tracing::debug!(minutes = warn_time, "Reminder interval unchanged");
            return Ok(());
        }

        tracing::info!(
            from_secs = self.main_timer.interval().as_secs(),
            minutes = warn_time,
            "Reminder interval changed"
        );
        self.main_timer.set_interval(interval);
        self.restart();
        Ok(())
    }

    /// Called when the user deals with the prompt before the watchdog fires.
    pub fn stop_busy_listener(&mut self) {
        if self.busy_timer.is_running() {
            self.busy_timer.stop();
        }
    }

    pub(super) fn show_rest_prompt(&mut self) -> Result<()> {
        if self.config.suppress_prompt {
            tracing::debug!("Rest prompt suppressed");
            return Ok(());
        }

        tracing::info!("Time to rest, showing prompt");
        self.busy_timer.start();
        if let Err(e) = self.windows.show(TIP_WINDOW) {
            self.busy_timer.stop();
            return Err(ServiceError::Window(e));
        }
        self.drain_visibility();
        Ok(())
    }

    pub(super) fn on_busy_timeout(&mut self) -> Result<()> {
        self.busy_timer.stop();
        tracing::info!("Rest prompt unattended, hiding it");

        let hidden = self.windows.hide(TIP_WINDOW).map_err(ServiceError::Window);
        self.drain_visibility();

        if self.leave_listener {
            self.on_leave();
        }
        hidden
    }

    /// Applies queued visibility changes from the prompt windows.
    pub(super) fn drain_visibility(&mut self) {
        let mut changes = Vec::new();
        for rx in &mut self.visibility {
            loop {
                match rx.try_recv() {
                    Ok(visible) => changes.push(visible),
                    Err(TryRecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Missed prompt visibility changes");
                    }
                    Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
                }
            }
        }

        for visible in changes {
            self.on_visibility_changed(visible);
        }
    }

    fn on_visibility_changed(&mut self, visible: bool) {
        self.prompting = visible;
        if visible {
            self.main_timer.stop();
        } else if self.away || self.paused || self.exited {
            tracing::debug!("Prompt hidden while inactive, reminder stays stopped");
        } else {
            self.main_timer.start();
        }
    }
}
