//! Leave and return detection.

use super::{PresenceEvent, ReminderService};

impl ReminderService {
    /// Enables leave detection and starts its timer unless already running.
    pub fn open_leave_listener(&mut self) {
        self.leave_listener = true;
        if !self.leave_timer.is_running() {
            self.leave_timer.start();
        }
    }

    /// Disables leave and return detection and makes sure reminders keep going.
    ///
    /// Stays disabled across restarts and unattended prompts until reopened.
    pub fn close_leave_listener(&mut self) {
        self.leave_listener = false;
        self.leave_timer.stop();
        self.return_timer.stop();
        self.away = false;
        if !self.main_timer.is_running() {
            self.main_timer.start();
        }
    }

    /// Declares the user away: reminders stop and the return check starts.
    pub fn on_leave(&mut self) {
        if self.away {
            tracing::debug!("User already away");
            return;
        }

        tracing::info!("User left");
        self.leave_timer.stop();
        self.return_timer.start();
        self.main_timer.stop();
        self.away = true;
        self.events.publish(PresenceEvent::left());
    }

    pub(super) fn on_leave_tick(&mut self) {
        if self.presence.is_user_away() {
            self.on_leave();
        }
        self.presence.sample_and_store();
    }

    pub(super) fn on_return_tick(&mut self) {
        if self.presence.has_moved() {
            tracing::info!("User returned");
            self.return_timer.stop();
            if self.leave_listener {
                self.leave_timer.start();
            }
            self.main_timer.start();
            self.away = false;
            self.events.publish(PresenceEvent::returned());
        }
        self.presence.sample_and_store();
    }
}
