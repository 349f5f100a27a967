//! Reminder service.
//!
//! Owns the five timers that drive the application:
//!
//! - **reminder**: periodically shows the rest prompt
//! - **leave**: checks whether the user walked away
//! - **return**: checks whether an away user came back
//! - **busy**: hides a prompt nobody attended to
//! - **usage**: tallies and saves eye usage statistics
//!
//! The service never spawns threads or sleeps. The host calls [`ReminderService::tick`]
//! from a single scheduling thread and every callback runs to completion
//! before the next one starts.

pub mod events;
mod leave;
mod prompt;


pub use events::*;

use crate::capabilities::*;
use crate::config::{Config, TimerIntervals, TIP_WINDOW};
use crate::error::{Result, ServiceError};
use crate::monitor::presence::CursorPresence;
use crate::timer::{Clock, Timer};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

/// Identifies one of the service timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    Reminder,
    Leave,
    Return,
    Busy,
    Usage,
}

impl TimerKind {
    /// All timers, in the order ties are fired.
    pub const ALL: [TimerKind; 5] = [
        TimerKind::Reminder,
        TimerKind::Leave,
        TimerKind::Return,
        TimerKind::Busy,
        TimerKind::Usage,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TimerKind::Reminder => "reminder",
            TimerKind::Leave => "leave",
            TimerKind::Return => "return",
            TimerKind::Busy => "busy",
            TimerKind::Usage => "usage",
        }
    }
}

/// Where the user stands according to leave/return detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceState {
    /// Present, and nothing is checking for absence.
    Active,
    /// Present, with the leave timer counting down to the next check.
    AwayConfirming,
    /// Declared away; the return timer is watching for movement.
    Away,
}

/// Outcome of one [`ReminderService::tick`].
#[derive(Debug, Default)]
pub struct TickReport {
    /// Timers that fired, in firing order.
    pub fired: Vec<TimerKind>,
    /// Failures from timer callbacks. Other timers still fired.
    pub errors: Vec<ServiceError>,
}

/// Everything the service consumes from the outside world.
pub struct Collaborators {
    pub cursor: Box<dyn CursorProvider>,
    pub audio: Box<dyn AudioActivityProvider>,
    pub cache: Arc<dyn KeyValueCache>,
    pub windows: Box<dyn WindowManager>,
    pub statistics: Box<dyn StatisticsCollector>,
    pub screen: Box<dyn ScreenController>,
}

/// Coordinates rest reminders, presence detection and usage statistics.
pub struct ReminderService {
    config: Config,
    clock: Arc<dyn Clock>,
    presence: CursorPresence,
    windows: Box<dyn WindowManager>,
    statistics: Box<dyn StatisticsCollector>,
    screen: Box<dyn ScreenController>,
    events: EventBus,

    main_timer: Timer,
    leave_timer: Timer,
    return_timer: Timer,
    busy_timer: Timer,
    usage_timer: Timer,

    /// Visibility feeds of the prompt windows.
    visibility: Vec<broadcast::Receiver<bool>>,
    /// Leave detection switch, seeded from config and toggled at runtime.
    leave_listener: bool,
    away: bool,
    paused: bool,
    prompting: bool,
    restarts: u64,
    initialized: bool,
    exited: bool,
}

impl ReminderService {
    /// Builds the service and all of its timers, stopped.
    pub fn new(config: Config, clock: Arc<dyn Clock>, parts: Collaborators) -> Result<Self> {
        config.validate()?;
        let intervals = TimerIntervals::for_config(&config);

        tracing::debug!(?intervals, profile = ?config.profile, "Creating reminder service");

        Ok(Self {
            presence: CursorPresence::new(parts.cursor, parts.audio, parts.cache),
            windows: parts.windows,
            statistics: parts.statistics,
            screen: parts.screen,
            events: EventBus::new(),
            main_timer: Timer::new("reminder", intervals.reminder, clock.clone()),
            leave_timer: Timer::new("leave", intervals.leave, clock.clone()),
            return_timer: Timer::new("return", intervals.return_check, clock.clone()),
            busy_timer: Timer::new("busy", intervals.busy, clock.clone()),
            usage_timer: Timer::new("usage", intervals.usage, clock.clone()),
            visibility: Vec::new(),
            leave_listener: config.leave_listener,
            away: false,
            paused: false,
            prompting: false,
            restarts: 0,
            initialized: false,
            exited: false,
            config,
            clock,
        })
    }

    /// Hooks up the prompt window, takes the first cursor sample and starts.
    pub fn init(&mut self) -> Result<()> {
        if self.initialized {
            tracing::warn!("Reminder service already initialized");
            return Ok(());
        }

        let windows = self
            .windows
            .get_or_create(TIP_WINDOW, true)
            .map_err(ServiceError::Window)?;
        self.visibility = windows.iter().map(|w| w.subscribe_visibility()).collect();

        self.presence.sample_and_store();
        self.initialized = true;

        tracing::info!(
            warn_time = self.config.warn_time,
            leave_listener = self.leave_listener,
            collect_usage_data = self.config.collect_usage_data,
            "Reminder service initialized"
        );

        self.start();
        Ok(())
    }

    pub fn start(&mut self) {
        self.paused = false;
        self.do_start();
    }

    /// Halts reminders and presence detection. Usage tallying continues.
    ///
    /// A pending busy watchdog is dropped. Closing the prompt afterwards does
    /// not resume reminders until [`start`](Self::start) or a restart.
    pub fn pause(&mut self) {
        tracing::info!("Reminder service paused");
        self.paused = true;
        self.busy_timer.stop();
        self.do_stop();
    }

    /// Final statistics save and teardown. Later calls do nothing.
    ///
    /// Every shutdown step runs even if saving statistics fails; that
    /// failure is returned afterwards.
    pub fn exit(&mut self) -> Result<()> {
        if self.exited {
            return Ok(());
        }
        self.exited = true;

        let saved = if self.config.collect_usage_data {
            self.save_usage()
        } else {
            Ok(())
        };

        self.screen.release();
        self.do_stop();
        self.busy_timer.stop();
        self.usage_timer.stop();

        if let Err(e) = self.windows.close(TIP_WINDOW) {
            tracing::warn!(error = %e, "Failed to close prompt window");
        }

        tracing::info!("Reminder service stopped");
        saved
    }

    /// Subscribes to "user left" / "user returned" notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<PresenceEvent> {
        self.events.subscribe()
    }

    /// Fires every due timer, oldest deadline first.
    pub fn tick(&mut self) -> TickReport {
        let mut report = TickReport::default();
        if self.exited {
            return report;
        }

        let now = self.clock.now();
        self.drain_visibility();

        while let Some(kind) = self.next_due_timer(now) {
            self.timer_mut(kind).fire(now);
            report.fired.push(kind);

            if let Err(e) = self.dispatch(kind) {
                tracing::error!(timer = kind.name(), error = %e, "Timer callback failed");
                report.errors.push(e);
            }
            self.drain_visibility();
        }

        report
    }

    /// Time until the earliest running timer is due, if any.
    pub fn time_until_next(&self) -> Option<Duration> {
        let now = self.clock.now();
        TimerKind::ALL
            .iter()
            .filter_map(|kind| self.timer(*kind).next_due())
            .min()
            .map(|due| due.saturating_sub(now))
    }

    pub fn presence(&self) -> PresenceState {
        if self.away {
            PresenceState::Away
        } else if self.leave_timer.is_running() {
            PresenceState::AwayConfirming
        } else {
            PresenceState::Active
        }
    }

    /// Whether the rest prompt is currently visible.
    pub fn is_prompting(&self) -> bool {
        self.prompting
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Whether leave detection is currently enabled.
    pub fn leave_listener_enabled(&self) -> bool {
        self.leave_listener
    }

    /// Number of full timer restarts caused by interval changes.
    pub fn restart_count(&self) -> u64 {
        self.restarts
    }

    pub fn timer_running(&self, kind: TimerKind) -> bool {
        self.timer(kind).is_running()
    }

    pub fn timer_interval(&self, kind: TimerKind) -> Duration {
        self.timer(kind).interval()
    }

    pub fn next_due(&self, kind: TimerKind) -> Option<Duration> {
        self.timer(kind).next_due()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn timer(&self, kind: TimerKind) -> &Timer {
        match kind {
            TimerKind::Reminder => &self.main_timer,
            TimerKind::Leave => &self.leave_timer,
            TimerKind::Return => &self.return_timer,
            TimerKind::Busy => &self.busy_timer,
            TimerKind::Usage => &self.usage_timer,
        }
    }

    fn timer_mut(&mut self, kind: TimerKind) -> &mut Timer {
        match kind {
            TimerKind::Reminder => &mut self.main_timer,
            TimerKind::Leave => &mut self.leave_timer,
            TimerKind::Return => &mut self.return_timer,
            TimerKind::Busy => &mut self.busy_timer,
            TimerKind::Usage => &mut self.usage_timer,
        }
    }

    fn next_due_timer(&self, now: Duration) -> Option<TimerKind> {
        TimerKind::ALL
            .iter()
            .filter_map(|kind| self.timer(*kind).due_at(now).map(|due| (due, *kind)))
            .min_by_key(|(due, _)| *due)
            .map(|(_, kind)| kind)
    }

    fn dispatch(&mut self, kind: TimerKind) -> Result<()> {
        match kind {
            TimerKind::Reminder => self.show_rest_prompt(),
            TimerKind::Leave => {
                self.on_leave_tick();
                Ok(())
            }
            TimerKind::Return => {
                self.on_return_tick();
                Ok(())
            }
            TimerKind::Busy => self.on_busy_timeout(),
            TimerKind::Usage => self.save_usage(),
        }
    }

    fn save_usage(&mut self) -> Result<()> {
        tracing::debug!("Tallying eye usage");
        self.statistics.tally_usage()?;
        self.statistics.persist()?;
        Ok(())
    }

    fn restart(&mut self) {
        self.restarts += 1;
        tracing::info!("Restarting reminder timers");
        self.do_stop();
        self.start();
    }

    fn do_start(&mut self) {
        self.main_timer.start();
        if self.leave_listener {
            self.leave_timer.start();
        }
        if self.config.collect_usage_data {
            self.usage_timer.start();
        }
    }

    fn do_stop(&mut self) {
        self.main_timer.stop();
        self.leave_timer.stop();
        self.return_timer.stop();
        self.away = false;
    }
}
