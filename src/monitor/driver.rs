//! Real-time scheduling thread.
//!
//! The reminder service is not thread-safe by itself. This module moves it
//! onto one dedicated thread that alternates between applying queued
//! commands and ticking the timers, so no two callbacks ever overlap.

use crate::error::{Result, ServiceError};
use crate::service::ReminderService;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};

/// Operations callers can request from the scheduling thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Pause,
    OpenLeaveListener,
    CloseLeaveListener,
    SetWarnTime(u32),
    StopBusyListener,
    Exit,
}

/// Cloneable sender for [`Command`]s.
#[derive(Debug, Clone)]
pub struct ServiceHandle {
    tx: UnboundedSender<Command>,
}

impl ServiceHandle {
    /// Queues a command. Returns `false` if the scheduler has stopped.
    pub fn send(&self, command: Command) -> bool {
        if self.tx.send(command).is_err() {
            tracing::debug!(?command, "Scheduler stopped, command dropped");
            return false;
        }
        true
    }

    pub fn start(&self) -> bool {
        self.send(Command::Start)
    }

    pub fn pause(&self) -> bool {
        self.send(Command::Pause)
    }

    pub fn open_leave_listener(&self) -> bool {
        self.send(Command::OpenLeaveListener)
    }

    pub fn close_leave_listener(&self) -> bool {
        self.send(Command::CloseLeaveListener)
    }

    pub fn set_warn_time(&self, minutes: u32) -> bool {
        self.send(Command::SetWarnTime(minutes))
    }

    pub fn stop_busy_listener(&self) -> bool {
        self.send(Command::StopBusyListener)
    }

    pub fn exit(&self) -> bool {
        self.send(Command::Exit)
    }
}

/// Receiving side of the command queue, consumed by the scheduling thread.
pub struct CommandQueue {
    rx: UnboundedReceiver<Command>,
}

/// Creates a command queue and the handle that feeds it.
///
/// The handle can be given to collaborators (such as the prompt window)
/// before the service is built.
pub fn command_channel() -> (ServiceHandle, CommandQueue) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ServiceHandle { tx }, CommandQueue { rx })
}

/// Configuration for the scheduling thread.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// How often to check for due timers (default: 250ms).
    pub poll_interval: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(250),
        }
    }
}

/// Spawns the scheduling thread.
///
/// The thread initializes the service, then loops:
/// 1. Applies queued commands in arrival order
/// 2. Fires due timers
/// 3. Sleeps for the poll interval
///
/// It stops on [`Command::Exit`] or when `shutdown` is set, running
/// `ReminderService::exit` before returning.
pub fn spawn_scheduler_thread(
    mut service: ReminderService,
    mut commands: CommandQueue,
    shutdown: Arc<AtomicBool>,
    config: DriverConfig,
) -> JoinHandle<Result<()>> {
    thread::spawn(move || {
        tracing::info!(
            interval_ms = config.poll_interval.as_millis() as u64,
            "Scheduler thread started"
        );

        service.init()?;

        loop {
            if drain_commands(&mut service, &mut commands) {
                shutdown.store(true, Ordering::SeqCst);
            }

            if shutdown.load(Ordering::SeqCst) {
                break;
            }

            let report = service.tick();
            if !report.fired.is_empty() {
                tracing::trace!(fired = ?report.fired, "Timers fired");
            }

            thread::sleep(config.poll_interval);
        }

        tracing::info!("Scheduler thread shutting down");
        service.exit()
    })
}

/// Applies every queued command. Returns `true` if an exit was requested.
fn drain_commands(service: &mut ReminderService, commands: &mut CommandQueue) -> bool {
    loop {
        match commands.rx.try_recv() {
            Ok(Command::Exit) => return true,
            Ok(command) => {
                if let Err(e) = apply(service, command) {
                    tracing::warn!(?command, error = %e, "Command failed");
                }
            }
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => return false,
        }
    }
}

fn apply(service: &mut ReminderService, command: Command) -> Result<(), ServiceError> {
    tracing::debug!(?command, "Applying command");
    match command {
        Command::Start => service.start(),
        Command::Pause => service.pause(),
        Command::OpenLeaveListener => service.open_leave_listener(),
        Command::CloseLeaveListener => service.close_leave_listener(),
        Command::SetWarnTime(minutes) => service.set_warn_time(minutes)?,
        Command::StopBusyListener => service.stop_busy_listener(),
        Command::Exit => {}
    }
    Ok(())
}
