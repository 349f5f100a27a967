//! EyeGuard - rest reminders with presence detection.
//!
//! The core is [`service::ReminderService`], a single-owner state machine
//! over five timers. [`monitor::driver`] runs it on a dedicated thread and
//! [`platform`] supplies the real collaborators.

pub mod capabilities;
pub mod config;
pub mod error;
pub mod monitor;
pub mod platform;
pub mod service;
pub mod store;
pub mod timer;

#[cfg(test)]
mod testing;
