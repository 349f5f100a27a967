//! Collaborator interfaces consumed by the reminder service.
//!
//! Everything the scheduler needs from the outside world goes through one of
//! these traits so platform code and tests can be swapped in freely.

use crate::error::{CapabilityError, StatsError};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Screen coordinate of the mouse cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CursorPoint {
    pub x: i32,
    pub y: i32,
}

impl CursorPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for CursorPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// Reads the current cursor position.
pub trait CursorProvider: Send {
    fn cursor_position(&self) -> Result<CursorPoint, CapabilityError>;
}

/// Reports whether any audio is currently playing.
pub trait AudioActivityProvider: Send {
    fn is_any_sound_playing(&self) -> Result<bool, CapabilityError>;
}

/// String key/value store shared with the rest of the application.
pub trait KeyValueCache: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
}

/// A window created by a [`WindowManager`].
pub trait WindowHandle: Send {
    /// Subscribes to visibility changes; `true` when shown, `false` when hidden.
    fn subscribe_visibility(&self) -> broadcast::Receiver<bool>;
}

/// Creates and toggles named application windows.
pub trait WindowManager: Send {
    /// Returns every window registered under `name`, creating one if needed.
    fn get_or_create(
        &mut self,
        name: &str,
        hidden: bool,
    ) -> Result<Vec<Box<dyn WindowHandle>>, CapabilityError>;

    fn show(&mut self, name: &str) -> Result<(), CapabilityError>;
    fn hide(&mut self, name: &str) -> Result<(), CapabilityError>;
    fn close(&mut self, name: &str) -> Result<(), CapabilityError>;
}

/// Accumulates and stores eye usage time.
pub trait StatisticsCollector: Send {
    /// Adds usage elapsed since the previous tally.
    fn tally_usage(&mut self) -> Result<(), StatsError>;

    /// Writes accumulated usage to durable storage.
    fn persist(&mut self) -> Result<(), StatsError>;
}

/// Display control (dimming and similar). Released once at exit.
pub trait ScreenController: Send {
    fn release(&mut self);
}
