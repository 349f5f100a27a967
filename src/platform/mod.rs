//! Platform implementations of the service collaborators.
//!
//! Windows gets real cursor, media and prompt support through the `windows`
//! crate. Other platforms get fallbacks that keep the scheduler running.

pub mod cursor;
pub mod media;
pub mod tip_window;

pub use cursor::*;
pub use media::*;
pub use tip_window::*;

use crate::capabilities::ScreenController;

/// Screen controller for builds without display control.
#[derive(Debug, Default)]
pub struct NullScreen {
    released: bool,
}

impl NullScreen {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScreenController for NullScreen {
    fn release(&mut self) {
        if !self.released {
            self.released = true;
            tracing::debug!("Screen control released");
        }
    }
}
