//! Presence monitoring and the scheduling thread.
//!
//! This module contains the cursor/audio presence detector and the
//! real-time loop that drives the reminder service.

pub mod driver;
pub mod presence;

pub use driver::*;
pub use presence::*;
