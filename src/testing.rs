//! Deterministic collaborators for unit tests.

use crate::capabilities::*;
use crate::error::{CapabilityError, StatsError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

/// Cursor whose position is set by the test.
#[derive(Clone)]
pub struct FakeCursor {
    position: Arc<Mutex<Option<CursorPoint>>>,
}

impl FakeCursor {
    pub fn at(x: i32, y: i32) -> Self {
        Self {
            position: Arc::new(Mutex::new(Some(CursorPoint::new(x, y)))),
        }
    }

    pub fn move_to(&self, x: i32, y: i32) {
        *self.position.lock().unwrap() = Some(CursorPoint::new(x, y));
    }

    /// Makes every subsequent read fail.
    pub fn fail(&self) {
        *self.position.lock().unwrap() = None;
    }
}

impl CursorProvider for FakeCursor {
    fn cursor_position(&self) -> Result<CursorPoint, CapabilityError> {
        self.position
            .lock()
            .unwrap()
            .ok_or_else(|| CapabilityError::failed("cursor", "scripted failure"))
    }
}

/// Audio activity toggled by the test.
#[derive(Clone)]
pub struct FakeAudio {
    playing: Arc<Mutex<Option<bool>>>,
}

impl FakeAudio {
    pub fn silent() -> Self {
        Self {
            playing: Arc::new(Mutex::new(Some(false))),
        }
    }

    pub fn set_playing(&self, playing: bool) {
        *self.playing.lock().unwrap() = Some(playing);
    }

    pub fn fail(&self) {
        *self.playing.lock().unwrap() = None;
    }
}

impl AudioActivityProvider for FakeAudio {
    fn is_any_sound_playing(&self) -> Result<bool, CapabilityError> {
        self.playing
            .lock()
            .unwrap()
            .ok_or_else(|| CapabilityError::failed("audio", "scripted failure"))
    }
}

#[derive(Debug, Default)]
struct WindowLog {
    visible: bool,
    created: usize,
    shown: usize,
    hidden: usize,
    closed: usize,
    fail_show: bool,
    fail_hide: bool,
}

/// Window manager that records calls and emits visibility synchronously.
#[derive(Clone)]
pub struct FakeWindows {
    log: Arc<Mutex<WindowLog>>,
    visibility: broadcast::Sender<bool>,
}

impl FakeWindows {
    pub fn new() -> Self {
        let (visibility, _) = broadcast::channel(16);
        Self {
            log: Arc::new(Mutex::new(WindowLog::default())),
            visibility,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.log.lock().unwrap().visible
    }

    pub fn created(&self) -> usize {
        self.log.lock().unwrap().created
    }

    pub fn shown(&self) -> usize {
        self.log.lock().unwrap().shown
    }

    pub fn hidden(&self) -> usize {
        self.log.lock().unwrap().hidden
    }

    pub fn closed(&self) -> usize {
        self.log.lock().unwrap().closed
    }

    /// Makes `show` fail without changing visibility.
    pub fn fail_show(&self, fail: bool) {
        self.log.lock().unwrap().fail_show = fail;
    }

    /// Makes `hide` fail without changing visibility.
    pub fn fail_hide(&self, fail: bool) {
        self.log.lock().unwrap().fail_hide = fail;
    }

    /// The user closes the prompt.
    pub fn dismiss(&self) {
        self.set_visible(false);
    }

    fn set_visible(&self, visible: bool) {
        let mut log = self.log.lock().unwrap();
        if log.visible != visible {
            log.visible = visible;
            let _ = self.visibility.send(visible);
        }
    }
}

impl Default for FakeWindows {
    fn default() -> Self {
        Self::new()
    }
}

struct FakeWindowHandle {
    visibility: broadcast::Sender<bool>,
}

impl WindowHandle for FakeWindowHandle {
    fn subscribe_visibility(&self) -> broadcast::Receiver<bool> {
        self.visibility.subscribe()
    }
}

impl WindowManager for FakeWindows {
    fn get_or_create(
        &mut self,
        _name: &str,
        _hidden: bool,
    ) -> Result<Vec<Box<dyn WindowHandle>>, CapabilityError> {
        self.log.lock().unwrap().created += 1;
        Ok(vec![Box::new(FakeWindowHandle {
            visibility: self.visibility.clone(),
        })])
    }

    fn show(&mut self, _name: &str) -> Result<(), CapabilityError> {
        if self.log.lock().unwrap().fail_show {
            return Err(CapabilityError::failed("window", "scripted show failure"));
        }
        self.log.lock().unwrap().shown += 1;
        self.set_visible(true);
        Ok(())
    }

    fn hide(&mut self, _name: &str) -> Result<(), CapabilityError> {
        if self.log.lock().unwrap().fail_hide {
            return Err(CapabilityError::failed("window", "scripted hide failure"));
        }
        self.log.lock().unwrap().hidden += 1;
        self.set_visible(false);
        Ok(())
    }

    fn close(&mut self, _name: &str) -> Result<(), CapabilityError> {
        self.log.lock().unwrap().closed += 1;
        self.set_visible(false);
        Ok(())
    }
}

/// Statistics collector that records the order of calls.
#[derive(Clone, Default)]
pub struct FakeStats {
    calls: Arc<Mutex<Vec<&'static str>>>,
    fail_persist: Arc<Mutex<bool>>,
}

impl FakeStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fail_persist(&self, fail: bool) {
        *self.fail_persist.lock().unwrap() = fail;
    }
}

impl StatisticsCollector for FakeStats {
    fn tally_usage(&mut self) -> Result<(), StatsError> {
        self.calls.lock().unwrap().push("tally");
        Ok(())
    }

    fn persist(&mut self) -> Result<(), StatsError> {
        self.calls.lock().unwrap().push("persist");
        if *self.fail_persist.lock().unwrap() {
            return Err(StatsError::Collector("disk full".to_string()));
        }
        Ok(())
    }
}

/// Screen controller that counts releases.
#[derive(Clone, Default)]
pub struct FakeScreen {
    releases: Arc<AtomicUsize>,
}

impl FakeScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

impl ScreenController for FakeScreen {
    fn release(&mut self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}
