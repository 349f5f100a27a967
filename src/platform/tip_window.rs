//! The rest prompt ("tip") window.
//!
//! On Windows the prompt is a topmost message box shown from a worker thread;
//! closing it counts as dealing with the prompt. Elsewhere the prompt is only
//! logged and stays "visible" until the service hides it.

use crate::capabilities::{WindowHandle, WindowManager};
use crate::config::TIP_WINDOW;
use crate::error::CapabilityError;
use crate::monitor::driver::ServiceHandle;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Title of the prompt, also used to find it again for closing.
pub const TIP_TITLE: &str = "EyeGuard";

/// Visibility feed of the tip window.
struct TipWindowHandle {
    visibility: broadcast::Sender<bool>,
}

impl WindowHandle for TipWindowHandle {
    fn subscribe_visibility(&self) -> broadcast::Receiver<bool> {
        self.visibility.subscribe()
    }
}

/// [`WindowManager`] owning the single rest prompt window.
pub struct TipWindowManager {
    visible: Arc<AtomicBool>,
    visibility: broadcast::Sender<bool>,
    service: ServiceHandle,
}

impl TipWindowManager {
    /// `service` is told to stop the busy watchdog when the user closes the prompt.
    pub fn new(service: ServiceHandle) -> Self {
        let (visibility, _) = broadcast::channel(16);
        Self {
            visible: Arc::new(AtomicBool::new(false)),
            visibility,
            service,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    fn check_name(name: &str) -> Result<(), CapabilityError> {
        if name != TIP_WINDOW {
            return Err(CapabilityError::failed(
                "window",
                format!("unknown window: {name}"),
            ));
        }
        Ok(())
    }

    fn dismiss(&self) -> Result<(), CapabilityError> {
        self.dismiss_with(close_prompt)
    }

    /// Reports the prompt hidden once `visible` flips, even if `close` fails;
    /// the worker thread stays silent after the flip.
    fn dismiss_with(
        &self,
        close: impl FnOnce() -> Result<(), CapabilityError>,
    ) -> Result<(), CapabilityError> {
        if !self.visible.swap(false, Ordering::SeqCst) {
            return Ok(());
        }

        let closed = close();
        if let Err(e) = &closed {
            tracing::warn!(error = %e, "Failed to close rest prompt");
        }
        let _ = self.visibility.send(false);
        closed
    }
}

impl WindowManager for TipWindowManager {
    fn get_or_create(
        &mut self,
        name: &str,
        hidden: bool,
    ) -> Result<Vec<Box<dyn WindowHandle>>, CapabilityError> {
        Self::check_name(name)?;
        if !hidden {
            self.show(name)?;
        }
        Ok(vec![Box::new(TipWindowHandle {
            visibility: self.visibility.clone(),
        })])
    }

    fn show(&mut self, name: &str) -> Result<(), CapabilityError> {
        Self::check_name(name)?;
        if self.visible.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let _ = self.visibility.send(true);
        open_prompt(
            Arc::clone(&self.visible),
            self.visibility.clone(),
            self.service.clone(),
        );
        Ok(())
    }

    fn hide(&mut self, name: &str) -> Result<(), CapabilityError> {
        Self::check_name(name)?;
        self.dismiss()
    }

    fn close(&mut self, name: &str) -> Result<(), CapabilityError> {
        Self::check_name(name)?;
        self.dismiss()
    }
}

/// Shows the message box on a worker thread; it blocks until closed.
#[cfg(windows)]
fn open_prompt(
    visible: Arc<AtomicBool>,
    visibility: broadcast::Sender<bool>,
    service: ServiceHandle,
) {
    use windows::Win32::UI::WindowsAndMessaging::{
        MessageBoxW, MB_ICONINFORMATION, MB_OK, MB_SETFOREGROUND, MB_TOPMOST,
    };

    std::thread::spawn(move || {
        unsafe {
            MessageBoxW(
                None,
                windows::core::w!("You've been looking at the screen for a while.\n\nLook at something 20 feet away for 20 seconds."),
                windows::core::w!("EyeGuard"),
                MB_OK | MB_ICONINFORMATION | MB_TOPMOST | MB_SETFOREGROUND,
            );
        }

        // Closed by the user rather than by hide()
        if visible.swap(false, Ordering::SeqCst) {
            tracing::debug!("Rest prompt closed by user");
            service.stop_busy_listener();
            let _ = visibility.send(false);
        }
    });
}

#[cfg(windows)]
fn close_prompt() -> Result<(), CapabilityError> {
    use windows::core::PCWSTR;
    use windows::Win32::Foundation::{LPARAM, WPARAM};
    use windows::Win32::UI::WindowsAndMessaging::{FindWindowW, PostMessageW, WM_CLOSE};

    let hwnd = unsafe { FindWindowW(PCWSTR::null(), windows::core::w!("EyeGuard")) }
        .map_err(|e| CapabilityError::failed("window", e.to_string()))?;
    unsafe { PostMessageW(hwnd, WM_CLOSE, WPARAM(0), LPARAM(0)) }
        .map_err(|e| CapabilityError::failed("window", e.to_string()))
}

#[cfg(not(windows))]
fn open_prompt(
    _visible: Arc<AtomicBool>,
    _visibility: broadcast::Sender<bool>,
    _service: ServiceHandle,
) {
    tracing::info!(title = TIP_TITLE, "Time to rest your eyes");
}

#[cfg(not(windows))]
fn close_prompt() -> Result<(), CapabilityError> {
    tracing::debug!(title = TIP_TITLE, "Rest prompt hidden");
    Ok(())
}
