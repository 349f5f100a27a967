//! Cursor position lookup.

use crate::capabilities::{CursorPoint, CursorProvider};
use crate::error::CapabilityError;

/// [`CursorProvider`] for the current platform.
///
/// Only Windows can report the cursor. Elsewhere every read fails, which the
/// presence detector treats as movement.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemCursor;

#[cfg(windows)]
impl CursorProvider for SystemCursor {
    fn cursor_position(&self) -> Result<CursorPoint, CapabilityError> {
        use windows::Win32::Foundation::POINT;
        use windows::Win32::UI::WindowsAndMessaging::GetCursorPos;

        let mut point = POINT::default();
        unsafe { GetCursorPos(&mut point) }
            .map_err(|e| CapabilityError::failed("cursor", e.to_string()))?;
        Ok(CursorPoint::new(point.x, point.y))
    }
}

#[cfg(not(windows))]
impl CursorProvider for SystemCursor {
    fn cursor_position(&self) -> Result<CursorPoint, CapabilityError> {
        Err(CapabilityError::Unavailable {
            capability: "cursor",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(windows))]
    #[test]
    fn test_cursor_unavailable_off_windows() {
        assert_eq!(
            SystemCursor.cursor_position(),
            Err(CapabilityError::Unavailable {
                capability: "cursor"
            })
        );
    }

    #[cfg(windows)]
    #[test]
    fn test_cursor_available_on_windows() {
        // Headless sessions may refuse the read, but never report it missing.
        let result = SystemCursor.cursor_position();
        assert!(
            matches!(result, Ok(_) | Err(CapabilityError::Failed { capability: "cursor", .. })),
            "unexpected cursor result: {result:?}"
        );
    }
}
