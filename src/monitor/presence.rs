//! Cursor based presence detection.
//!
//! The user counts as present if the cursor moved since the last stored
//! sample or if any audio is playing. Sampling and comparing are separate
//! steps so the caller decides when the reference point moves.

use crate::capabilities::{AudioActivityProvider, CursorPoint, CursorProvider, KeyValueCache};
use std::sync::Arc;

/// Cache key holding the last sampled cursor position.
pub const CURSOR_POS_KEY: &str = "CursorPos";

/// Classifies the user as idle or active from cursor and audio signals.
pub struct CursorPresence {
    cursor: Box<dyn CursorProvider>,
    audio: Box<dyn AudioActivityProvider>,
    cache: Arc<dyn KeyValueCache>,
}

impl CursorPresence {
    pub fn new(
        cursor: Box<dyn CursorProvider>,
        audio: Box<dyn AudioActivityProvider>,
        cache: Arc<dyn KeyValueCache>,
    ) -> Self {
        Self {
            cursor,
            audio,
            cache,
        }
    }

    /// Reads the cursor and overwrites the stored sample.
    ///
    /// On a read failure the previous sample is kept.
    pub fn sample_and_store(&self) -> Option<CursorPoint> {
        match self.cursor.cursor_position() {
            Ok(point) => {
                self.cache.set(CURSOR_POS_KEY, point.to_string());
                tracing::trace!(%point, "Cursor sampled");
                Some(point)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to sample cursor position");
                None
            }
        }
    }

    /// Whether the cursor differs from the stored sample.
    ///
    /// Reports movement when there is no stored sample or the cursor cannot
    /// be read, so a flaky read never makes the user look away.
    pub fn has_moved(&self) -> bool {
        let current = match self.cursor.cursor_position() {
            Ok(point) => point,
            Err(e) => {
                tracing::warn!(error = %e, "Cursor unreadable, assuming movement");
                return true;
            }
        };

        match self.cache.get(CURSOR_POS_KEY) {
            Some(before) => before != current.to_string(),
            None => true,
        }
    }

    /// True when the cursor is still and nothing is playing.
    pub fn is_user_away(&self) -> bool {
        if self.has_moved() {
            return false;
        }

        match self.audio.is_any_sound_playing() {
            Ok(playing) => !playing,
            Err(e) => {
                tracing::warn!(error = %e, "Audio state unreadable, assuming playback");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryCache;
    use crate::testing::{FakeAudio, FakeCursor};

    fn detector(cursor: &FakeCursor, audio: &FakeAudio) -> (CursorPresence, Arc<MemoryCache>) {
        let cache = Arc::new(MemoryCache::new());
        let presence = CursorPresence::new(
            Box::new(cursor.clone()),
            Box::new(audio.clone()),
            cache.clone(),
        );
        (presence, cache)
    }

    #[test]
    fn test_first_check_reports_movement() {
        let cursor = FakeCursor::at(10, 10);
        let (presence, _) = detector(&cursor, &FakeAudio::silent());
        assert!(presence.has_moved());
    }

    #[test]
    fn test_has_moved_does_not_store() {
        let cursor = FakeCursor::at(10, 10);
        let (presence, cache) = detector(&cursor, &FakeAudio::silent());

        presence.sample_and_store();
        assert!(!presence.has_moved());

        cursor.move_to(11, 10);
        assert!(presence.has_moved());
        assert!(presence.has_moved());
        assert_eq!(cache.get(CURSOR_POS_KEY).as_deref(), Some("10,10"));

        presence.sample_and_store();
        assert!(!presence.has_moved());
    }

    #[test]
    fn test_cursor_failure_is_fail_open() {
        let cursor = FakeCursor::at(3, 4);
        let (presence, cache) = detector(&cursor, &FakeAudio::silent());
        presence.sample_and_store();

        cursor.fail();
        assert!(presence.has_moved());
        assert!(!presence.is_user_away());

        assert!(presence.sample_and_store().is_none());
        assert_eq!(cache.get(CURSOR_POS_KEY).as_deref(), Some("3,4"));
    }

    #[test]
    fn test_away_requires_silence() {
        let cursor = FakeCursor::at(0, 0);
        let audio = FakeAudio::silent();
        let (presence, _) = detector(&cursor, &audio);
        presence.sample_and_store();

        assert!(presence.is_user_away());

        audio.set_playing(true);
        assert!(!presence.is_user_away());

        audio.fail();
        assert!(!presence.is_user_away());
    }
}
