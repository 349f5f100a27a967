//! Audio activity via the Windows Global System Media Transport Controls.
//!
//! Any application that integrates with the system media controls (Spotify,
//! browsers, VLC, etc.) reports a playback status. Something playing there
//! counts as audio activity. Other platforms report silence.

use crate::capabilities::AudioActivityProvider;
use crate::error::CapabilityError;
use serde::{Deserialize, Serialize};

/// Playback status of the current media session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackStatus {
    Playing,
    Paused,
    Stopped,
    Changing,
    Unknown,
}

impl PlaybackStatus {
    /// Returns true if this status means sound is coming out.
    pub fn is_audible(self) -> bool {
        self == PlaybackStatus::Playing
    }
}

#[cfg(windows)]
impl From<windows::Media::Control::GlobalSystemMediaTransportControlsSessionPlaybackStatus>
    for PlaybackStatus
{
    fn from(
        status: windows::Media::Control::GlobalSystemMediaTransportControlsSessionPlaybackStatus,
    ) -> Self {
        use windows::Media::Control::GlobalSystemMediaTransportControlsSessionPlaybackStatus as Status;
        match status {
            Status::Playing => Self::Playing,
            Status::Paused => Self::Paused,
            Status::Stopped => Self::Stopped,
            Status::Changing => Self::Changing,
            _ => Self::Unknown,
        }
    }
}

/// Fetches the playback status of the current media session.
///
/// Returns `None` when no application owns a media session.
#[cfg(windows)]
pub fn current_playback_status() -> Result<Option<PlaybackStatus>, CapabilityError> {
    use windows::Media::Control::GlobalSystemMediaTransportControlsSessionManager;

    let failed = |e: windows::core::Error| CapabilityError::failed("audio", e.to_string());

    let manager = GlobalSystemMediaTransportControlsSessionManager::RequestAsync()
        .and_then(|op| op.get())
        .map_err(failed)?;

    // No current session means nothing is playing
    let Ok(session) = manager.GetCurrentSession() else {
        return Ok(None);
    };

    let status = session
        .GetPlaybackInfo()
        .and_then(|info| info.PlaybackStatus())
        .map_err(failed)?;

    Ok(Some(status.into()))
}

#[cfg(not(windows))]
pub fn current_playback_status() -> Result<Option<PlaybackStatus>, CapabilityError> {
    Ok(None)
}

/// [`AudioActivityProvider`] backed by the system media session.
#[derive(Debug, Default, Clone, Copy)]
pub struct MediaAudioActivity;

impl AudioActivityProvider for MediaAudioActivity {
    fn is_any_sound_playing(&self) -> Result<bool, CapabilityError> {
        let status = current_playback_status()?;
        Ok(status.is_some_and(PlaybackStatus::is_audible))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_playing_is_audible() {
        assert!(PlaybackStatus::Playing.is_audible());
        assert!(!PlaybackStatus::Paused.is_audible());
        assert!(!PlaybackStatus::Stopped.is_audible());
        assert!(!PlaybackStatus::Changing.is_audible());
        assert!(!PlaybackStatus::Unknown.is_audible());
    }

    #[test]
    fn test_playback_status_serialization() {
        let status = PlaybackStatus::Playing;
        let json = serde_json::to_string(&status).unwrap();
        assert_eq!(json, "\"Playing\"");
    }

    #[cfg(not(windows))]
    #[test]
    fn test_no_media_session_off_windows() {
        assert!(!MediaAudioActivity.is_any_sound_playing().unwrap());
    }
}
