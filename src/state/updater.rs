//! Update status snapshot and its transitions.

use serde::{Deserialize, Serialize};

use super::events::UpdateEvent;

/// A release that is newer than the running build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInfo {
    pub version: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub release_url: Option<String>,
}

impl UpdateInfo {
    pub fn new(version: impl Into<String>) -> Self {
        Self { version: version.into(), notes: None, release_url: None }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_release_url(mut self, url: impl Into<String>) -> Self {
        self.release_url = Some(url.into());
        self
    }
}

/// Everything the presentation layer needs to render the update notification.
///
/// Only [`UpdateState::apply`] produces new values; readers get clones.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateState {
    pub is_update_available: bool,
    pub update_info: Option<UpdateInfo>,
    pub is_downloading: bool,
    pub download_progress: f64,
    pub downloaded_bytes: u64,
    pub total_bytes: u64,
    pub remind_me_later: bool,
}

/// Coarse classification of a snapshot, for renderers that switch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdatePhase {
    Idle,
    Available,
    Downloading,
    Downloaded,
    Dismissed,
}

impl UpdateState {
    /// Returns the state that follows `event`. Pure: no I/O, nothing outside `self`.
    pub fn apply(self, event: &UpdateEvent) -> Self {
        match event {
            UpdateEvent::ResetRemindLater => Self { remind_me_later: false, ..self },
            UpdateEvent::CheckSucceeded(info) => Self {
                is_update_available: true,
                remind_me_later: false,
                update_info: Some(info.clone()),
                ..self
            },
            UpdateEvent::CheckFoundNothing | UpdateEvent::CheckFailed => {
                Self { is_update_available: false, update_info: None, ..self }
            }
            UpdateEvent::DownloadBeganAttempt => {
                // Bytes belong to the attempt. `total_bytes` waits for the next Started.
                Self { is_downloading: true, downloaded_bytes: 0, ..self }
            }
            UpdateEvent::DownloadStarted { total: 0 } => {
                Self { total_bytes: 0, download_progress: 0.0, ..self }
            }
            UpdateEvent::DownloadStarted { total } => Self { total_bytes: *total, ..self },
            UpdateEvent::DownloadProgress { delta } => {
                let mut downloaded = self.downloaded_bytes.saturating_add(*delta);
                if self.total_bytes > 0 {
                    downloaded = downloaded.min(self.total_bytes);
                }
                let progress = if self.total_bytes > 0 {
                    downloaded as f64 / self.total_bytes as f64
                } else {
                    0.0
                };
                Self { downloaded_bytes: downloaded, download_progress: progress, ..self }
            }
            UpdateEvent::DownloadFinished => {
                Self { is_downloading: false, download_progress: 1.0, ..self }
            }
            UpdateEvent::DownloadFailed => Self { is_downloading: false, ..self },
            UpdateEvent::SetRemindMeLater(remind) => Self { remind_me_later: *remind, ..self },
        }
    }

    /// Whether the notification should be on screen at all.
    pub fn should_notify(&self) -> bool {
        self.is_update_available && !self.remind_me_later
    }

    /// Progress at 1 with no transfer running.
    ///
    /// A transfer that failed after its last byte looks the same; the return of
    /// `download_and_install_update` is the authoritative outcome.
    pub fn is_downloaded(&self) -> bool {
        !self.is_downloading && self.download_progress >= 1.0
    }

    pub fn phase(&self) -> UpdatePhase {
        if self.is_downloading {
            UpdatePhase::Downloading
        } else if self.is_downloaded() {
            UpdatePhase::Downloaded
        } else if !self.is_update_available {
            UpdatePhase::Idle
        } else if self.remind_me_later {
            UpdatePhase::Dismissed
        } else {
            UpdatePhase::Available
        }
    }

    /// Download progress as a whole percentage, rounded like the notification shows it.
    pub fn progress_pct(&self) -> u8 {
        (self.download_progress.clamp(0.0, 1.0) * 100.0).round() as u8
    }
}
