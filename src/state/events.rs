//! Inputs to the update state machine.

use super::updater::UpdateInfo;

/// Every way the update state can change.
///
/// Check results and progress come from the provider, the rest from user intents.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateEvent {
    // User intents
    ResetRemindLater,
    SetRemindMeLater(bool),

    // Check results
    CheckSucceeded(UpdateInfo),
    CheckFoundNothing,
    CheckFailed,

    // Download lifecycle
    /// A new attempt begins. `download_progress` keeps the previous attempt's
    /// value until the first Progress, so across a retry it may step backwards.
    DownloadBeganAttempt,
    DownloadStarted { total: u64 },
    DownloadProgress { delta: u64 },
    DownloadFinished,
    DownloadFailed,
}
