//! In-app update coordinator.
//!
//! Checks for newer releases through an [`provider::UpdateProvider`], drives
//! the download or sends the user to the release page, and publishes an
//! [`state::UpdateState`] snapshot for whatever renders the notification.

pub mod error;
pub mod provider;
pub mod shell;
pub mod state;

pub use error::{CheckError, DownloadError, Error, Result, ShellOpenError};
pub use provider::{ProgressEvent, ProgressStream, UpdateProvider, UpdaterService};
pub use shell::{Shell, SystemShell};
pub use state::{UpdateController, UpdateInfo, UpdatePhase, UpdateState, UpdaterSettings};
