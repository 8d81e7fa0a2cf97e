//! Update providers: the boundary to whatever actually finds and fetches releases.

mod disabled;
mod github;
pub mod release;

use std::path::PathBuf;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt as _};
use serde::{Deserialize, Serialize};

use crate::error::{CheckError, DownloadError};
use crate::state::settings::UpdaterSettings;
use crate::state::updater::UpdateInfo;

pub use disabled::DisabledProvider;
pub use github::GitHubProvider;

/// Lifecycle signal emitted while an update downloads.
///
/// Serialized the way webview updaters report it:
/// `{"event":"Progress","data":{"chunkLength":250}}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ProgressEvent {
    #[serde(rename_all = "camelCase")]
    Started { content_length: u64 },
    #[serde(rename_all = "camelCase")]
    Progress { chunk_length: u64 },
    Finished,
}

/// Lazy, finite, non-restartable sequence of download events.
///
/// `Started` comes at most once and before any `Progress`; a successful
/// download ends with exactly one `Finished`. A failure yields one `Err` and
/// the stream ends.
pub type ProgressStream = BoxStream<'static, Result<ProgressEvent, DownloadError>>;

/// Unified provider interface
#[async_trait]
pub trait UpdateProvider: Send + Sync {
    /// Look for a newer release. "Nothing newer" is `Ok(None)`, not an error.
    async fn check(&self) -> Result<Option<UpdateInfo>, CheckError>;

    /// Download and install the release found by the last successful check.
    fn download_and_install(&self) -> ProgressStream;

    /// Provider name (for logging)
    fn provider_name(&self) -> &'static str;
}

/// A stream that fails immediately with `err`.
pub(crate) fn failed_download(err: DownloadError) -> ProgressStream {
    stream::once(futures::future::ready(Err(err))).boxed()
}

/// Resolved provider (enum dispatch)
pub enum UpdaterService {
    Disabled(DisabledProvider),
    GitHub(GitHubProvider),
}

impl UpdaterService {
    pub fn is_disabled(&self) -> bool {
        matches!(self, Self::Disabled(_))
    }
}

#[async_trait]
impl UpdateProvider for UpdaterService {
    async fn check(&self) -> Result<Option<UpdateInfo>, CheckError> {
        match self {
            Self::Disabled(p) => p.check().await,
            Self::GitHub(p) => p.check().await,
        }
    }

    fn download_and_install(&self) -> ProgressStream {
        match self {
            Self::Disabled(p) => p.download_and_install(),
            Self::GitHub(p) => p.download_and_install(),
        }
    }

    fn provider_name(&self) -> &'static str {
        match self {
            Self::Disabled(p) => p.provider_name(),
            Self::GitHub(p) => p.provider_name(),
        }
    }
}

/// Probe the host and build the best provider it supports.
///
/// Falls back to [`DisabledProvider`] when updates are turned off or the
/// platform provider cannot be initialized; never fails.
pub async fn resolve(settings: &UpdaterSettings, current_version: &str) -> UpdaterService {
    if settings.disabled {
        log::info!("Auto updater is disabled");
        return UpdaterService::Disabled(DisabledProvider);
    }

    match GitHubProvider::probe(settings, current_version, default_staging_dir()).await {
        Ok(provider) => {
            log::info!("Using {} updater for {}", provider.provider_name(), settings.repository);
            UpdaterService::GitHub(provider)
        }
        Err(e) => {
            log::warn!("Failed to load platform updater: {e}");
            UpdaterService::Disabled(DisabledProvider)
        }
    }
}

/// Where downloaded installers are staged.
pub fn default_staging_dir() -> PathBuf {
    dirs::cache_dir().unwrap_or_else(std::env::temp_dir).join("updraft").join("updates")
}
