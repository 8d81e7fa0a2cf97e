use async_trait::async_trait;

use super::{ProgressStream, UpdateProvider, failed_download};
use crate::error::{CheckError, DownloadError};
use crate::state::updater::UpdateInfo;

/// Provider used when updates are off or no platform updater is available.
///
/// Never finds anything; downloading fails without side effects.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledProvider;

#[async_trait]
impl UpdateProvider for DisabledProvider {
    async fn check(&self) -> Result<Option<UpdateInfo>, CheckError> {
        Ok(None)
    }

    fn download_and_install(&self) -> ProgressStream {
        failed_download(DownloadError::Unsupported)
    }

    fn provider_name(&self) -> &'static str {
        "disabled"
    }
}
