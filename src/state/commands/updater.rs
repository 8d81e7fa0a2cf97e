use std::time::Duration;

use futures::StreamExt as _;

use crate::error::DownloadError;
use crate::provider::ProgressEvent;
use crate::state::events::UpdateEvent;
use crate::state::updater::UpdateInfo;

use super::UpdateController;

impl UpdateController {
    /// Ask the provider for a newer release and record the answer.
    ///
    /// Best effort: failures are logged and read as "no update".
    pub async fn check_for_update(&self, reset_remind_me_later: bool) -> Option<UpdateInfo> {
        if self.settings.disabled {
            log::info!("Auto updater is disabled");
            return None;
        }

        if reset_remind_me_later {
            self.store.dispatch(UpdateEvent::ResetRemindLater);
        }

        // Dev builds never trigger real update flows
        if self.settings.dev_mode {
            log::debug!("Skipping update check in development mode");
            self.store.dispatch(UpdateEvent::CheckFoundNothing);
            return None;
        }

        let provider = self.current_provider();
        match provider.check().await {
            Ok(Some(update)) => {
                log::info!("Update available: {}", update.version);
                self.store.dispatch(UpdateEvent::CheckSucceeded(update.clone()));
                Some(update)
            }
            Ok(None) => {
                log::debug!("No update available");
                self.store.dispatch(UpdateEvent::CheckFoundNothing);
                None
            }
            Err(e) => {
                log::error!("Error checking for updates: {e}");
                self.store.dispatch(UpdateEvent::CheckFailed);
                None
            }
        }
    }

    /// Download and install the available update, or send manual-only
    /// platforms to the release page.
    ///
    /// Returns `true` only when the provider reported `Finished`. Progress alone
    /// can read 1 after a transfer that failed while installing.
    ///
    /// Callers must not start a second download while `is_downloading` is set;
    /// a call that does is ignored.
    pub async fn download_and_install_update(&self) -> bool {
        if self.settings.disabled {
            log::info!("Auto updater is disabled");
            return false;
        }

        if self.settings.manual_only {
            self.open_release_page().await;
            return false;
        }

        let state = self.store.snapshot();
        let Some(update) = state.update_info else {
            return false;
        };
        if state.is_downloading {
            log::warn!("Update v{} is already downloading", update.version);
            return false;
        }

        self.store.dispatch(UpdateEvent::DownloadBeganAttempt);

        match self.fold_download().await {
            Ok(()) => {
                log::info!("Update v{} installed", update.version);
                true
            }
            Err(e) => {
                log::error!("Error downloading update: {e}");
                self.store.dispatch(UpdateEvent::DownloadFailed);
                false
            }
        }
    }

    /// Drive the provider's event stream to completion, folding each event into the store.
    async fn fold_download(&self) -> Result<(), DownloadError> {
        let mut events = self.current_provider().download_and_install();

        while let Some(event) = events.next().await {
            match event? {
                ProgressEvent::Started { content_length } => {
                    self.store.dispatch(UpdateEvent::DownloadStarted { total: content_length });
                }
                ProgressEvent::Progress { chunk_length } => {
                    self.store.dispatch(UpdateEvent::DownloadProgress { delta: chunk_length });
                    let state = self.store.snapshot();
                    log::debug!("Downloaded {} from {}", state.downloaded_bytes, state.total_bytes);
                }
                ProgressEvent::Finished => {
                    log::info!("Download finished");
                    self.store.dispatch(UpdateEvent::DownloadFinished);
                    return Ok(());
                }
            }
        }

        Err(DownloadError::Incomplete)
    }

    /// Check after the startup delay, then again every check interval.
    ///
    /// Runs until the surrounding task is dropped. Skips a round while a
    /// download is in flight or automatic checks are off.
    pub async fn run_periodic_checks(&self) {
        if self.settings.disabled {
            return;
        }

        tokio::time::sleep(self.settings.startup_delay()).await;
        if self.settings.auto_check {
            self.check_for_update(false).await;
        }

        let period = self.settings.check_interval().max(Duration::from_secs(1));
        let mut ticker = tokio::time::interval(period);
        // The first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if self.settings.auto_check && !self.store.snapshot().is_downloading {
                self.check_for_update(false).await;
            }
        }
    }
}
