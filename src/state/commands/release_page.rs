use crate::state::events::UpdateEvent;

use super::UpdateController;

impl UpdateController {
    /// Open the release page in the browser, falling back to in-app navigation.
    ///
    /// Opening the page counts as acknowledging the notification, so
    /// remind-later is set either way.
    pub async fn open_release_page(&self) {
        let url = self.settings.release_page_url();
        let shell = self.shell.clone();

        let opened = {
            let url = url.clone();
            let shell = shell.clone();
            tokio::task::spawn_blocking(move || shell.open_external(&url)).await
        };
        match opened {
            Ok(Ok(())) => log::info!("Opened release page {url}"),
            Ok(Err(e)) => {
                log::error!("Error opening release page: {e}");
                shell.navigate(&url);
            }
            Err(e) => {
                log::error!("Release page opener panicked: {e}");
                shell.navigate(&url);
            }
        }

        self.store.dispatch(UpdateEvent::SetRemindMeLater(true));
    }
}
