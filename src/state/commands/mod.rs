//! The update controller: user intents in, provider calls out, state folded in between.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::watch;

use crate::provider::{DisabledProvider, UpdateProvider};
use crate::shell::Shell;
use crate::state::events::UpdateEvent;
use crate::state::settings::UpdaterSettings;
use crate::state::store::UpdateStore;
use crate::state::updater::UpdateState;

mod release_page;
mod updater;

/// Owns the update state and every path that mutates it.
///
/// All methods take `&self`; the presentation layer calls them and renders
/// snapshots from [`UpdateController::subscribe`].
pub struct UpdateController {
    settings: UpdaterSettings,
    provider: RwLock<Arc<dyn UpdateProvider>>,
    shell: Arc<dyn Shell>,
    store: UpdateStore,
}

impl UpdateController {
    pub fn new(
        settings: UpdaterSettings,
        provider: Arc<dyn UpdateProvider>,
        shell: Arc<dyn Shell>,
    ) -> Self {
        Self { settings, provider: RwLock::new(provider), shell, store: UpdateStore::new() }
    }

    /// Controller that answers "no update" until a real provider is installed.
    pub fn with_disabled_provider(settings: UpdaterSettings, shell: Arc<dyn Shell>) -> Self {
        Self::new(settings, Arc::new(DisabledProvider), shell)
    }

    /// Swap in the provider produced by [`crate::provider::resolve`].
    pub fn install_provider(&self, provider: Arc<dyn UpdateProvider>) {
        log::info!("Updater provider: {}", provider.provider_name());
        *self.provider.write() = provider;
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.read().provider_name()
    }

    pub fn settings(&self) -> &UpdaterSettings {
        &self.settings
    }

    pub fn state(&self) -> UpdateState {
        self.store.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<UpdateState> {
        self.store.subscribe()
    }

    pub fn set_remind_me_later(&self, remind: bool) {
        self.store.dispatch(UpdateEvent::SetRemindMeLater(remind));
    }

    // Cloned out so no lock is held across an await
    fn current_provider(&self) -> Arc<dyn UpdateProvider> {
        self.provider.read().clone()
    }
}
