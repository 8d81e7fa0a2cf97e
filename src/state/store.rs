//! Single owner of the update state; readers subscribe to snapshots.

use tokio::sync::watch;

use super::events::UpdateEvent;
use super::updater::UpdateState;

pub struct UpdateStore {
    tx: watch::Sender<UpdateState>,
}

impl UpdateStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(UpdateState::default());
        Self { tx }
    }

    /// Fold one event into the current snapshot and notify subscribers.
    pub fn dispatch(&self, event: UpdateEvent) {
        self.tx.send_modify(|state| *state = std::mem::take(state).apply(&event));
    }

    pub fn snapshot(&self) -> UpdateState {
        self.tx.borrow().clone()
    }

    /// Read-only handle for the presentation layer.
    pub fn subscribe(&self) -> watch::Receiver<UpdateState> {
        self.tx.subscribe()
    }
}

impl Default for UpdateStore {
    fn default() -> Self {
        Self::new()
    }
}
