// Update state management

pub mod commands;
pub mod config;
pub mod events;
pub mod settings;
pub mod store;
pub mod updater;

pub use commands::UpdateController;
pub use config::ConfigManager;
pub use events::UpdateEvent;
pub use settings::UpdaterSettings;
pub use store::UpdateStore;
pub use updater::{UpdateInfo, UpdatePhase, UpdateState};
