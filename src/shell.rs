//! Handing URLs to the desktop.

use crate::error::ShellOpenError;

/// Host shell operations the updater needs.
pub trait Shell: Send + Sync {
    /// Open `url` in the user's default browser.
    fn open_external(&self, url: &str) -> Result<(), ShellOpenError>;

    /// Show `url` from inside the app when the desktop refuses to open it.
    fn navigate(&self, url: &str);
}

/// Uses the OS opener (`xdg-open`, `open`, `start`).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemShell;

impl Shell for SystemShell {
    fn open_external(&self, url: &str) -> Result<(), ShellOpenError> {
        open::that(url).map_err(|source| ShellOpenError { url: url.to_string(), source })
    }

    fn navigate(&self, url: &str) {
        // No embedded browser in a terminal host; the user follows the link themselves
        println!("Open {url} in your browser to get the latest version.");
    }
}
