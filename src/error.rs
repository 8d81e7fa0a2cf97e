use thiserror::Error;

/// Failure while asking the provider whether a newer release exists.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Release server returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("Invalid version '{version}': {source}")]
    Version {
        version: String,
        #[source]
        source: semver::Error,
    },

    #[error("Malformed release data: {0}")]
    Malformed(String),
}

/// Failure while transferring or installing an update.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Updates are not supported by this provider")]
    Unsupported,

    #[error("No update is pending; check for updates first")]
    NothingPending,

    #[error("Release {0} has no installer for this platform")]
    NoAsset(String),

    #[error("Download ended before it finished")]
    Incomplete,
}

/// Failure handing a URL to the desktop shell.
#[derive(Debug, Error)]
#[error("Failed to open {url}: {source}")]
pub struct ShellOpenError {
    pub url: String,
    #[source]
    pub source: std::io::Error,
}

/// Errors raised while building the updater itself.
#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid version '{0}'")]
    Version(#[from] semver::Error),

    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),
}

/// Convenience Result type using our Error
pub type Result<T> = std::result::Result<T, Error>;
