//! GitHub release payloads and the helpers that pick the right build out of them.

use semver::Version;
use serde::Deserialize;

use crate::error::CheckError;
use crate::state::updater::UpdateInfo;

#[cfg(all(target_os = "macos", target_arch = "aarch64"))]
const PLATFORM_SUFFIX: Option<&str> = Some("macos-arm64");
#[cfg(all(target_os = "macos", target_arch = "x86_64"))]
const PLATFORM_SUFFIX: Option<&str> = Some("macos-x86_64");
#[cfg(all(target_os = "linux", target_arch = "x86_64"))]
const PLATFORM_SUFFIX: Option<&str> = Some("linux-x86_64");
#[cfg(all(target_os = "linux", target_arch = "aarch64"))]
const PLATFORM_SUFFIX: Option<&str> = Some("linux-arm64");
#[cfg(all(target_os = "windows", target_arch = "x86_64"))]
const PLATFORM_SUFFIX: Option<&str> = Some("windows-x86_64");
#[cfg(not(any(
    all(target_os = "macos", any(target_arch = "aarch64", target_arch = "x86_64")),
    all(target_os = "linux", any(target_arch = "aarch64", target_arch = "x86_64")),
    all(target_os = "windows", target_arch = "x86_64"),
)))]
const PLATFORM_SUFFIX: Option<&str> = None;

/// Installer formats we know how to stage.
const INSTALLER_EXTENSIONS: &[&str] = &[".zip", ".tar.gz", ".AppImage", ".msi", ".exe", ".dmg"];

/// Asset-name fragment identifying builds for this OS/arch, if we publish any.
pub fn platform_suffix() -> Option<&'static str> {
    PLATFORM_SUFFIX
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubRelease {
    pub tag_name: String,
    pub html_url: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    pub browser_download_url: String,
    #[serde(default)]
    pub size: u64,
}

/// A newer release remembered between `check` and `download_and_install`.
#[derive(Debug, Clone)]
pub struct ReleaseCandidate {
    pub version: String,
    pub asset: Option<ReleaseAsset>,
}

impl GitHubRelease {
    /// Tag without its `v` prefix.
    pub fn version_str(&self) -> &str {
        self.tag_name.strip_prefix('v').unwrap_or(&self.tag_name)
    }

    pub fn version(&self) -> Result<Version, CheckError> {
        if self.version_str().trim().is_empty() {
            return Err(CheckError::Malformed("release has no tag".to_string()));
        }
        parse_version(self.version_str())
    }

    /// Find the installer asset for the given platform suffix.
    pub fn find_asset(&self, suffix: &str) -> Option<&ReleaseAsset> {
        self.assets.iter().find(|a| {
            a.name.contains(suffix) && INSTALLER_EXTENSIONS.iter().any(|ext| a.name.ends_with(ext))
        })
    }

    pub fn to_update_info(&self) -> UpdateInfo {
        let info = UpdateInfo::new(self.version_str()).with_release_url(&self.html_url);
        match self.body.as_deref().map(str::trim).filter(|b| !b.is_empty()) {
            Some(notes) => info.with_notes(notes),
            None => info,
        }
    }
}

pub fn parse_version(version: &str) -> Result<Version, CheckError> {
    Version::parse(version)
        .map_err(|source| CheckError::Version { version: version.to_string(), source })
}
