use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, BoxStream, StreamExt as _};
use parking_lot::Mutex;
use semver::Version;
use tempfile::NamedTempFile;

use super::release::{self, GitHubRelease, ReleaseAsset, ReleaseCandidate};
use super::{ProgressEvent, ProgressStream, UpdateProvider, failed_download};
use crate::error::{CheckError, DownloadError, Error, Result};
use crate::state::settings::UpdaterSettings;
use crate::state::updater::UpdateInfo;

/// Platform provider backed by GitHub Releases.
///
/// `check` remembers the matching installer asset; `download_and_install`
/// streams it into the staging directory and persists it there once complete.
pub struct GitHubProvider {
    client: reqwest::Client,
    api_url: String,
    // Whole-request limit for checks; downloads only get the read timeout
    check_timeout: Duration,
    current_version: Version,
    asset_suffix: &'static str,
    staging_dir: PathBuf,
    pending: Mutex<Option<ReleaseCandidate>>,
}

impl GitHubProvider {
    pub fn new(
        settings: &UpdaterSettings,
        current_version: &str,
        asset_suffix: &'static str,
        staging_dir: PathBuf,
    ) -> Result<Self> {
        let current_version = Version::parse(current_version)?;
        let client = reqwest::Client::builder()
            .user_agent(format!("updraft/{current_version}"))
            .connect_timeout(settings.request_timeout())
            .read_timeout(settings.request_timeout())
            .build()?;

        Ok(Self {
            client,
            api_url: settings.releases_api_url(),
            check_timeout: settings.request_timeout(),
            current_version,
            asset_suffix,
            staging_dir,
            pending: Mutex::new(None),
        })
    }

    /// Build the provider only if this host can run it.
    pub async fn probe(
        settings: &UpdaterSettings,
        current_version: &str,
        staging_dir: PathBuf,
    ) -> Result<Self> {
        let suffix = release::platform_suffix().ok_or_else(|| {
            Error::UnsupportedPlatform(format!(
                "{}-{}",
                std::env::consts::OS,
                std::env::consts::ARCH
            ))
        })?;
        let provider = Self::new(settings, current_version, suffix, staging_dir)?;
        tokio::fs::create_dir_all(&provider.staging_dir).await?;
        Ok(provider)
    }

    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    fn remember(&self, candidate: Option<ReleaseCandidate>) {
        *self.pending.lock() = candidate;
    }
}

#[async_trait]
impl UpdateProvider for GitHubProvider {
    async fn check(&self) -> std::result::Result<Option<UpdateInfo>, CheckError> {
        log::info!("Update check: version={}, arch={}", self.current_version, self.asset_suffix);

        let resp = self.client.get(&self.api_url).timeout(self.check_timeout).send().await?;
        if !resp.status().is_success() {
            return Err(CheckError::Status(resp.status()));
        }
        let release: GitHubRelease = resp.json().await?;

        let remote = release.version()?;
        if remote <= self.current_version {
            self.remember(None);
            return Ok(None);
        }

        let asset = release.find_asset(self.asset_suffix).cloned();
        if asset.is_none() {
            log::warn!("Release v{remote} has no {} asset", self.asset_suffix);
        }
        self.remember(Some(ReleaseCandidate { version: remote.to_string(), asset }));

        log::info!("Update found: v{remote}");
        Ok(Some(release.to_update_info()))
    }

    fn download_and_install(&self) -> ProgressStream {
        let Some(candidate) = self.pending.lock().clone() else {
            return failed_download(DownloadError::NothingPending);
        };
        let Some(asset) = candidate.asset else {
            return failed_download(DownloadError::NoAsset(candidate.version));
        };

        let stage = DownloadStage::Connect {
            client: self.client.clone(),
            asset,
            staging_dir: self.staging_dir.clone(),
        };
        stream::unfold(stage, DownloadStage::advance).boxed()
    }

    fn provider_name(&self) -> &'static str {
        "github"
    }
}

type Item = std::result::Result<ProgressEvent, DownloadError>;

/// Where an in-flight download is. Nothing happens until the stream is polled.
enum DownloadStage {
    Connect {
        client: reqwest::Client,
        asset: ReleaseAsset,
        staging_dir: PathBuf,
    },
    Transfer {
        body: BoxStream<'static, reqwest::Result<Bytes>>,
        file: NamedTempFile,
        dest: PathBuf,
    },
    Done,
}

impl DownloadStage {
    async fn advance(self) -> Option<(Item, Self)> {
        match self {
            Self::Connect { client, asset, staging_dir } => {
                match Self::connect(client, asset, staging_dir).await {
                    Ok((content_length, next)) => {
                        log::info!("Started downloading {content_length} bytes");
                        Some((Ok(ProgressEvent::Started { content_length }), next))
                    }
                    Err(e) => Some((Err(e), Self::Done)),
                }
            }
            Self::Transfer { mut body, mut file, dest } => match body.next().await {
                Some(Ok(chunk)) => match file.write_all(&chunk) {
                    Ok(()) => {
                        let event = ProgressEvent::Progress { chunk_length: chunk.len() as u64 };
                        Some((Ok(event), Self::Transfer { body, file, dest }))
                    }
                    Err(e) => Some((Err(e.into()), Self::Done)),
                },
                Some(Err(e)) => Some((Err(e.into()), Self::Done)),
                None => match install(file, &dest) {
                    Ok(()) => Some((Ok(ProgressEvent::Finished), Self::Done)),
                    Err(e) => Some((Err(e), Self::Done)),
                },
            },
            Self::Done => None,
        }
    }

    async fn connect(
        client: reqwest::Client,
        asset: ReleaseAsset,
        staging_dir: PathBuf,
    ) -> std::result::Result<(u64, Self), DownloadError> {
        let resp = client.get(&asset.browser_download_url).send().await?.error_for_status()?;
        let content_length = resp.content_length().unwrap_or(asset.size);

        tokio::fs::create_dir_all(&staging_dir).await?;
        let file = NamedTempFile::new_in(&staging_dir)?;
        let dest = staging_dir.join(&asset.name);

        Ok((content_length, Self::Transfer { body: resp.bytes_stream().boxed(), file, dest }))
    }
}

/// Move the finished download into place; the host applies it on next launch.
fn install(file: NamedTempFile, dest: &Path) -> std::result::Result<(), DownloadError> {
    file.as_file().sync_all()?;
    file.persist(dest).map_err(|e| e.error)?;
    log::info!("Update staged at {}", dest.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use futures::StreamExt as _;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const ASSET: &str = "App-2.0.0-linux-x86_64.tar.gz";

    fn provider(dir: &Path) -> GitHubProvider {
        GitHubProvider::new(&UpdaterSettings::default(), "1.0.0", "linux-x86_64", dir.into())
            .unwrap()
    }

    /// Provider whose releases API points at `server`.
    fn local_provider(server: &MockServer, dir: &Path) -> GitHubProvider {
        let mut provider = provider(dir);
        provider.api_url = format!("{}/repos/acme/app/releases/latest", server.uri());
        provider
    }

    async fn serve_release(server: &MockServer, tag: &str, installer: &[u8]) {
        let release = json!({
            "tag_name": tag,
            "html_url": "https://github.com/acme/app/releases/tag/v2.0.0",
            "body": "Faster startup",
            "assets": [
                {
                    "name": "App-2.0.0-macos-arm64.zip",
                    "browser_download_url": format!("{}/download/App-2.0.0-macos-arm64.zip", server.uri()),
                    "size": 1
                },
                {
                    "name": ASSET,
                    "browser_download_url": format!("{}/download/{ASSET}", server.uri()),
                    "size": installer.len()
                }
            ]
        });
        Mock::given(method("GET"))
            .and(path("/repos/acme/app/releases/latest"))
            .respond_with(ResponseTemplate::new(200).set_body_json(release))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/download/{ASSET}")))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(installer.to_vec()))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn newer_release_downloads_and_stages_installer() {
        let server = MockServer::start().await;
        let installer: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        serve_release(&server, "v2.0.0", &installer).await;
        let dir = tempfile::TempDir::new().unwrap();
        let provider = local_provider(&server, dir.path());

        let update = provider.check().await.unwrap().expect("newer release");
        assert_eq!(update.version, "2.0.0");
        assert_eq!(update.notes.as_deref(), Some("Faster startup"));
        let pending = provider.pending.lock().clone().unwrap();
        assert_eq!(pending.asset.map(|a| a.name), Some(ASSET.to_string()));

        let events: Vec<ProgressEvent> = provider
            .download_and_install()
            .map(|event| event.unwrap())
            .collect()
            .await;

        let (first, rest) = events.split_first().unwrap();
        let (last, chunks) = rest.split_last().unwrap();
        assert_eq!(*first, ProgressEvent::Started { content_length: installer.len() as u64 });
        assert_eq!(*last, ProgressEvent::Finished);
        let received: u64 = chunks
            .iter()
            .map(|event| match event {
                ProgressEvent::Progress { chunk_length } => *chunk_length,
                other => panic!("unexpected event mid-transfer: {other:?}"),
            })
            .sum();
        assert_eq!(received, installer.len() as u64);

        assert_eq!(std::fs::read(dir.path().join(ASSET)).unwrap(), installer);
    }

    #[tokio::test]
    async fn same_version_is_no_update_and_forgets_candidate() {
        let server = MockServer::start().await;
        serve_release(&server, "v1.0.0", b"installer").await;
        let dir = tempfile::TempDir::new().unwrap();
        let provider = local_provider(&server, dir.path());
        provider.remember(Some(ReleaseCandidate { version: "0.9.0".into(), asset: None }));

        assert_eq!(provider.check().await.unwrap(), None);

        let mut events = provider.download_and_install();
        assert!(matches!(events.next().await, Some(Err(DownloadError::NothingPending))));
        assert!(!dir.path().join(ASSET).exists());
    }

    #[tokio::test]
    async fn older_release_is_no_update() {
        let server = MockServer::start().await;
        serve_release(&server, "v0.9.5", b"installer").await;
        let dir = tempfile::TempDir::new().unwrap();

        assert_eq!(local_provider(&server, dir.path()).check().await.unwrap(), None);
    }

    #[tokio::test]
    async fn error_status_fails_the_check() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        let dir = tempfile::TempDir::new().unwrap();

        let result = local_provider(&server, dir.path()).check().await;
        assert!(matches!(result, Err(CheckError::Status(status)) if status.as_u16() == 404));
    }

    #[tokio::test]
    async fn download_before_check_reports_nothing_pending() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut events = provider(dir.path()).download_and_install();
        assert!(matches!(events.next().await, Some(Err(DownloadError::NothingPending))));
        assert!(events.next().await.is_none());
    }

    #[tokio::test]
    async fn release_without_platform_asset_cannot_download() {
        let dir = tempfile::TempDir::new().unwrap();
        let provider = provider(dir.path());
        provider.remember(Some(ReleaseCandidate { version: "2.0.0".into(), asset: None }));

        let mut events = provider.download_and_install();
        match events.next().await {
            Some(Err(DownloadError::NoAsset(version))) => assert_eq!(version, "2.0.0"),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn rejects_unparseable_current_version() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = GitHubProvider::new(
            &UpdaterSettings::default(),
            "dev",
            "linux-x86_64",
            dir.path().into(),
        );
        assert!(matches!(result, Err(Error::Version(_))));
    }

    #[test]
    fn install_persists_into_staging_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut file = NamedTempFile::new_in(dir.path()).unwrap();
        file.write_all(b"installer").unwrap();
        let dest = dir.path().join("App-linux-x86_64.tar.gz");

        install(file, &dest).unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"installer");
    }
}
