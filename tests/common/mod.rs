//! Common test utilities: scripted providers and shells, no network involved.
//!
//! Rust compiles each `tests/*.rs` file as a separate binary, so not every
//! helper is used by every test file.

#![allow(dead_code)]

pub mod fixtures;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use futures::stream::{self, StreamExt as _};
use parking_lot::Mutex;
use tokio::sync::watch;
use updraft::{
    CheckError, DownloadError, ProgressEvent, ProgressStream, Shell, ShellOpenError,
    UpdateController, UpdateInfo, UpdateProvider, UpdateState, UpdaterSettings,
};

/// What the scripted `check` answers.
#[derive(Clone)]
pub enum CheckOutcome {
    Found(UpdateInfo),
    Nothing,
    Fail,
}

/// One item of a scripted download.
#[derive(Clone, Copy)]
pub enum Step {
    Emit(ProgressEvent),
    Fail,
}

/// Provider that replays a fixed script and counts how often it was called.
///
/// When observing, it records the controller's state each time the download
/// stream is polled for its next item, i.e. after the previous item was folded.
pub struct ScriptedProvider {
    check: CheckOutcome,
    steps: Vec<Step>,
    check_calls: AtomicUsize,
    download_calls: AtomicUsize,
    observer: Mutex<Option<watch::Receiver<UpdateState>>>,
    observed: Arc<Mutex<Vec<UpdateState>>>,
}

impl ScriptedProvider {
    pub fn new(check: CheckOutcome, steps: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            check,
            steps,
            check_calls: AtomicUsize::new(0),
            download_calls: AtomicUsize::new(0),
            observer: Mutex::new(None),
            observed: Arc::new(Mutex::new(Vec::new())),
        })
    }

    pub fn check_calls(&self) -> usize {
        self.check_calls.load(Ordering::SeqCst)
    }

    pub fn download_calls(&self) -> usize {
        self.download_calls.load(Ordering::SeqCst)
    }

    pub fn observe(&self, rx: watch::Receiver<UpdateState>) {
        *self.observer.lock() = Some(rx);
    }

    pub fn observed(&self) -> Vec<UpdateState> {
        self.observed.lock().clone()
    }
}

#[async_trait]
impl UpdateProvider for ScriptedProvider {
    async fn check(&self) -> Result<Option<UpdateInfo>, CheckError> {
        self.check_calls.fetch_add(1, Ordering::SeqCst);
        match &self.check {
            CheckOutcome::Found(info) => Ok(Some(info.clone())),
            CheckOutcome::Nothing => Ok(None),
            CheckOutcome::Fail => Err(CheckError::Malformed("scripted failure".into())),
        }
    }

    fn download_and_install(&self) -> ProgressStream {
        self.download_calls.fetch_add(1, Ordering::SeqCst);
        let observer = self.observer.lock().clone();
        let observed = self.observed.clone();

        stream::iter(self.steps.clone())
            .then(move |step| {
                if let Some(rx) = &observer {
                    observed.lock().push(rx.borrow().clone());
                }
                futures::future::ready(match step {
                    Step::Emit(event) => Ok(event),
                    Step::Fail => Err(DownloadError::Io(std::io::Error::other("connection reset"))),
                })
            })
            .boxed()
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }
}

/// Shell that records every URL instead of launching a browser.
#[derive(Default)]
pub struct RecordingShell {
    fail: bool,
    opened: Mutex<Vec<String>>,
    navigated: Mutex<Vec<String>>,
}

impl RecordingShell {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A shell whose external opener always fails.
    pub fn failing() -> Arc<Self> {
        Arc::new(Self { fail: true, ..Default::default() })
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().clone()
    }

    pub fn navigated(&self) -> Vec<String> {
        self.navigated.lock().clone()
    }
}

impl Shell for RecordingShell {
    fn open_external(&self, url: &str) -> Result<(), ShellOpenError> {
        if self.fail {
            return Err(ShellOpenError {
                url: url.to_string(),
                source: std::io::Error::other("no default browser"),
            });
        }
        self.opened.lock().push(url.to_string());
        Ok(())
    }

    fn navigate(&self, url: &str) {
        self.navigated.lock().push(url.to_string());
    }
}

/// Settings for an enabled, auto-installing, non-dev host.
pub fn settings() -> UpdaterSettings {
    UpdaterSettings {
        disabled: false,
        manual_only: false,
        dev_mode: false,
        repository: "acme/app".to_string(),
        ..Default::default()
    }
}

pub fn controller(
    settings: UpdaterSettings,
    provider: &Arc<ScriptedProvider>,
    shell: &Arc<RecordingShell>,
) -> UpdateController {
    UpdateController::new(settings, provider.clone(), shell.clone())
}
