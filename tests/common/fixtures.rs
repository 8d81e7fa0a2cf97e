//! Test fixtures for integration tests.

#![allow(dead_code)]

use updraft::{ProgressEvent, UpdateInfo};

use super::Step;

pub fn release(version: &str) -> UpdateInfo {
    UpdateInfo::new(version)
        .with_notes(format!("What's new in {version}"))
        .with_release_url(format!("https://github.com/acme/app/releases/tag/v{version}"))
}

/// `Started`, then `chunks`, then `Finished`.
pub fn download(content_length: u64, chunks: &[u64]) -> Vec<Step> {
    let mut steps = vec![Step::Emit(ProgressEvent::Started { content_length })];
    steps.extend(
        chunks.iter().map(|&chunk_length| Step::Emit(ProgressEvent::Progress { chunk_length })),
    );
    steps.push(Step::Emit(ProgressEvent::Finished));
    steps
}

/// `Started`, then `chunks`, then a transfer error.
pub fn broken_download(content_length: u64, chunks: &[u64]) -> Vec<Step> {
    let mut steps = download(content_length, chunks);
    steps.pop();
    steps.push(Step::Fail);
    steps
}

/// Splits `total` into `parts` chunks whose sum is exactly `total`.
pub fn even_chunks(total: u64, parts: u64) -> Vec<u64> {
    let base = total / parts;
    let mut chunks = vec![base; parts as usize];
    if let Some(last) = chunks.last_mut() {
        *last += total - base * parts;
    }
    chunks
}
