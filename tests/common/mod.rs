//! Shared fixtures for end-to-end run tests
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use vk_purge_lib::domain::{DeleteError, RemoteDeleteClient};

/// `(method, params)` of one remote call
pub type Call = (&'static str, Vec<String>);

/// Records calls, answers from a per-item script and tracks peak concurrency.
#[derive(Default)]
pub struct RecordingClient {
    script: HashMap<String, Result<(), DeleteError>>,
    latency: Duration,
    calls: Mutex<Vec<Call>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl RecordingClient {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    pub fn fail(mut self, item_id: &str, error: DeleteError) -> Self {
        self.script.insert(item_id.to_string(), Err(error));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    async fn record(&self, method: &'static str, params: &[&str], item_id: &str) -> Result<(), DeleteError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        self.calls
            .lock()
            .unwrap()
            .push((method, params.iter().map(ToString::to_string).collect()));

        tokio::time::sleep(self.latency).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.script.get(item_id).cloned().unwrap_or(Ok(()))
    }
}

#[async_trait]
impl RemoteDeleteClient for RecordingClient {
    async fn delete_comment(&self, owner_id: &str, item_id: &str) -> Result<(), DeleteError> {
        self.record("comment", &[owner_id, item_id], item_id).await
    }

    async fn delete_reaction(&self, kind: &str, owner_id: &str, item_id: &str) -> Result<(), DeleteError> {
        self.record("like", &[kind, owner_id, item_id], item_id).await
    }
}

/// Writes one export page with a `div.item` row per href.
pub fn write_page(dir: &Path, file_name: &str, hrefs: &[&str]) {
    let rows: String = hrefs
        .iter()
        .map(|href| {
            format!(
                r#"<div class="item"><div class="item__main"><a href="{href}">{href}</a></div><div class="item__tertiary">1 Jan 2020</div></div>"#
            )
        })
        .collect();
    let html = format!(
        r#"<!DOCTYPE html><html><head><meta charset="windows-1251"></head><body><div class="wrap_page_content">{rows}</div></body></html>"#
    );
    std::fs::write(dir.join(file_name), html).unwrap();
}
