//! Test utilities for vk-purge
//!
//! A scripted in-memory remote client so dispatch and run tests never touch
//! the network.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::domain::{DeleteError, RemoteDeleteClient};

/// One call seen by [`ScriptedClient`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    Comment { owner_id: String, item_id: String },
    Reaction { kind: String, owner_id: String, item_id: String },
}

impl RecordedCall {
    pub fn item_id(&self) -> &str {
        match self {
            Self::Comment { item_id, .. } | Self::Reaction { item_id, .. } => item_id,
        }
    }
}

/// Answers every call with `Ok(())` unless a response is scripted for its item id.
#[derive(Default)]
pub struct ScriptedClient {
    responses: Mutex<HashMap<String, Result<(), DeleteError>>>,
    delays: Mutex<HashMap<String, Duration>>,
    panic_on: Mutex<Option<String>>,
    default_delay: Duration,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    calls: Mutex<Vec<(Instant, RecordedCall)>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call takes at least `delay`
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            default_delay: delay,
            ..Self::default()
        }
    }

    pub fn respond(self, item_id: &str, response: Result<(), DeleteError>) -> Self {
        self.responses.lock().unwrap().insert(item_id.to_string(), response);
        self
    }

    pub fn delay_item(self, item_id: &str, delay: Duration) -> Self {
        self.delays.lock().unwrap().insert(item_id.to_string(), delay);
        self
    }

    pub fn panic_on(self, item_id: &str) -> Self {
        *self.panic_on.lock().unwrap() = Some(item_id.to_string());
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().iter().map(|(_, call)| call.clone()).collect()
    }

    /// When the call for `item_id` started
    pub fn started_at(&self, item_id: &str) -> Option<Instant> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .find(|(_, call)| call.item_id() == item_id)
            .map(|(at, _)| *at)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    async fn answer(&self, call: RecordedCall) -> Result<(), DeleteError> {
        let item_id = call.item_id().to_string();
        self.calls.lock().unwrap().push((Instant::now(), call));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = self
            .delays
            .lock()
            .unwrap()
            .get(&item_id)
            .copied()
            .unwrap_or(self.default_delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let should_panic = self.panic_on.lock().unwrap().as_deref() == Some(item_id.as_str());
        if should_panic {
            panic!("scripted panic for item {item_id}");
        }

        self.responses
            .lock()
            .unwrap()
            .get(&item_id)
            .cloned()
            .unwrap_or(Ok(()))
    }
}

#[async_trait]
impl RemoteDeleteClient for ScriptedClient {
    async fn delete_comment(&self, owner_id: &str, item_id: &str) -> Result<(), DeleteError> {
        self.answer(RecordedCall::Comment {
            owner_id: owner_id.to_string(),
            item_id: item_id.to_string(),
        })
        .await
    }

    async fn delete_reaction(
        &self,
        kind: &str,
        owner_id: &str,
        item_id: &str,
    ) -> Result<(), DeleteError> {
        self.answer(RecordedCall::Reaction {
            kind: kind.to_string(),
            owner_id: owner_id.to_string(),
            item_id: item_id.to_string(),
        })
        .await
    }
}
