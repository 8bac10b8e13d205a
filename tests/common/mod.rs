//! Shared helpers for integration tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use search_conductor::{RequestInit, Result, Transport};

/// Transport that records every exchange and answers with a canned payload.
pub struct RecordingTransport {
    pub urls: Mutex<Vec<Url>>,
    pub requests: Mutex<Vec<RequestInit>>,
    payload: serde_json::Value,
    pause: Option<Duration>,
}

impl RecordingTransport {
    pub fn new(payload: serde_json::Value) -> Arc<Self> {
        Arc::new(Self {
            urls: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
            payload,
            pause: None,
        })
    }

    #[allow(dead_code)]
    pub fn with_pause(payload: serde_json::Value, pause: Duration) -> Arc<Self> {
        Arc::new(Self {
            urls: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
            payload,
            pause: Some(pause),
        })
    }

    pub fn call_count(&self) -> usize {
        self.urls.lock().unwrap().len()
    }

    #[allow(dead_code)]
    pub fn last_url(&self) -> Option<Url> {
        self.urls.lock().unwrap().last().cloned()
    }

    #[allow(dead_code)]
    pub fn last_request(&self) -> Option<RequestInit> {
        self.requests.lock().unwrap().last().cloned()
    }

    /// Value of `name` in the recorded URL at `index`.
    #[allow(dead_code)]
    pub fn query_param(&self, index: usize, name: &str) -> Option<String> {
        self.urls.lock().unwrap().get(index).and_then(|url| {
            url.query_pairs()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.to_string())
        })
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn execute(&self, url: &Url, request: &RequestInit) -> Result<serde_json::Value> {
        self.urls.lock().unwrap().push(url.clone());
        self.requests.lock().unwrap().push(request.clone());
        if let Some(pause) = self.pause {
            tokio::time::sleep(pause).await;
        }
        Ok(self.payload.clone())
    }
}

/// Shared success/error counters for callback assertions.
#[derive(Default)]
pub struct Counters {
    pub successes: AtomicUsize,
    pub errors: AtomicUsize,
}

impl Counters {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    #[allow(dead_code)]
    pub fn successes(&self) -> usize {
        self.successes.load(Ordering::SeqCst)
    }

    #[allow(dead_code)]
    pub fn errors(&self) -> usize {
        self.errors.load(Ordering::SeqCst)
    }
}

/// Let spawned dispatch tasks run to completion.
pub async fn settle() {
    for _ in 0..25 {
        tokio::task::yield_now().await;
    }
}
