//! In-memory loader for unit tests.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::sipsa::DataLoader;
use crate::error::{Error, Result};
use crate::models::RawDocument;

pub struct FakeLoader {
    document: Mutex<Value>,
    fetches: AtomicUsize,
    failing: AtomicBool,
    /// Delay applied to each successive fetch, front first.
    delays: Mutex<VecDeque<Duration>>,
}

impl FakeLoader {
    pub fn new(document: Value) -> Self {
        Self {
            document: Mutex::new(document),
            fetches: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
            delays: Mutex::new(VecDeque::new()),
        }
    }

    pub fn failing() -> Self {
        let loader = Self::new(Value::Null);
        loader.set_failing(true);
        loader
    }

    pub fn with_delays(self, delays: impl IntoIterator<Item = Duration>) -> Self {
        self.delays.lock().unwrap().extend(delays);
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_document(&self, document: Value) {
        *self.document.lock().unwrap() = document;
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DataLoader for FakeLoader {
    async fn fetch_document(&self) -> Result<RawDocument> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let delay = self.delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::Fetch {
                url: "fake://data".to_string(),
                status: 500,
            });
        }
        let document = self.document.lock().unwrap().clone();
        Ok(serde_json::from_value(document)?)
    }
}
