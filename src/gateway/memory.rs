//! In-memory backend used by tests
//!
//! Stores configuration the way the real backend does (incoming keys are
//! written over the stored document, the stored document is returned) and
//! records every request so tests can assert on traffic.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use super::Gateway;
use crate::config::ConfigDocument;
use crate::error::TransportError;
use crate::status::StatusSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    FetchConfig,
    StoreConfig,
    FetchStatus,
    TriggerSync,
}

type Normalizer = Box<dyn Fn(&mut ConfigDocument) + Send>;

#[derive(Default)]
struct MemoryState {
    config: ConfigDocument,
    status: Option<StatusSnapshot>,
    sync_message: String,
    failing: Vec<Operation>,
    normalizer: Option<Normalizer>,
    stored: Vec<ConfigDocument>,
    status_calls: u64,
    sync_calls: u64,
}

#[derive(Default)]
pub struct MemoryGateway {
    state: Mutex<MemoryState>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn with_config(self, config: ConfigDocument) -> Self {
        self.lock().config = config;
        self
    }

    pub fn with_status(self, status: StatusSnapshot) -> Self {
        self.lock().status = Some(status);
        self
    }

    pub fn with_sync_message(self, message: &str) -> Self {
        self.lock().sync_message = message.to_string();
        self
    }

    /// Rewrite documents on store, like server-side validation would
    pub fn with_normalizer(self, normalizer: impl Fn(&mut ConfigDocument) + Send + 'static) -> Self {
        self.lock().normalizer = Some(Box::new(normalizer));
        self
    }

    pub fn set_failing(&self, operation: Operation, failing: bool) {
        let mut state = self.lock();
        state.failing.retain(|op| *op != operation);
        if failing {
            state.failing.push(operation);
        }
    }

    pub fn set_config(&self, config: ConfigDocument) {
        self.lock().config = config;
    }

    pub fn set_status(&self, status: StatusSnapshot) {
        self.lock().status = Some(status);
    }

    pub fn config(&self) -> ConfigDocument {
        self.lock().config.clone()
    }

    /// Request bodies of every `store_config` call, in order
    pub fn stored_documents(&self) -> Vec<ConfigDocument> {
        self.lock().stored.clone()
    }

    pub fn status_calls(&self) -> u64 {
        self.lock().status_calls
    }

    pub fn sync_calls(&self) -> u64 {
        self.lock().sync_calls
    }

    fn check(state: &MemoryState, operation: Operation) -> Result<(), TransportError> {
        if state.failing.contains(&operation) {
            Err(TransportError::Status { code: 500 })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Gateway for MemoryGateway {
    async fn fetch_config(&self) -> Result<ConfigDocument, TransportError> {
        let state = self.lock();
        Self::check(&state, Operation::FetchConfig)?;
        Ok(state.config.clone())
    }

    async fn store_config(&self, document: &ConfigDocument) -> Result<ConfigDocument, TransportError> {
        let mut state = self.lock();
        Self::check(&state, Operation::StoreConfig)?;
        state.stored.push(document.clone());

        let mut stored = state.config.merged(document);
        if let Some(normalize) = &state.normalizer {
            normalize(&mut stored);
        }
        state.config = stored.clone();
        Ok(stored)
    }

    async fn fetch_status(&self) -> Result<StatusSnapshot, TransportError> {
        let mut state = self.lock();
        state.status_calls += 1;
        Self::check(&state, Operation::FetchStatus)?;
        state
            .status
            .clone()
            .ok_or_else(|| TransportError::Decode("no status recorded".into()))
    }

    async fn trigger_sync(&self) -> Result<String, TransportError> {
        let mut state = self.lock();
        state.sync_calls += 1;
        Self::check(&state, Operation::TriggerSync)?;
        Ok(state.sync_message.clone())
    }
}
