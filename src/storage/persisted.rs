use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::Level;

use super::StorageProvider;
use crate::utils::logging::{LogEntry, LogRingBuffer};

/// Where storage failures of a [`Persisted`] value are reported
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, key: &str, message: &str);
}

/// Reports through `tracing` at warn level
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, key: &str, message: &str) {
        tracing::warn!(target: "storage", "{}: {}", key, message);
    }
}

/// Drops every report
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentSink;

impl DiagnosticSink for SilentSink {
    fn report(&self, _key: &str, _message: &str) {}
}

impl DiagnosticSink for LogRingBuffer {
    fn report(&self, key: &str, message: &str) {
        self.push(LogEntry::new(
            Level::WARN,
            "storage",
            format!("{}: {}", key, message),
        ));
    }
}

/// What happens when stored data cannot be read, decoded or written: the
/// value falls back to its default (reads) or keeps the in-memory value
/// (writes), and the failure goes to the sink.
#[derive(Clone)]
pub struct FallbackPolicy {
    sink: Arc<dyn DiagnosticSink>,
}

impl FallbackPolicy {
    pub fn new(sink: impl DiagnosticSink + 'static) -> Self {
        Self {
            sink: Arc::new(sink),
        }
    }

    pub fn silent() -> Self {
        Self::new(SilentSink)
    }

    fn report(&self, key: &str, message: &str) {
        self.sink.report(key, message);
    }
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self::new(TracingSink)
    }
}

impl fmt::Debug for FallbackPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FallbackPolicy").finish_non_exhaustive()
    }
}

/// A value mirrored to key-scoped storage as JSON.
///
/// The stored value is read once, at construction. Every write updates
/// memory first and then storage; a failed storage write is reported but
/// the in-memory value stays, so the two can diverge until the next
/// successful write.
pub struct Persisted<T> {
    storage: Arc<dyn StorageProvider>,
    key: String,
    default: T,
    value: T,
    policy: FallbackPolicy,
}

impl<T: fmt::Debug> fmt::Debug for Persisted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Persisted")
            .field("key", &self.key)
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}

impl<T> Persisted<T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    pub fn new(
        storage: impl StorageProvider + 'static,
        key: impl Into<String>,
        default: T,
    ) -> Self {
        Self::with_policy(storage, key, default, FallbackPolicy::default())
    }

    pub fn with_policy(
        storage: impl StorageProvider + 'static,
        key: impl Into<String>,
        default: T,
        policy: FallbackPolicy,
    ) -> Self {
        let storage: Arc<dyn StorageProvider> = Arc::new(storage);
        let key = key.into();
        let value = Self::load(storage.as_ref(), &key, &policy).unwrap_or_else(|| default.clone());

        Self {
            storage,
            key,
            default,
            value,
            policy,
        }
    }

    fn load(storage: &dyn StorageProvider, key: &str, policy: &FallbackPolicy) -> Option<T> {
        let text = match storage.get_item(key) {
            Ok(Some(text)) => text,
            Ok(None) => return None,
            Err(e) => {
                policy.report(key, &format!("could not read stored value: {:#}", e));
                return None;
            }
        };

        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(e) => {
                policy.report(key, &format!("could not decode stored value: {}", e));
                None
            }
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn set(&mut self, value: T) {
        self.value = value;
        self.persist();
    }

    /// Functional update from the previous value
    pub fn update<F>(&mut self, f: F)
    where
        F: FnOnce(&T) -> T,
    {
        let next = f(&self.value);
        self.set(next);
    }

    /// Back to the default, which is also written to storage
    pub fn reset(&mut self) {
        self.set(self.default.clone());
    }

    /// Delete the stored entry; the in-memory value returns to the default
    pub fn remove(&mut self) {
        self.value = self.default.clone();
        if let Err(e) = self.storage.remove_item(&self.key) {
            self.policy
                .report(&self.key, &format!("could not remove stored value: {:#}", e));
        }
    }

    fn persist(&self) {
        let result = serde_json::to_string(&self.value)
            .map_err(anyhow::Error::from)
            .and_then(|text| self.storage.set_item(&self.key, &text));

        if let Err(e) = result {
            self.policy
                .report(&self.key, &format!("could not store value: {:#}", e));
        }
    }
}
