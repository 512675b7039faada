//! Feature stores: posts, comments and the admin user listing.
//!
//! Each store is a thin wrapper over the [`Gateway`](crate::gateway::Gateway).
//! Operations log failures and return `None` instead of propagating errors;
//! callers must check the result. Every store reports whether a call is in
//! flight through `is_loading()`.

pub mod admin;
pub mod comments;
pub mod posts;

pub use admin::AdminStore;
pub use comments::CommentsStore;
pub use posts::PostsStore;

use crate::error::Result;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::error;

/// In-flight operation counter backing `is_loading()`.
#[derive(Debug, Default)]
pub struct Loading {
    in_flight: AtomicUsize,
}

impl Loading {
    /// Marks an operation as started until the guard is dropped.
    #[must_use]
    pub fn start(&self) -> LoadingGuard<'_> {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        LoadingGuard(self)
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }
}

pub struct LoadingGuard<'a>(&'a Loading);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Logs a failed store operation and collapses it into the `None` sentinel.
fn settle<T>(operation: &'static str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            error!(operation, "{err}");
            None
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::{
        api::ApiClient,
        config::ClientConfig,
        error::{Error, Result},
        gateway::Gateway,
        session::SessionManager,
        storage::{KeyValueStore, MemoryStore},
    };
    use secrecy::SecretString;
    use std::{
        collections::HashMap,
        net::TcpListener,
        sync::{Arc, Mutex},
    };
    use wiremock::MockServer;

    pub fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    /// In-memory store that counts removals per key and can refuse writes to
    /// one key.
    #[derive(Debug, Default)]
    pub struct RecordingStore {
        inner: MemoryStore,
        removals: Mutex<HashMap<String, usize>>,
        fail_writes_to: Option<&'static str>,
    }

    impl RecordingStore {
        pub fn failing_writes_to(key: &'static str) -> Self {
            Self {
                fail_writes_to: Some(key),
                ..Self::default()
            }
        }

        pub fn removals(&self, key: &str) -> usize {
            self.removals
                .lock()
                .map(|removals| removals.get(key).copied().unwrap_or_default())
                .unwrap_or_default()
        }
    }

    impl KeyValueStore for RecordingStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            if self.fail_writes_to == Some(key) {
                return Err(Error::Storage(format!("write to {key} refused")));
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<()> {
            if let Ok(mut removals) = self.removals.lock() {
                *removals.entry(key.to_string()).or_default() += 1;
            }
            self.inner.remove(key)
        }
    }

    /// Gateway against the mock server, logged in with `access`/`refresh`.
    pub async fn gateway_for(server: &MockServer) -> anyhow::Result<Gateway> {
        let config = ClientConfig::new(&format!("{}/api/v1", server.uri()), "unused.json", 5)?;
        let session = Arc::new(SessionManager::new(
            ApiClient::new(config)?,
            Arc::new(MemoryStore::new()),
        ));
        session
            .set_tokens(
                SecretString::from("access".to_string()),
                SecretString::from("refresh".to_string()),
            )
            .await?;

        Ok(Gateway::new(session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settle_maps_errors_to_none() {
        assert_eq!(settle("ok", Ok(3)), Some(3));
        assert_eq!(
            settle::<i32>("fails", Err(crate::Error::NotAuthenticated)),
            None
        );
    }

    #[test]
    fn loading_tracks_nested_guards() {
        let loading = Loading::default();
        assert!(!loading.is_loading());

        let outer = loading.start();
        let inner = loading.start();
        assert!(loading.is_loading());

        drop(inner);
        assert!(loading.is_loading());

        drop(outer);
        assert!(!loading.is_loading());
    }
}
