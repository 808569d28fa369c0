//! Typed view bindings over the cache store.

use std::marker::PhantomData;
use std::sync::Arc;

use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::broadcast::Receiver;
use tracing::debug;

use crate::domain::errors::ClientError;

use super::query_cache::{CacheEvent, CacheEventKind, FetchOptions, Fetcher, QueryCache};
use super::query_key::QueryKey;

/// What a view renders from: data, error and loading flags for one key.
#[derive(Debug)]
pub struct QueryState<T> {
    pub data: Option<Arc<T>>,
    pub error: Option<ClientError>,
    /// No data yet and a fetch is running.
    pub is_loading: bool,
    /// A fetch is running, with or without data.
    pub is_fetching: bool,
    pub is_stale: bool,
}

impl<T> QueryState<T> {
    fn idle() -> Self {
        Self {
            data: None,
            error: None,
            is_loading: false,
            is_fetching: false,
            is_stale: true,
        }
    }

    pub const fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

impl<T> Clone for QueryState<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            error: self.error.clone(),
            is_loading: self.is_loading,
            is_fetching: self.is_fetching,
            is_stale: self.is_stale,
        }
    }
}

/// A view's subscription to one cache key.
///
/// Holds the key, the fetcher for it and a change-notification receiver.
/// A disabled binding never fetches; it only reads what the store has.
pub struct Query<T> {
    cache: QueryCache,
    key: QueryKey,
    fetcher: Fetcher,
    enabled: bool,
    events: Receiver<CacheEvent>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> Query<T> {
    pub fn new(cache: QueryCache, key: QueryKey, fetcher: Fetcher) -> Self {
        let events = cache.subscribe();
        Self {
            cache,
            key,
            fetcher,
            enabled: true,
            events,
            _marker: PhantomData,
        }
    }

    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub const fn key(&self) -> &QueryKey {
        &self.key
    }

    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Request the resource through the store and return the resulting state.
    ///
    /// Errors are reported through [`QueryState::error`].
    pub async fn load(&mut self) -> QueryState<T> {
        if self.enabled {
            if let Err(err) = self
                .cache
                .get_or_fetch(&self.key, &self.fetcher, FetchOptions::default())
                .await
            {
                debug!(key = %self.key, error = %err, "load failed");
            }
        }
        self.state().await
    }

    /// Fetch regardless of freshness.
    pub async fn refetch(&mut self) -> QueryState<T> {
        if self.enabled {
            if let Err(err) = self.cache.refetch(&self.key, &self.fetcher).await {
                debug!(key = %self.key, error = %err, "refetch failed");
            }
        }
        self.state().await
    }

    /// Current state from the store, without fetching.
    pub async fn state(&self) -> QueryState<T> {
        let Some(snapshot) = self.cache.snapshot(&self.key).await else {
            return QueryState::idle();
        };

        let mut error = snapshot.error;
        let data = match snapshot.data {
            Some(value) => match value.downcast::<T>() {
                Ok(typed) => Some(typed),
                Err(_) => {
                    error = Some(ClientError::TypeMismatch(self.key.to_string()));
                    None
                }
            },
            None => None,
        };

        QueryState {
            is_loading: data.is_none() && snapshot.is_fetching,
            is_fetching: snapshot.is_fetching,
            is_stale: snapshot.is_stale,
            data,
            error,
        }
    }

    /// React to pending change notifications and expired data.
    ///
    /// Re-requests the entry when it is stale with no fetch running and
    /// either the key was invalidated (or notifications were lost) or its
    /// data outlived the store's stale time, which publishes no event.
    /// Stale data stays visible while the fetch runs. Returns whether a
    /// fetch was triggered.
    pub async fn sync(&mut self) -> bool {
        let mut touched = false;
        loop {
            match self.events.try_recv() {
                Ok(event) if event.key == self.key => {
                    if matches!(event.kind, CacheEventKind::Invalidated | CacheEventKind::Updated) {
                        touched = true;
                    }
                }
                Ok(_) => {}
                Err(TryRecvError::Lagged(skipped)) => {
                    debug!(key = %self.key, skipped, "missed cache events, resyncing");
                    touched = true;
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }

        if !self.enabled {
            return false;
        }

        let Some(snapshot) = self.cache.snapshot(&self.key).await else {
            return false;
        };
        // Entries without data only refetch on an event, so a failed first
        // load is not retried on every call.
        let expired = snapshot.data.is_some();
        if !(touched || expired) || !snapshot.is_stale || snapshot.is_fetching {
            return false;
        }

        debug!(key = %self.key, "re-requesting invalidated entry");
        if let Err(err) = self
            .cache
            .get_or_fetch(&self.key, &self.fetcher, FetchOptions::default())
            .await
        {
            debug!(key = %self.key, error = %err, "re-request failed");
        }
        true
    }

    /// Wait for the next change to this key. `None` once the store is gone.
    pub async fn changed(&mut self) -> Option<CacheEventKind> {
        loop {
            match self.events.recv().await {
                Ok(event) if event.key == self.key => return Some(event.kind),
                Ok(_) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Wait until no fetch is running for this key, then return the state.
    pub async fn settle(&mut self) -> QueryState<T> {
        loop {
            let state = self.state().await;
            if !state.is_fetching || self.changed().await.is_none() {
                return state;
            }
        }
    }
}
