//! Process-wide cache of fetched resources.
//!
//! Entries are keyed by [`QueryKey`] and hold type-erased values. The store
//! implements stale-while-revalidate: invalidation marks an entry stale but
//! keeps its data, and the next request serves the old value while a
//! background fetch replaces it.
//!
//! Every fetch is a [`Shared`] future stored on its entry, so concurrent
//! requesters for one key join a single network call. Fetches are driven by
//! a spawned task and always complete, even when every requester has gone.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, trace, warn};

use crate::domain::errors::{ClientError, ClientResult};
use crate::domain::models::CacheConfig;

use super::query_key::{KeyFilter, QueryKey};
use super::retry::RetryPolicy;

/// Type-erased cached value.
pub type CachedValue = Arc<dyn Any + Send + Sync>;

/// Produces a fresh fetch of one resource each time it is called.
pub type Fetcher = Arc<dyn Fn() -> BoxFuture<'static, ClientResult<CachedValue>> + Send + Sync>;

type SharedFetch = Shared<BoxFuture<'static, ClientResult<CachedValue>>>;

/// Capacity of the change-notification channel.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Wrap a typed async function as a [`Fetcher`].
pub fn fetcher<T, F, Fut>(f: F) -> Fetcher
where
    T: Send + Sync + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ClientResult<T>> + Send + 'static,
{
    Arc::new(move || {
        let fut = f();
        async move { fut.await.map(|value| Arc::new(value) as CachedValue) }.boxed()
    })
}

/// Options for [`QueryCache::get_or_fetch`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Fetch even if the entry is fresh.
    pub force_refetch: bool,
}

/// What happened to an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEventKind {
    /// A network fetch started.
    Fetching,
    /// A fetch succeeded and replaced the data.
    Updated,
    /// A fetch failed after retries; data was left untouched.
    Failed(ClientError),
    /// The entry was marked stale.
    Invalidated,
}

/// Change notification published for one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEvent {
    pub key: QueryKey,
    pub kind: CacheEventKind,
}

#[derive(Default)]
struct CacheEntry {
    data: Option<CachedValue>,
    /// Completion time of the last successful fetch.
    fetched_at: Option<Instant>,
    updated_at: Option<DateTime<Utc>>,
    is_invalidated: bool,
    /// An invalidation arrived while a fetch was running; the result of
    /// that fetch may predate it.
    invalidated_while_fetching: bool,
    error: Option<ClientError>,
    in_flight: Option<SharedFetch>,
    fetch_count: u64,
}

/// Point-in-time view of an entry.
#[derive(Debug, Clone)]
pub struct EntrySnapshot {
    pub data: Option<CachedValue>,
    pub error: Option<ClientError>,
    pub is_stale: bool,
    pub is_fetching: bool,
    pub updated_at: Option<DateTime<Utc>>,
    /// Number of successful fetches.
    pub fetch_count: u64,
}

struct CacheInner {
    entries: Mutex<HashMap<QueryKey, CacheEntry>>,
    events: broadcast::Sender<CacheEvent>,
    retry: RetryPolicy,
    stale_time: Option<Duration>,
}

impl CacheInner {
    fn is_fresh(&self, entry: &CacheEntry) -> bool {
        if entry.is_invalidated || entry.data.is_none() {
            return false;
        }
        match (self.stale_time, entry.fetched_at) {
            (Some(stale_time), Some(fetched_at)) => fetched_at.elapsed() < stale_time,
            _ => true,
        }
    }

    fn publish(&self, key: &QueryKey, kind: CacheEventKind) {
        // No receivers is fine; nobody is watching this key.
        let _ = self.events.send(CacheEvent {
            key: key.clone(),
            kind,
        });
    }

    async fn complete(&self, key: &QueryKey, result: &ClientResult<CachedValue>) {
        let kind = {
            let mut entries = self.entries.lock().await;
            let entry = entries.entry(key.clone()).or_default();
            entry.in_flight = None;
            let invalidated_meanwhile = std::mem::take(&mut entry.invalidated_while_fetching);

            match result {
                Ok(value) => {
                    entry.data = Some(Arc::clone(value));
                    entry.fetched_at = Some(Instant::now());
                    entry.updated_at = Some(Utc::now());
                    entry.is_invalidated = invalidated_meanwhile;
                    entry.error = None;
                    entry.fetch_count += 1;
                    debug!(key = %key, fetch_count = entry.fetch_count, "cache entry updated");
                    CacheEventKind::Updated
                }
                Err(err) => {
                    entry.is_invalidated |= invalidated_meanwhile;
                    entry.error = Some(err.clone());
                    warn!(
                        key = %key,
                        error = %err,
                        has_data = entry.data.is_some(),
                        "fetch failed"
                    );
                    CacheEventKind::Failed(err.clone())
                }
            }
        };
        self.publish(key, kind);
    }
}

/// The cache store.
///
/// Cloning is cheap and every clone shares the same table.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<CacheInner>,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(RetryPolicy::default(), None)
    }
}

impl QueryCache {
    /// Create an empty cache.
    ///
    /// `stale_time` of `None` keeps data fresh until it is invalidated or
    /// refetched.
    pub fn new(retry: RetryPolicy, stale_time: Option<Duration>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(CacheInner {
                entries: Mutex::new(HashMap::new()),
                events,
                retry,
                stale_time,
            }),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(
            RetryPolicy::from(config),
            config.stale_time_ms.map(Duration::from_millis),
        )
    }

    /// Subscribe to change notifications for every key.
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.inner.events.subscribe()
    }

    /// Return the cached value for `key`, fetching it if needed.
    ///
    /// - Fresh data is returned as-is unless `force_refetch` is set.
    /// - Stale data is returned immediately and a background fetch is
    ///   started, unless one is already running.
    /// - Without data, or when forced, the caller awaits the in-flight
    ///   fetch for the key, starting one if there is none.
    pub async fn get_or_fetch(
        &self,
        key: &QueryKey,
        fetcher: &Fetcher,
        options: FetchOptions,
    ) -> ClientResult<CachedValue> {
        let pending = {
            let mut entries = self.inner.entries.lock().await;
            let entry = entries.entry(key.clone()).or_default();

            if !options.force_refetch {
                if let Some(data) = entry.data.clone() {
                    if self.inner.is_fresh(entry) {
                        trace!(key = %key, "cache hit");
                        return Ok(data);
                    }
                    trace!(key = %key, "serving stale data, revalidating");
                    self.start_fetch(key, entry, fetcher);
                    return Ok(data);
                }
            }

            self.start_fetch(key, entry, fetcher)
        };

        pending.await
    }

    /// Fetch `key` regardless of freshness, joining any in-flight fetch.
    pub async fn refetch(&self, key: &QueryKey, fetcher: &Fetcher) -> ClientResult<CachedValue> {
        self.get_or_fetch(
            key,
            fetcher,
            FetchOptions {
                force_refetch: true,
            },
        )
        .await
    }

    /// Mark every entry matching `filter` stale.
    ///
    /// Data is kept and nothing is fetched; mounted bindings notice the
    /// [`CacheEventKind::Invalidated`] event and re-request. Returns the
    /// number of entries marked.
    pub async fn invalidate(&self, filter: impl Into<KeyFilter>) -> usize {
        let filter = filter.into();
        let marked: Vec<QueryKey> = {
            let mut entries = self.inner.entries.lock().await;
            entries
                .iter_mut()
                .filter(|(key, _)| filter.matches(key))
                .map(|(key, entry)| {
                    entry.is_invalidated = true;
                    if entry.in_flight.is_some() {
                        entry.invalidated_while_fetching = true;
                    }
                    key.clone()
                })
                .collect()
        };

        for key in &marked {
            self.inner.publish(key, CacheEventKind::Invalidated);
        }
        info!(filter = ?filter, count = marked.len(), "invalidated cache entries");
        marked.len()
    }

    /// Snapshot of one entry, if it exists.
    pub async fn snapshot(&self, key: &QueryKey) -> Option<EntrySnapshot> {
        let entries = self.inner.entries.lock().await;
        entries.get(key).map(|entry| EntrySnapshot {
            data: entry.data.clone(),
            error: entry.error.clone(),
            is_stale: !self.inner.is_fresh(entry),
            is_fetching: entry.in_flight.is_some(),
            updated_at: entry.updated_at,
            fetch_count: entry.fetch_count,
        })
    }

    /// Every key that has ever been requested, sorted.
    pub async fn keys(&self) -> Vec<QueryKey> {
        let entries = self.inner.entries.lock().await;
        let mut keys: Vec<_> = entries.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Return the in-flight fetch for `entry`, starting one if needed.
    ///
    /// Must be called with the table lock held so the check and the insert
    /// are atomic.
    fn start_fetch(&self, key: &QueryKey, entry: &mut CacheEntry, fetcher: &Fetcher) -> SharedFetch {
        if let Some(existing) = &entry.in_flight {
            trace!(key = %key, "joining in-flight fetch");
            return existing.clone();
        }

        let inner = Arc::clone(&self.inner);
        let fetcher = Arc::clone(fetcher);
        let owned_key = key.clone();
        let shared = async move {
            let result = inner.retry.execute(|| fetcher()).await;
            inner.complete(&owned_key, &result).await;
            result
        }
        .boxed()
        .shared();

        entry.in_flight = Some(shared.clone());
        debug!(key = %key, "starting fetch");
        self.inner.publish(key, CacheEventKind::Fetching);
        tokio::spawn(shared.clone());
        shared
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::query_key::keys;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn counting_fetcher(calls: Arc<AtomicU32>) -> Fetcher {
        fetcher(move || {
            let calls = Arc::clone(&calls);
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                tokio::time::sleep(Duration::from_millis(20)).await;
                Ok::<u32, ClientError>(n)
            }
        })
    }

    fn value(v: &CachedValue) -> u32 {
        *Arc::clone(v).downcast::<u32>().unwrap()
    }

    fn no_retry_cache() -> QueryCache {
        QueryCache::new(RetryPolicy::none(), None)
    }

    async fn wait_for(rx: &mut broadcast::Receiver<CacheEvent>, key: &QueryKey, kind: &CacheEventKind) {
        loop {
            let event = rx.recv().await.unwrap();
            if event.key == *key && event.kind == *kind {
                return;
            }
        }
    }

    #[tokio::test]
    async fn test_first_request_fetches_and_caches() {
        let cache = no_retry_cache();
        let calls = Arc::new(AtomicU32::new(0));
        let f = counting_fetcher(Arc::clone(&calls));
        let key = QueryKey::new(keys::AGENTS);

        let first = cache.get_or_fetch(&key, &f, FetchOptions::default()).await.unwrap();
        let second = cache.get_or_fetch(&key, &f, FetchOptions::default()).await.unwrap();

        assert_eq!(value(&first), 1);
        assert_eq!(value(&second), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let snap = cache.snapshot(&key).await.unwrap();
        assert!(!snap.is_stale);
        assert!(!snap.is_fetching);
        assert_eq!(snap.fetch_count, 1);
    }

    #[tokio::test]
    async fn test_concurrent_requests_share_one_fetch() {
        let cache = no_retry_cache();
        let calls = Arc::new(AtomicU32::new(0));
        let f = counting_fetcher(Arc::clone(&calls));
        let key = QueryKey::new(keys::TOOLS);

        let (a, b) = tokio::join!(
            cache.get_or_fetch(&key, &f, FetchOptions::default()),
            cache.get_or_fetch(&key, &f, FetchOptions::default()),
        );

        assert_eq!(value(&a.unwrap()), 1);
        assert_eq!(value(&b.unwrap()), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalidate_keeps_data_and_revalidates_in_background() {
        let cache = no_retry_cache();
        let calls = Arc::new(AtomicU32::new(0));
        let f = counting_fetcher(Arc::clone(&calls));
        let key = QueryKey::new(keys::AGENTS);
        cache.get_or_fetch(&key, &f, FetchOptions::default()).await.unwrap();

        assert_eq!(cache.invalidate(keys::AGENTS).await, 1);
        let snap = cache.snapshot(&key).await.unwrap();
        assert!(snap.is_stale);
        assert_eq!(value(snap.data.as_ref().unwrap()), 1);
        // Invalidation alone never fetches.
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let mut rx = cache.subscribe();
        let served = cache.get_or_fetch(&key, &f, FetchOptions::default()).await.unwrap();
        assert_eq!(value(&served), 1, "stale value is served immediately");

        wait_for(&mut rx, &key, &CacheEventKind::Updated).await;
        let snap = cache.snapshot(&key).await.unwrap();
        assert_eq!(value(snap.data.as_ref().unwrap()), 2);
        assert!(!snap.is_stale);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_refetch_forces_fetch() {
        let cache = no_retry_cache();
        let calls = Arc::new(AtomicU32::new(0));
        let f = counting_fetcher(Arc::clone(&calls));
        let key = QueryKey::new(keys::DISCOVERY_STATUS);

        cache.get_or_fetch(&key, &f, FetchOptions::default()).await.unwrap();
        let refreshed = cache.refetch(&key, &f).await.unwrap();

        assert_eq!(value(&refreshed), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_value() {
        let cache = no_retry_cache();
        let key = QueryKey::new(keys::AGENTS);
        let ok = fetcher(|| async { Ok::<u32, ClientError>(41) });
        let failing = fetcher(|| async {
            Err::<u32, _>(ClientError::Http {
                status: 500,
                message: "boom".into(),
            })
        });

        cache.get_or_fetch(&key, &ok, FetchOptions::default()).await.unwrap();
        let err = cache.refetch(&key, &failing).await.unwrap_err();
        assert_eq!(
            err,
            ClientError::Http {
                status: 500,
                message: "boom".into()
            }
        );

        let snap = cache.snapshot(&key).await.unwrap();
        assert_eq!(value(snap.data.as_ref().unwrap()), 41);
        assert_eq!(snap.error, Some(err));

        cache.refetch(&key, &ok).await.unwrap();
        assert!(cache.snapshot(&key).await.unwrap().error.is_none());
    }

    #[tokio::test]
    async fn test_failed_fetch_is_retried_once() {
        let cache = QueryCache::new(RetryPolicy::new(1, 1, 5), None);
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let flaky = fetcher(move || {
            let counter = Arc::clone(&counter);
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(ClientError::Transport("reset".into()))
                } else {
                    Ok(5_u32)
                }
            }
        });
        let key = QueryKey::new(keys::TOOLS_BY_SERVER);

        let result = cache.get_or_fetch(&key, &flaky, FetchOptions::default()).await;
        assert_eq!(value(&result.unwrap()), 5);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_fetch_completes_after_requester_drops() {
        let cache = no_retry_cache();
        let calls = Arc::new(AtomicU32::new(0));
        let f = counting_fetcher(Arc::clone(&calls));
        let key = QueryKey::new(keys::AGENTS);
        let mut rx = cache.subscribe();

        let request = cache.get_or_fetch(&key, &f, FetchOptions::default());
        // Poll once so the fetch starts, then abandon it.
        let _ = tokio::time::timeout(Duration::from_millis(1), request).await;

        wait_for(&mut rx, &key, &CacheEventKind::Updated).await;
        let snap = cache.snapshot(&key).await.unwrap();
        assert_eq!(value(snap.data.as_ref().unwrap()), 1);
    }

    #[tokio::test]
    async fn test_invalidation_during_fetch_leaves_entry_stale() {
        let cache = no_retry_cache();
        let calls = Arc::new(AtomicU32::new(0));
        let f = counting_fetcher(Arc::clone(&calls));
        let key = QueryKey::new(keys::AGENTS);
        let mut rx = cache.subscribe();

        let c = cache.clone();
        let k = key.clone();
        let f2 = Arc::clone(&f);
        let handle = tokio::spawn(async move { c.get_or_fetch(&k, &f2, FetchOptions::default()).await });
        wait_for(&mut rx, &key, &CacheEventKind::Fetching).await;

        cache.invalidate(&key).await;
        handle.await.unwrap().unwrap();

        assert!(cache.snapshot(&key).await.unwrap().is_stale);
    }

    #[tokio::test]
    async fn test_stale_time_expires_entries() {
        let cache = QueryCache::new(RetryPolicy::none(), Some(Duration::from_millis(10)));
        let calls = Arc::new(AtomicU32::new(0));
        let f = counting_fetcher(Arc::clone(&calls));
        let key = QueryKey::new(keys::TOOLS);

        cache.get_or_fetch(&key, &f, FetchOptions::default()).await.unwrap();
        assert!(!cache.snapshot(&key).await.unwrap().is_stale);
        tokio::time::sleep(Duration::from_millis(15)).await;
        assert!(cache.snapshot(&key).await.unwrap().is_stale);
    }

    #[tokio::test]
    async fn test_invalidate_unknown_resource_marks_nothing() {
        let cache = no_retry_cache();
        assert_eq!(cache.invalidate(keys::AGENTS).await, 0);
        assert!(cache.keys().await.is_empty());
    }

    #[tokio::test]
    async fn test_invalidate_by_resource_covers_parameterised_keys() {
        let cache = no_retry_cache();
        let f = fetcher(|| async { Ok::<u32, ClientError>(1) });
        let a1 = QueryKey::with_param(keys::AGENT_TOOLS, "a1");
        let a2 = QueryKey::with_param(keys::AGENT_TOOLS, "a2");
        let agents = QueryKey::new(keys::AGENTS);
        for key in [&a1, &a2, &agents] {
            cache.get_or_fetch(key, &f, FetchOptions::default()).await.unwrap();
        }

        assert_eq!(cache.invalidate(keys::AGENT_TOOLS).await, 2);
        assert!(cache.snapshot(&a1).await.unwrap().is_stale);
        assert!(cache.snapshot(&a2).await.unwrap().is_stale);
        assert!(!cache.snapshot(&agents).await.unwrap().is_stale);
        assert_eq!(cache.keys().await, vec![a1, a2, agents]);
    }
}
