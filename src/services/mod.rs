pub mod discovery_mutation;
pub mod queries;
pub mod query;
pub mod query_cache;
pub mod query_key;
pub mod retry;

pub use discovery_mutation::{
    DiscoveryMutation, MutationState, DISCOVERY_ERROR_FALLBACK, DISCOVERY_SUCCESS_FALLBACK,
};
pub use queries::ApiQueries;
pub use query::{Query, QueryState};
pub use query_cache::{
    fetcher, CacheEvent, CacheEventKind, CachedValue, EntrySnapshot, FetchOptions, Fetcher,
    QueryCache,
};
pub use query_key::{keys, KeyFilter, QueryKey};
pub use retry::RetryPolicy;
