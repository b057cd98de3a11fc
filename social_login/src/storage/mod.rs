mod cache_store;
mod errors;
mod types;

pub use cache_store::{CacheStore, InMemoryCacheStore, RedisCacheStore};
pub use errors::StorageError;
pub use types::CacheData;

use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared handle to a cache store, safe for concurrent per-session access.
pub type SharedCacheStore = Arc<Mutex<Box<dyn CacheStore>>>;

/// Wrap a cache store implementation into the shared handle the library
/// components expect.
pub fn shared_cache_store<S: CacheStore>(store: S) -> SharedCacheStore {
    let boxed: Box<dyn CacheStore> = Box::new(store);
    Arc::new(Mutex::new(boxed))
}
