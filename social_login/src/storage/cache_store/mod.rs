mod memory;
mod redis;
mod types;

pub use types::{CacheStore, InMemoryCacheStore, RedisCacheStore};
