// Service exports
pub mod cache;
pub mod postgres;
pub mod store;

pub use cache::{CacheManager, CacheKey, CacheError, CacheStats, CachedGeocodeStore};
pub use postgres::{PostgresClient, PostgresError};
pub use store::{ChannelStore, GeocodeStore, MemoryStore, StoreError};
