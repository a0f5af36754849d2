//! Cache Module
//!
//! Cache-aside layer with lazy TTL expiry, stored in the same table as tasks.

mod entry;
mod layer;
mod stats;


// Re-export public types
pub use entry::CacheEntry;
pub use layer::CacheLayer;
pub use stats::CacheStats;

// == Public Constants ==
/// Prefix that keeps cache rows apart from task rows in the shared table
pub const CACHE_KEY_PREFIX: &str = "cache:";
