// Cache module for image metadata.
// Persists dimensions and file info per image URL with bounded capacity.

pub mod paths;
pub mod storage;
pub mod store;

pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
pub use store::{CacheEntry, CacheStore, Dimensions, EntryUpdate, FileInfo, MetadataCache};
