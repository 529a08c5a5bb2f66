// imgmeta: bounded metadata cache and retrying header probe for remote images.

pub mod cache;
pub mod config;
pub mod console;
pub mod error;
pub mod fetch;
pub mod image;

pub use cache::{
    CacheEntry, CacheStore, Dimensions, EntryUpdate, FileInfo, FileStorage, KeyValueStorage,
    MemoryStorage, MetadataCache,
};
pub use config::{Config, MAX_CACHED_IMAGES, RetryPolicy};
pub use console::{Console, ConsoleLevel, ConsoleMessage, MemoryConsole, TracingConsole};
pub use error::{ImgMetaError, Result};
pub use fetch::MetadataFetcher;
pub use image::{FileInfoSource, ImageMetadataCache, RemoteImage};
