// Cache store for image metadata.
// Reads and writes the whole store through the storage backend on every call
// and keeps it within a fixed number of entries by evicting the oldest writes.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize, de::Error as _};
use tracing::warn;

use crate::config::{Config, MAX_CACHED_IMAGES, STORAGE_KEY};
use crate::console::{Console, ConsoleMessage, TracingConsole};
use crate::error::Result;
use crate::image::ImageMetadataCache;

use super::storage::KeyValueStorage;

/// Pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    #[serde(deserialize_with = "pixels")]
    pub width: u32,
    #[serde(deserialize_with = "pixels")]
    pub height: u32,
}

/// Accept any non-negative JSON number, e.g. `640.0`, rounded to whole pixels.
fn pixels<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u32, D::Error> {
    let value = f64::deserialize(deserializer)?;
    if value.is_finite() && value >= 0.0 && value <= u32::MAX as f64 {
        Ok(value.round() as u32)
    } else {
        Err(D::Error::custom(format!("invalid pixel count {}", value)))
    }
}

/// File metadata taken from response headers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// Stored metadata for one image URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_info: Option<FileInfo>,
    /// Epoch milliseconds of the most recent write.
    pub added_datetime: i64,
}

/// Partial entry: only the fields that are `Some` are written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryUpdate {
    pub dimensions: Option<Dimensions>,
    pub file_info: Option<FileInfo>,
}

impl EntryUpdate {
    /// Update that writes only dimensions.
    pub fn dimensions(dimensions: Dimensions) -> Self {
        Self {
            dimensions: Some(dimensions),
            file_info: None,
        }
    }

    /// Update that writes only file info.
    pub fn file_info(file_info: FileInfo) -> Self {
        Self {
            dimensions: None,
            file_info: Some(file_info),
        }
    }
}

impl CacheEntry {
    fn merge(&mut self, update: EntryUpdate) {
        if let Some(dimensions) = update.dimensions {
            self.dimensions = Some(dimensions);
        }
        if let Some(file_info) = update.file_info {
            self.file_info = Some(file_info);
        }
    }
}

/// All cached entries keyed by image URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheStore {
    entries: BTreeMap<String, CacheEntry>,
}

impl CacheStore {
    /// Entry for `key`, if cached.
    pub fn get(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    /// Insert or replace the entry for `key`.
    pub fn insert(&mut self, key: impl Into<String>, entry: CacheEntry) {
        self.entries.insert(key.into(), entry);
    }

    /// Remove and return the entry for `key`.
    pub fn remove(&mut self, key: &str) -> Option<CacheEntry> {
        self.entries.remove(key)
    }

    /// Whether `key` has an entry.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &CacheEntry)> {
        self.entries.iter()
    }

    /// Evict the oldest entries so one more can be added without exceeding `max`.
    ///
    /// Entries are ranked newest first by `added_datetime`; equal timestamps are
    /// ranked by ascending key, so the greatest keys go first among ties.
    /// Returns the evicted keys.
    pub fn make_room(&mut self, max: usize) -> Vec<String> {
        if self.entries.len() < max {
            return Vec::new();
        }

        let mut ranked: Vec<(&String, i64)> = self
            .entries
            .iter()
            .map(|(key, entry)| (key, entry.added_datetime))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        let evicted: Vec<String> = ranked
            .into_iter()
            .skip(max.saturating_sub(1))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &evicted {
            self.entries.remove(key);
        }
        evicted
    }
}

type Clock = Box<dyn Fn() -> i64 + Send + Sync>;

/// Bounded metadata cache persisted in a key-value storage item.
///
/// Nothing is held in memory between calls: every read loads the store and
/// every write overwrites it. Concurrent writers for different keys may lose
/// one another's update.
pub struct MetadataCache<S> {
    storage: S,
    storage_key: String,
    max_entries: usize,
    console: Arc<dyn Console>,
    clock: Clock,
}

impl<S: KeyValueStorage> MetadataCache<S> {
    /// Cache with default capacity, storage key and tracing console.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            storage_key: STORAGE_KEY.to_string(),
            max_entries: MAX_CACHED_IMAGES,
            console: Arc::new(TracingConsole),
            clock: Box::new(|| Utc::now().timestamp_millis()),
        }
    }

    /// Cache using the capacity and storage key from `config`.
    pub fn from_config(storage: S, config: &Config) -> Self {
        Self::new(storage)
            .with_storage_key(&config.storage_key)
            .with_max_entries(config.max_cached_images)
    }

    /// Persist under a different storage key.
    pub fn with_storage_key(mut self, key: &str) -> Self {
        self.storage_key = key.to_string();
        self
    }

    /// Change the capacity (at least one entry).
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries.max(1);
        self
    }

    /// Send warnings and notices to `console`.
    pub fn with_console(mut self, console: Arc<dyn Console>) -> Self {
        self.console = console;
        self
    }

    /// Replace the write timestamp source (epoch milliseconds).
    pub fn with_clock(mut self, clock: impl Fn() -> i64 + Send + Sync + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Underlying storage backend.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Maximum number of entries kept.
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Load the persisted store, reading storage failures as an empty store.
    pub fn get_store(&self) -> CacheStore {
        self.load_store().unwrap_or_else(|e| {
            self.console.push(ConsoleMessage::warn(format!(
                "Failed to read image metadata cache: {}",
                e
            )));
            CacheStore::default()
        })
    }

    /// Load the persisted store. Missing data reads as empty; corrupt data is
    /// reported, overwritten with an empty store and read as empty. Storage
    /// read failures are returned.
    pub fn load_store(&self) -> Result<CacheStore> {
        let Some(raw) = self.storage.get_item(&self.storage_key)? else {
            return Ok(CacheStore::default());
        };

        let store = match serde_json::from_str::<CacheStore>(&raw) {
            Ok(store) => store,
            Err(e) => {
                self.console.push(ConsoleMessage::warn(format!(
                    "Resetting corrupt image metadata cache: {}",
                    e
                )));
                let empty = CacheStore::default();
                if let Err(e) = self.put_store(&empty) {
                    warn!(error = %e, "Failed to reset image metadata cache");
                }
                empty
            }
        };
        Ok(store)
    }

    /// Persist the full store, replacing whatever was stored before.
    pub fn put_store(&self, store: &CacheStore) -> Result<()> {
        let json = serde_json::to_string(store)?;
        self.storage.set_item(&self.storage_key, &json)
    }

    /// Cached entry for `key`.
    pub fn get_info(&self, key: &str) -> Option<CacheEntry> {
        self.get_store().remove(key)
    }

    /// Merge `update` into the entry for `key` and stamp it with the current time.
    ///
    /// Capacity is enforced on the store as it was before this write, so the
    /// written entry itself always survives. Nothing is written if the stored
    /// data can't be read.
    pub fn put_info(&self, key: &str, update: EntryUpdate) -> Result<()> {
        let mut store = self.load_store()?;

        let mut entry = store.get(key).cloned().unwrap_or_default();
        entry.merge(update);
        entry.added_datetime = (self.clock)();

        let evicted = store.make_room(self.max_entries);
        if !evicted.is_empty() {
            self.console.push(ConsoleMessage::info(format!(
                "Evicted {} image metadata entries: {}",
                evicted.len(),
                evicted.join(", ")
            )));
        }

        store.insert(key, entry);
        self.put_store(&store)
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.get_store().len()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove one entry. Returns whether it existed.
    pub fn remove(&self, key: &str) -> Result<bool> {
        let mut store = self.load_store()?;
        if store.remove(key).is_none() {
            return Ok(false);
        }
        self.put_store(&store)?;
        Ok(true)
    }

    /// Drop every entry.
    pub fn clear(&self) -> Result<()> {
        self.storage.remove_item(&self.storage_key)
    }
}

impl<S: KeyValueStorage> ImageMetadataCache for MetadataCache<S> {
    async fn get_dimensions(&self, key: &str) -> Option<Dimensions> {
        self.get_info(key).and_then(|entry| entry.dimensions)
    }

    async fn get_file_info(&self, key: &str) -> Option<FileInfo> {
        self.get_info(key).and_then(|entry| entry.file_info)
    }

    async fn put_dimensions(&self, key: &str, dimensions: Dimensions) -> Result<()> {
        self.put_info(key, EntryUpdate::dimensions(dimensions))
    }

    async fn put_file_info(&self, key: &str, file_info: FileInfo) -> Result<()> {
        self.put_info(key, EntryUpdate::file_info(file_info))
    }
}
