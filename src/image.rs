// Remote image metadata resolution.
// Looks up dimensions and file info in a cache and probes the network only on a miss.

use tracing::warn;

use crate::cache::{Dimensions, FileInfo};
use crate::error::Result;

/// Cache adapter consulted before any network probe.
#[allow(async_fn_in_trait)]
pub trait ImageMetadataCache {
    async fn get_dimensions(&self, key: &str) -> Option<Dimensions>;

    async fn get_file_info(&self, key: &str) -> Option<FileInfo>;

    /// Store dimensions, keeping any cached file info.
    async fn put_dimensions(&self, key: &str, dimensions: Dimensions) -> Result<()>;

    /// Store file info, keeping any cached dimensions.
    async fn put_file_info(&self, key: &str, file_info: FileInfo) -> Result<()>;
}

/// Strategy for looking up file info of a URL.
#[allow(async_fn_in_trait)]
pub trait FileInfoSource {
    async fn file_info(&self, url: &str) -> Result<FileInfo>;
}

/// An image addressed by URL whose metadata is resolved lazily.
pub struct RemoteImage<'a, C, F> {
    url: String,
    cache: &'a C,
    source: &'a F,
}

impl<'a, C: ImageMetadataCache, F: FileInfoSource> RemoteImage<'a, C, F> {
    pub fn new(url: impl Into<String>, cache: &'a C, source: &'a F) -> Self {
        Self {
            url: url.into(),
            cache,
            source,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Cached file info, or probe the source and cache what it returns.
    pub async fn file_info(&self) -> Result<FileInfo> {
        if let Some(info) = self.cache.get_file_info(&self.url).await {
            return Ok(info);
        }

        let info = self.source.file_info(&self.url).await?;
        if let Err(e) = self.cache.put_file_info(&self.url, info.clone()).await {
            warn!(url = %self.url, error = %e, "Failed to cache file info");
        }
        Ok(info)
    }

    /// Dimensions recorded for this image, if any.
    pub async fn dimensions(&self) -> Option<Dimensions> {
        self.cache.get_dimensions(&self.url).await
    }

    /// Record dimensions measured by whoever rendered the image.
    pub async fn record_dimensions(&self, dimensions: Dimensions) -> Result<()> {
        self.cache.put_dimensions(&self.url, dimensions).await
    }
}
