// HTTP client for header-only probes of image URLs.
// Issues HEAD requests, maps non-success statuses to errors and retries
// transient failures.

use std::sync::Arc;

use reqwest::{
    Client, Response,
    header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT},
};
use tracing::debug;

use crate::cache::FileInfo;
use crate::config::{Config, RetryPolicy};
use crate::console::{Console, TracingConsole};
use crate::error::{ImgMetaError, Result};
use crate::image::FileInfoSource;

use super::headers::file_info_from_headers;
use super::retry::retry;

/// Fetches file metadata for remote images without downloading them.
pub struct MetadataFetcher {
    client: Client,
    policy: RetryPolicy,
    console: Arc<dyn Console>,
}

impl MetadataFetcher {
    /// Create a fetcher with the default retry policy.
    pub fn new() -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("image/*,*/*;q=0.8"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("imgmeta/", env!("CARGO_PKG_VERSION"))),
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(ImgMetaError::Http)?;

        Ok(Self {
            client,
            policy: RetryPolicy::default(),
            console: Arc::new(TracingConsole),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new()?.with_policy(config.retry.clone()))
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_console(mut self, console: Arc<dyn Console>) -> Self {
        self.console = console;
        self
    }

    /// Probe `url` once and return the response headers.
    pub async fn probe(&self, url: &str) -> Result<HeaderMap> {
        let response = self.client.head(url).send().await?;
        let response = check_response(response)?;
        Ok(response.headers().clone())
    }

    /// Probe `url` with retries and extract size and type from the headers.
    pub async fn fetch_file_info(&self, url: &str) -> Result<FileInfo> {
        let headers = retry(&self.policy, self.console.as_ref(), url, |attempt| {
            debug!(url, attempt, "Probing image headers");
            self.probe(url)
        })
        .await?;

        Ok(file_info_from_headers(&headers))
    }
}

impl FileInfoSource for MetadataFetcher {
    async fn file_info(&self, url: &str) -> Result<FileInfo> {
        self.fetch_file_info(url).await
    }
}

/// Check response status and convert failures.
fn check_response(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ImgMetaError::Status {
            status,
            url: response.url().to_string(),
        })
    }
}
