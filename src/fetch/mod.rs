// Metadata fetching module.
// Header-only probes with bounded retries.

pub mod client;
pub mod headers;
pub mod retry;

pub use client::MetadataFetcher;
pub use headers::file_info_from_headers;
pub use retry::{Decision, classify, retry};
