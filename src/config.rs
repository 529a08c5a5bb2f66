// Runtime configuration.
// Cache capacity, storage location and the retry policy for header probes.

use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use crate::cache::paths;

/// Maximum number of cached image entries.
pub const MAX_CACHED_IMAGES: usize = 30;

/// Storage key under which the cache store is persisted.
pub const STORAGE_KEY: &str = "imageMetadataCache";

/// Number of retries after the first probe attempt.
pub const DEFAULT_RETRIES: u32 = 5;

/// Backoff policy for retried probes.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub retries: u32,
    /// Delay before the first retry.
    pub min_timeout: Duration,
    /// Growth factor applied per retry.
    pub factor: f64,
    /// Upper bound on any single delay.
    pub max_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: DEFAULT_RETRIES,
            min_timeout: Duration::from_secs(1),
            factor: 2.0,
            max_timeout: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Policy with no delay between attempts.
    pub fn immediate(retries: u32) -> Self {
        Self {
            retries,
            min_timeout: Duration::ZERO,
            factor: 1.0,
            max_timeout: Duration::ZERO,
        }
    }

    /// Total attempts including the first.
    pub fn max_attempts(&self) -> u32 {
        self.retries + 1
    }

    /// Delay before retry number `retry` (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1) as i32;
        let secs = self.min_timeout.as_secs_f64() * self.factor.powi(exponent);
        let capped = secs.min(self.max_timeout.as_secs_f64());
        if capped.is_finite() && capped > 0.0 {
            Duration::from_secs_f64(capped)
        } else {
            Duration::ZERO
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub max_cached_images: usize,
    pub storage_key: String,
    pub storage_dir: Option<PathBuf>,
    pub retry: RetryPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_cached_images: MAX_CACHED_IMAGES,
            storage_key: STORAGE_KEY.to_string(),
            storage_dir: paths::storage_dir(),
            retry: RetryPolicy::default(),
        }
    }
}

impl Config {
    /// Defaults overridden by `IMGMETA_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(dir) = lookup("IMGMETA_CACHE_DIR") {
            config.storage_dir = Some(PathBuf::from(dir));
        }

        if let Some(raw) = lookup("IMGMETA_MAX_CACHED_IMAGES") {
            match raw.trim().parse::<usize>() {
                Ok(max) if max > 0 => config.max_cached_images = max,
                _ => warn!(value = %raw, "Ignoring invalid IMGMETA_MAX_CACHED_IMAGES"),
            }
        }

        if let Some(raw) = lookup("IMGMETA_RETRIES") {
            match raw.trim().parse::<u32>() {
                Ok(retries) => config.retry.retries = retries,
                Err(_) => warn!(value = %raw, "Ignoring invalid IMGMETA_RETRIES"),
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_makes_six_attempts() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 6);
    }

    #[test]
    fn test_delay_grows_and_caps() {
        let policy = RetryPolicy {
            retries: 10,
            min_timeout: Duration::from_secs(1),
            factor: 2.0,
            max_timeout: Duration::from_secs(5),
        };
        assert_eq!(policy.delay_for(1), Duration::from_secs(1));
        assert_eq!(policy.delay_for(2), Duration::from_secs(2));
        assert_eq!(policy.delay_for(3), Duration::from_secs(4));
        assert_eq!(policy.delay_for(4), Duration::from_secs(5));
    }

    #[test]
    fn test_immediate_policy_has_no_delay() {
        let policy = RetryPolicy::immediate(3);
        assert_eq!(policy.delay_for(1), Duration::ZERO);
        assert_eq!(policy.delay_for(3), Duration::ZERO);
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = Config::from_lookup(|name| match name {
            "IMGMETA_CACHE_DIR" => Some("/tmp/imgmeta".to_string()),
            "IMGMETA_MAX_CACHED_IMAGES" => Some("12".to_string()),
            "IMGMETA_RETRIES" => Some("2".to_string()),
            _ => None,
        });
        assert_eq!(config.storage_dir, Some(PathBuf::from("/tmp/imgmeta")));
        assert_eq!(config.max_cached_images, 12);
        assert_eq!(config.retry.retries, 2);
    }

    #[test]
    fn test_from_lookup_ignores_garbage() {
        let config = Config::from_lookup(|name| match name {
            "IMGMETA_MAX_CACHED_IMAGES" => Some("lots".to_string()),
            "IMGMETA_RETRIES" => Some("-1".to_string()),
            _ => None,
        });
        assert_eq!(config.max_cached_images, MAX_CACHED_IMAGES);
        assert_eq!(config.retry.retries, DEFAULT_RETRIES);
        assert_eq!(config.storage_key, STORAGE_KEY);
    }
}
