//! HTTP fetch handle with an on-disk download cache.
//!
//! Layout: `{cache_dir}/{blake3(url)}.{ext}`. Downloads are written to a
//! `.tmp` file and renamed into place. Transient failures are retried with
//! exponential backoff; 403 trips the circuit breaker; 404 is `SourceNotFound`.
//!
//! A cached download that later fails to decode is renamed to
//! `{hash}.{ext}.quarantined` and fetched again on the next request.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use super::circuit_breaker::CircuitBreaker;
use super::local::LocalFileAccess;
use super::FileAccess;
use crate::error::EnumerationError;
use crate::source::{SourceDescriptor, SourceTransport};

/// Upper bound on the wait between two attempts.
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Downloads remote day files into a local cache.
///
/// Local descriptors are passed through untouched. Remote descriptors are
/// served from the cache when present, otherwise downloaded once.
pub struct HttpFileAccess {
    client: reqwest::blocking::Client,
    cache_dir: PathBuf,
    circuit_breaker: Arc<CircuitBreaker>,
    max_retries: u32,
    base_delay: Duration,
}

impl HttpFileAccess {
    /// Handle caching under `cache_dir`. Defaults to 3 retries starting at
    /// 500ms.
    pub fn new(
        cache_dir: impl Into<PathBuf>,
        circuit_breaker: Arc<CircuitBreaker>,
    ) -> Result<Self, EnumerationError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(60))
            .user_agent(concat!("daystream/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| EnumerationError::Fetch(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            cache_dir: cache_dir.into(),
            circuit_breaker,
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        })
    }

    /// Retry budget after the first attempt, and the first backoff delay.
    pub fn with_retries(mut self, max_retries: u32, base_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.base_delay = base_delay;
        self
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Where a remote descriptor is cached.
    pub fn cache_path(&self, descriptor: &SourceDescriptor) -> PathBuf {
        let hash = blake3::hash(descriptor.location.as_bytes()).to_hex();
        self.cache_dir
            .join(format!("{hash}.{}", descriptor.format.extension()))
    }

    /// Where [`FileAccess::quarantine`] moves an undecodable download.
    pub fn quarantine_path(&self, descriptor: &SourceDescriptor) -> PathBuf {
        let ext = descriptor.format.extension();
        self.cache_path(descriptor)
            .with_extension(format!("{ext}.quarantined"))
    }

    /// Delay before retry `attempt` (1-based): doubles each time, capped at
    /// [`MAX_BACKOFF`].
    fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 2u32
            .checked_pow(attempt.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).min(MAX_BACKOFF)
    }

    fn download_with_retry(&self, url: &str) -> Result<Vec<u8>, EnumerationError> {
        if !self.circuit_breaker.is_allowed() {
            return Err(EnumerationError::CircuitBreakerTripped);
        }

        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.backoff_delay(attempt);
                tracing::warn!(url, attempt, ?delay, "retrying download");
                std::thread::sleep(delay);
            }

            if !self.circuit_breaker.is_allowed() {
                return Err(EnumerationError::CircuitBreakerTripped);
            }

            match self.client.get(url).send() {
                Ok(resp) => {
                    let status = resp.status();

                    if status == reqwest::StatusCode::FORBIDDEN {
                        self.circuit_breaker.trip();
                        return Err(EnumerationError::CircuitBreakerTripped);
                    }

                    if status == reqwest::StatusCode::NOT_FOUND {
                        return Err(EnumerationError::SourceNotFound {
                            location: url.to_string(),
                        });
                    }

                    if !status.is_success() {
                        self.circuit_breaker.record_failure();
                        last_error = Some(EnumerationError::Fetch(format!("HTTP {status} for {url}")));
                        continue;
                    }

                    let body = resp
                        .bytes()
                        .map_err(|e| EnumerationError::Fetch(format!("reading body of {url}: {e}")))?;
                    self.circuit_breaker.record_success();
                    return Ok(body.to_vec());
                }
                Err(e) => {
                    if e.is_connect() || e.is_timeout() {
                        last_error = Some(EnumerationError::Fetch(e.to_string()));
                        continue;
                    }
                    return Err(EnumerationError::Fetch(e.to_string()));
                }
            }
        }

        Err(last_error.unwrap_or_else(|| EnumerationError::Fetch("max retries exceeded".into())))
    }

    fn store(&self, path: &Path, bytes: &[u8]) -> Result<(), EnumerationError> {
        fs::create_dir_all(&self.cache_dir)?;
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, bytes)?;
        fs::rename(&tmp_path, path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            EnumerationError::Io(e)
        })
    }
}

impl FileAccess for HttpFileAccess {
    fn fetch(&self, descriptor: &SourceDescriptor) -> Result<PathBuf, EnumerationError> {
        if descriptor.transport == SourceTransport::LocalFile {
            return LocalFileAccess::existing(&descriptor.location);
        }

        let path = self.cache_path(descriptor);
        if path.is_file() {
            tracing::debug!(url = %descriptor.location, "download cache hit");
            return Ok(path);
        }

        let bytes = self.download_with_retry(&descriptor.location)?;
        self.store(&path, &bytes)?;
        tracing::debug!(url = %descriptor.location, bytes = bytes.len(), "downloaded");
        Ok(path)
    }

    fn quarantine(&self, descriptor: &SourceDescriptor, reason: &EnumerationError) {
        if descriptor.transport != SourceTransport::RemoteFile {
            return;
        }
        let path = self.cache_path(descriptor);
        if !path.is_file() {
            return;
        }

        let target = self.quarantine_path(descriptor);
        tracing::warn!(
            url = %descriptor.location,
            path = %path.display(),
            error = %reason,
            "quarantining corrupt cached download"
        );
        if let Err(e) = fs::rename(&path, &target) {
            tracing::warn!(path = %path.display(), error = %e, "quarantine rename failed");
        }
    }
}
