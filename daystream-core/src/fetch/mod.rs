//! Fetch handles: turn a source descriptor into a readable local file.
//!
//! The enumerator never touches these itself; it passes the caller's handle
//! through to the reader stage.

pub mod circuit_breaker;
pub mod http;
pub mod local;

use std::path::PathBuf;

use crate::error::EnumerationError;
use crate::source::SourceDescriptor;

pub use circuit_breaker::CircuitBreaker;
pub use http::HttpFileAccess;
pub use local::LocalFileAccess;

/// Fetch/cache handle shared with readers.
pub trait FileAccess: Send + Sync {
    /// Local path holding the descriptor's bytes, downloading if needed.
    fn fetch(&self, descriptor: &SourceDescriptor) -> Result<PathBuf, EnumerationError>;

    /// Set aside a fetched copy of `descriptor` that failed to decode, so the
    /// next fetch does not serve it again. Handles without a cache keep the
    /// default no-op.
    fn quarantine(&self, _descriptor: &SourceDescriptor, _reason: &EnumerationError) {}
}
