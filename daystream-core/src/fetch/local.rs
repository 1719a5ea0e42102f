//! Offline fetch handle.

use std::path::PathBuf;

use super::FileAccess;
use crate::error::EnumerationError;
use crate::source::{SourceDescriptor, SourceTransport};

/// Offline handle: local files only.
///
/// Local descriptors resolve to their own path. Remote descriptors are refused
/// with a `Fetch` error instead of being downloaded.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileAccess;

impl LocalFileAccess {
    /// `location` as a path if a file exists there, else `SourceNotFound`.
    pub(crate) fn existing(location: &str) -> Result<PathBuf, EnumerationError> {
        let path = PathBuf::from(location);
        if path.is_file() {
            Ok(path)
        } else {
            Err(EnumerationError::SourceNotFound {
                location: location.to_string(),
            })
        }
    }
}

impl FileAccess for LocalFileAccess {
    fn fetch(&self, descriptor: &SourceDescriptor) -> Result<PathBuf, EnumerationError> {
        match descriptor.transport {
            SourceTransport::LocalFile => Self::existing(&descriptor.location),
            SourceTransport::RemoteFile => Err(EnumerationError::Fetch(format!(
                "offline: cannot download {}",
                descriptor.location
            ))),
        }
    }
}
