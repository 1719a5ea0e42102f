use serde::{Deserialize, Serialize};
use std::fmt;

/// Encoding of a day's file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileFormat {
    Csv,
    Parquet,
}

impl FileFormat {
    pub fn extension(self) -> &'static str {
        match self {
            FileFormat::Csv => "csv",
            FileFormat::Parquet => "parquet",
        }
    }
}

/// How the bytes are obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTransport {
    /// `location` is a path on the local filesystem.
    LocalFile,
    /// `location` is a URL fetched (and cached) through the file access handle.
    RemoteFile,
}

/// Where and how one day's data can be obtained.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceDescriptor {
    pub location: String,
    pub format: FileFormat,
    pub transport: SourceTransport,
}

impl SourceDescriptor {
    pub fn new(location: impl Into<String>, format: FileFormat, transport: SourceTransport) -> Self {
        Self {
            location: location.into(),
            format,
            transport,
        }
    }
}

impl fmt::Display for SourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?}/{:?})", self.location, self.format, self.transport)
    }
}
