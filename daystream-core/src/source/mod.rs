//! Source location: where each day's data lives

pub mod descriptor;
pub mod layout;
pub mod locator;
pub mod registry;

pub use descriptor::{FileFormat, SourceDescriptor, SourceTransport};
pub use layout::{SourceLayout, SourceRoot};
pub use locator::{LayoutLocator, SourceLocator};
pub use registry::LocatorRegistry;
