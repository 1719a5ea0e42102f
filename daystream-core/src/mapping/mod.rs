//! Corporate-action symbol history

pub mod map_file;
pub mod provider;
pub mod resolver;

pub use map_file::{MapFile, MapFileRow};
pub use provider::{InMemoryMapFileProvider, LocalMapFileProvider, MapFileProvider};
pub use resolver::{SymbolHistoryResolver, SymbolMapper};
