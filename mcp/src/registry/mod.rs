//! Static tool catalogue.
//!
//! The registry maps a closed set of [`ToolKey`]s to their descriptors. It is
//! built once at startup and shared read-only; every stage of the resolution
//! pipeline works on its own clone.

pub mod builtin;
pub mod index;
pub mod types;

pub use builtin::default_registry;
pub use index::{EnabledToolSet, ToolRegistry};
pub use types::{HttpMethod, ToolDescriptor, ToolKey, UnknownToolKey};
