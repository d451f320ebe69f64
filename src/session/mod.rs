//! Session tracking module.
//!
//! A session is an opaque client-supplied token grouping the WebSocket
//! channels currently open under it. Sessions have no state of their own:
//! one appears in the registry when its first channel registers and
//! disappears when its last channel closes.

mod id;
mod registry;

pub use id::ChannelId;
pub use registry::SessionRegistry;
