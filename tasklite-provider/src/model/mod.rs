//! Task representations.
//!
//! Three shapes of the same entity live here and are translated in exactly
//! one place each:
//! - [`TaskDescriptor`]: the host's configuration model (tri-state values)
//! - [`Task`]: the resolved entity the client operates on
//! - the wire records of each [`SchemaVersion`]

mod descriptor;
mod task;
mod wire;

pub use descriptor::{TaskDescriptor, Value};
pub use task::{DEFAULT_COMPLETE, DEFAULT_PRIORITY, Task};
pub use wire::SchemaVersion;
