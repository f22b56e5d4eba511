//! Session lifecycle: handles, pool, registry, and heartbeat.

pub mod audience;
pub mod handle;
pub mod heartbeat;
pub mod pool;
pub mod registry;
