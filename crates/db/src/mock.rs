//! In-process stand-ins for the Postgres store, used by tests across the workspace.

mod memory;

pub use memory::MemoryStore;
pub use crate::store::MockSchedulingStore;
