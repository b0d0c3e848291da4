//! MIA Session Store
//!
//! Holds the signed-in user's bearer token and profile for the lifetime of a
//! client session, backed by a small keyed storage (in memory or on disk).

pub mod storage;
pub mod store;

pub use storage::{FileStorage, MemoryStorage, SessionStorage, StoreError, StoreResult};
pub use store::SessionStore;
