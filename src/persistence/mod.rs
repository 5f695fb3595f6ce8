//! Durable state that outlives a session
//!
//! Features:
//! - Pluggable string key/value backends (memory, JSON file, LocalStorage)
//! - Typed progress facade with monotonic facts
//! - Read/write failures degrade to in-memory state, never to errors in play

pub mod progress;
pub mod store;

pub use progress::{HIGH_SCORE_KEY, Progress, UNLOCKED_LEVELS_KEY, completed_key};
#[cfg(not(target_arch = "wasm32"))]
pub use store::JsonFileStore;
#[cfg(target_arch = "wasm32")]
pub use store::LocalStore;
pub use store::{KeyValueStore, MemoryStore};
