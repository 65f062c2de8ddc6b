//! Persistence-access layer for the game session engine.
//!
//! Room and player state lives in an external Redis-compatible key-value
//! store so a process restart does not wipe running games. Everything the
//! rest of the workspace may do to that store goes through the
//! [`SessionStore`] trait, which only exposes atomic, entity-level
//! operations; callers never compose raw field-by-field reads and writes.
//!
//! Two implementations: [`RedisStore`] for production and [`MemoryStore`]
//! for tests.

pub mod allocator;
pub mod error;
pub mod memory;
pub mod redis;
pub mod store;

// Re-export primary types for convenience.
pub use allocator::RoomAllocator;
pub use error::StoreError;
pub use memory::MemoryStore;
pub use redis::RedisStore;
pub use store::{GameRecord, PlayerRecord, SessionStore};
