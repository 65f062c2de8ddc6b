//! The room-id pool: a fixed universe of zero-padded numeric identifiers,
//! each either available or assigned to exactly one game.

use std::sync::Arc;

use game_types::RoomId;

use crate::error::StoreError;
use crate::store::SessionStore;

/// Hands out room ids from the store's available set and takes them back
/// when games die. The set operations underneath are atomic, so concurrent
/// allocators never collide.
pub struct RoomAllocator {
    store: Arc<dyn SessionStore>,
}

impl RoomAllocator {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Seed the pool with `pool_size` ids, zero-padded to a uniform width
    /// (`10_000` gives `0000`..`9999`). A store that was seeded by an earlier
    /// boot keeps its pool untouched.
    pub async fn seed(&self, pool_size: u32) -> Result<(), StoreError> {
        let width = digits(pool_size.saturating_sub(1));
        let ids: Vec<RoomId> = (0..pool_size)
            .map(|i| RoomId(format!("{i:0width$}")))
            .collect();

        if self.store.seed_rooms(&ids).await? {
            tracing::info!("seeded room pool with {pool_size} ids");
        } else {
            tracing::info!("room pool already seeded, leaving it as retained");
        }
        Ok(())
    }

    /// Take one arbitrary available id, or `None` when every room is in use.
    pub async fn allocate(&self) -> Result<Option<RoomId>, StoreError> {
        self.store.allocate_room().await
    }

    /// Return an id to the pool. Idempotent against double-release.
    pub async fn release(&self, room_id: &RoomId) -> Result<(), StoreError> {
        self.store.release_room(room_id).await
    }
}

fn digits(max_id: u32) -> usize {
    (max_id.max(1)).ilog10() as usize + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    #[tokio::test]
    async fn test_ids_are_zero_padded_to_pool_width() {
        let store = Arc::new(MemoryStore::new());
        let allocator = RoomAllocator::new(store);
        allocator.seed(100).await.unwrap();

        for _ in 0..100 {
            let id = allocator.allocate().await.unwrap().unwrap();
            assert_eq!(id.0.len(), 2);
            assert!(id.0.chars().all(|c| c.is_ascii_digit()));
        }
        assert!(allocator.allocate().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_release_makes_id_reallocatable() {
        let store = Arc::new(MemoryStore::new());
        let allocator = RoomAllocator::new(store);
        allocator.seed(1).await.unwrap();

        let id = allocator.allocate().await.unwrap().unwrap();
        assert!(allocator.allocate().await.unwrap().is_none());

        allocator.release(&id).await.unwrap();
        assert_eq!(allocator.allocate().await.unwrap(), Some(id));
    }
}
