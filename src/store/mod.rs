//! Resource stores for catalog entities
//!
//! A [`ResourceStore`] owns one collection (products or categories) and hands
//! out identities on create. It is backed either by process memory or by a
//! PostgreSQL table, selected once at startup.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::{PgEntity, PgStore};

/// Handle to a collection of `E`, cheap to clone and share across requests
pub enum ResourceStore<E> {
    Memory(MemoryStore<E>),
    Postgres(PgStore<E>),
}

impl<E> Clone for ResourceStore<E> {
    fn clone(&self) -> Self {
        match self {
            ResourceStore::Memory(store) => ResourceStore::Memory(store.clone()),
            ResourceStore::Postgres(store) => ResourceStore::Postgres(store.clone()),
        }
    }
}

impl<E: PgEntity> ResourceStore<E> {
    /// All entities in insertion order
    pub async fn list(&self) -> Result<Vec<E>, StoreError> {
        match self {
            ResourceStore::Memory(store) => Ok(store.list()),
            ResourceStore::Postgres(store) => store.list().await,
        }
    }

    /// Store a new entity under the next identity
    pub async fn create(&self, payload: E::Payload) -> Result<E, StoreError> {
        match self {
            ResourceStore::Memory(store) => Ok(store.create(payload)),
            ResourceStore::Postgres(store) => store.create(&payload).await,
        }
    }

    pub async fn get(&self, id: i64) -> Result<E, StoreError> {
        match self {
            ResourceStore::Memory(store) => store.get(id),
            ResourceStore::Postgres(store) => store.get(id).await,
        }
    }

    /// Overwrite every field of entity `id` except its identity
    pub async fn replace(&self, id: i64, payload: E::Payload) -> Result<E, StoreError> {
        match self {
            ResourceStore::Memory(store) => store.replace(id, payload),
            ResourceStore::Postgres(store) => store.replace(id, &payload).await,
        }
    }

    pub async fn delete(&self, id: i64) -> Result<(), StoreError> {
        match self {
            ResourceStore::Memory(store) => store.delete(id),
            ResourceStore::Postgres(store) => store.delete(id).await,
        }
    }

    /// Short backend name for startup logs
    pub fn backend(&self) -> &'static str {
        match self {
            ResourceStore::Memory(_) => "memory",
            ResourceStore::Postgres(_) => "postgres",
        }
    }
}

/// Store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{kind} not found")]
    NotFound { kind: &'static str, id: i64 },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
