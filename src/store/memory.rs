//! In-process resource store

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use super::StoreError;
use crate::catalog::Entity;

/// Ordered collection plus the next identity to hand out
struct Collection<E> {
    items: Vec<E>,
    next_id: i64,
}

impl<E: Entity> Collection<E> {
    fn position(&self, id: i64) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }
}

/// Vec-backed store guarded by a single reader/writer lock.
///
/// Every mutation holds the write lock for its whole duration, so identity
/// assignment and the append happen as one step. Reads clone out under the
/// read lock and never see a half-written entry.
pub struct MemoryStore<E> {
    inner: Arc<RwLock<Collection<E>>>,
}

impl<E> Clone for MemoryStore<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E: Entity> MemoryStore<E> {
    pub fn new() -> Self {
        Self::with_seed(Vec::new())
    }

    /// Start from existing entities; the counter begins one past the largest seeded id
    pub fn with_seed(items: Vec<E>) -> Self {
        let next_id = items.iter().map(E::id).max().unwrap_or(0) + 1;
        Self {
            inner: Arc::new(RwLock::new(Collection { items, next_id })),
        }
    }

    pub fn list(&self) -> Vec<E> {
        self.inner.read().items.clone()
    }

    pub fn create(&self, payload: E::Payload) -> E {
        let mut collection = self.inner.write();
        let id = collection.next_id;
        let entity = E::from_payload(id, payload);
        collection.items.push(entity.clone());
        collection.next_id += 1;

        debug!(kind = E::KIND, id, "created");
        entity
    }

    pub fn get(&self, id: i64) -> Result<E, StoreError> {
        let collection = self.inner.read();
        collection
            .items
            .iter()
            .find(|item| item.id() == id)
            .cloned()
            .ok_or(StoreError::NotFound { kind: E::KIND, id })
    }

    pub fn replace(&self, id: i64, payload: E::Payload) -> Result<E, StoreError> {
        let mut collection = self.inner.write();
        let pos = collection
            .position(id)
            .ok_or(StoreError::NotFound { kind: E::KIND, id })?;

        let entity = E::from_payload(id, payload);
        collection.items[pos] = entity.clone();

        debug!(kind = E::KIND, id, "replaced");
        Ok(entity)
    }

    pub fn delete(&self, id: i64) -> Result<(), StoreError> {
        let mut collection = self.inner.write();
        let pos = collection
            .position(id)
            .ok_or(StoreError::NotFound { kind: E::KIND, id })?;

        // Vec::remove keeps the relative order of the remaining entries
        collection.items.remove(pos);

        debug!(kind = E::KIND, id, "deleted");
        Ok(())
    }
}

impl<E: Entity> Default for MemoryStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{product, Category, CategoryPayload, Product, ProductPayload};

    fn payload(name: &str, price: i64, stock: i64) -> ProductPayload {
        ProductPayload {
            name: name.to_string(),
            price,
            stock,
        }
    }

    fn ids(store: &MemoryStore<Product>) -> Vec<i64> {
        store.list().iter().map(|p| p.id).collect()
    }

    #[test]
    fn counter_starts_after_seed() {
        let store = MemoryStore::with_seed(product::seed());
        let created = store.create(payload("Nasi Goreng", 15000, 50));

        assert_eq!(
            created,
            Product {
                id: 3,
                name: "Nasi Goreng".to_string(),
                price: 15000,
                stock: 50,
            }
        );
        assert_eq!(ids(&store), vec![1, 2, 3]);
    }

    #[test]
    fn identities_strictly_increase_across_deletes() {
        let store = MemoryStore::<Product>::new();
        let mut seen = Vec::new();
        for i in 0..5 {
            let created = store.create(payload("x", i, i));
            seen.push(created.id);
            if i % 2 == 0 {
                store.delete(created.id).unwrap();
            }
        }

        assert_eq!(seen, vec![1, 2, 3, 4, 5]);
        assert_eq!(ids(&store), vec![2, 4]);

        // Deleting the newest entry does not make its id available again
        store.delete(4).unwrap();
        assert_eq!(store.create(payload("y", 0, 0)).id, 6);
    }

    #[test]
    fn get_returns_created_fields() {
        let store = MemoryStore::<Product>::new();
        let created = store.create(payload("Roti Bakar", 12000, 7));
        let fetched = store.get(created.id).unwrap();

        assert_eq!(fetched.name, "Roti Bakar");
        assert_eq!(fetched.price, 12000);
        assert_eq!(fetched.stock, 7);
    }

    #[test]
    fn replace_keeps_identity_and_position() {
        let store = MemoryStore::with_seed(product::seed());
        store.create(payload("Mie Ayam", 13000, 20));

        let updated = store.replace(2, payload("Es Teh Manis", 3500, 80)).unwrap();
        assert_eq!(updated.id, 2);
        assert_eq!(store.get(2).unwrap(), updated);
        assert_eq!(ids(&store), vec![1, 2, 3]);
        assert_eq!(store.list()[1].name, "Es Teh Manis");
    }

    #[test]
    fn delete_removes_one_and_preserves_order() {
        let store = MemoryStore::with_seed(product::seed());
        store.create(payload("Mie Ayam", 13000, 20));

        store.delete(1).unwrap();
        assert!(matches!(
            store.get(1),
            Err(StoreError::NotFound { kind: "Product", id: 1 })
        ));
        assert_eq!(ids(&store), vec![2, 3]);
    }

    #[test]
    fn missing_id_is_not_found_and_mutates_nothing() {
        let store = MemoryStore::with_seed(product::seed());
        let before = store.list();

        assert!(matches!(store.get(42), Err(StoreError::NotFound { .. })));
        assert!(matches!(
            store.replace(42, payload("ghost", 1, 1)),
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(store.delete(42), Err(StoreError::NotFound { .. })));

        assert_eq!(store.list(), before);
        // A failed replace must not consume an identity either
        assert_eq!(store.create(payload("z", 0, 0)).id, 3);
    }

    #[test]
    fn clones_share_one_collection() {
        let store = MemoryStore::<Category>::new();
        let other = store.clone();
        other.create(CategoryPayload {
            name: "Snack".to_string(),
        });
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn concurrent_creates_never_collide() {
        let store = MemoryStore::<Category>::new();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || {
                    (0..50)
                        .map(|_| store.create(CategoryPayload::default()).id)
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut all: Vec<i64> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        all.sort_unstable();
        all.dedup();

        assert_eq!(all.len(), 400);
        assert_eq!(store.list().len(), 400);
    }
}
