//! Application state shared across routes

use std::sync::Arc;

use sqlx::PgPool;

use crate::catalog::{category, product, Category, Product};
use crate::config::Config;
use crate::store::{MemoryStore, PgStore, ResourceStore};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub products: ResourceStore<Product>,
    pub categories: ResourceStore<Category>,
}

impl AppState {
    /// State backed by in-process collections seeded with the starter menu
    pub fn in_memory(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            products: ResourceStore::Memory(MemoryStore::with_seed(product::seed())),
            categories: ResourceStore::Memory(MemoryStore::with_seed(category::seed())),
        }
    }

    /// State backed by PostgreSQL tables
    pub fn with_pool(config: Config, pool: PgPool) -> Self {
        Self {
            config: Arc::new(config),
            products: ResourceStore::Postgres(PgStore::new(pool.clone())),
            categories: ResourceStore::Postgres(PgStore::new(pool)),
        }
    }
}
