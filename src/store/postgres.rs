//! PostgreSQL-backed resource store

use std::marker::PhantomData;
use std::time::Duration;

use sqlx::postgres::{PgArguments, PgPoolOptions, PgRow};
use sqlx::query::QueryAs;
use sqlx::{FromRow, PgPool, Postgres};
use tracing::{debug, info};

use super::StoreError;
use crate::catalog::{Category, CategoryPayload, Entity, Product, ProductPayload};

/// Maximum open connections in the pool
pub const MAX_CONNECTIONS: u32 = 25;
/// Connections kept open while idle
pub const MIN_CONNECTIONS: u32 = 5;
/// Connections are recycled after this long
pub const MAX_LIFETIME: Duration = Duration::from_secs(5 * 60);
/// How long a request waits for a free connection
pub const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

type PgQueryAs<'q, E> = QueryAs<'q, Postgres, E, PgArguments>;

/// An entity that maps onto one table.
///
/// `COLUMNS` lists every column except `id`, in the order `bind_payload`
/// binds them.
pub trait PgEntity: Entity + for<'r> FromRow<'r, PgRow> + Unpin {
    const TABLE: &'static str;
    const COLUMNS: &'static [&'static str];

    fn bind_payload<'q>(query: PgQueryAs<'q, Self>, payload: &'q Self::Payload)
        -> PgQueryAs<'q, Self>;
}

impl PgEntity for Product {
    const TABLE: &'static str = "products";
    const COLUMNS: &'static [&'static str] = &["name", "price", "stock"];

    fn bind_payload<'q>(
        query: PgQueryAs<'q, Self>,
        payload: &'q ProductPayload,
    ) -> PgQueryAs<'q, Self> {
        query
            .bind(payload.name.as_str())
            .bind(payload.price)
            .bind(payload.stock)
    }
}

impl PgEntity for Category {
    const TABLE: &'static str = "categories";
    const COLUMNS: &'static [&'static str] = &["name"];

    fn bind_payload<'q>(
        query: PgQueryAs<'q, Self>,
        payload: &'q CategoryPayload,
    ) -> PgQueryAs<'q, Self> {
        query.bind(payload.name.as_str())
    }
}

/// Connect to PostgreSQL, failing fast if the server is unreachable
pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .min_connections(MIN_CONNECTIONS)
        .max_lifetime(MAX_LIFETIME)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(database_url)
        .await?;

    info!("Database connected");
    Ok(pool)
}

/// Apply pending migrations from `migrations/`
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations applied");
    Ok(())
}

/// Table-backed store; identities come from the table's sequence
pub struct PgStore<E> {
    pool: PgPool,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for PgStore<E> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: PgEntity> PgStore<E> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }

    fn select_columns() -> String {
        format!("id, {}", E::COLUMNS.join(", "))
    }

    pub async fn list(&self) -> Result<Vec<E>, StoreError> {
        // Ids come from a sequence, so id order is insertion order
        let sql = format!(
            "SELECT {} FROM {} ORDER BY id",
            Self::select_columns(),
            E::TABLE
        );
        let rows = sqlx::query_as::<_, E>(&sql).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    pub async fn create(&self, payload: &E::Payload) -> Result<E, StoreError> {
        let placeholders: Vec<String> = (1..=E::COLUMNS.len()).map(|n| format!("${n}")).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
            E::TABLE,
            E::COLUMNS.join(", "),
            placeholders.join(", "),
            Self::select_columns()
        );

        let entity = E::bind_payload(sqlx::query_as::<_, E>(&sql), payload)
            .fetch_one(&self.pool)
            .await?;

        debug!(kind = E::KIND, id = entity.id(), "created");
        Ok(entity)
    }

    pub async fn get(&self, id: i64) -> Result<E, StoreError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = $1",
            Self::select_columns(),
            E::TABLE
        );

        sqlx::query_as::<_, E>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound { kind: E::KIND, id })
    }

    pub async fn replace(&self, id: i64, payload: &E::Payload) -> Result<E, StoreError> {
        let assignments: Vec<String> = E::COLUMNS
            .iter()
            .enumerate()
            .map(|(i, column)| format!("{column} = ${}", i + 1))
            .collect();
        let sql = format!(
            "UPDATE {} SET {} WHERE id = ${} RETURNING {}",
            E::TABLE,
            assignments.join(", "),
            E::COLUMNS.len() + 1,
            Self::select_columns()
        );

        let entity = E::bind_payload(sqlx::query_as::<_, E>(&sql), payload)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound { kind: E::KIND, id })?;

        debug!(kind = E::KIND, id, "replaced");
        Ok(entity)
    }

    pub async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", E::TABLE);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { kind: E::KIND, id });
        }

        debug!(kind = E::KIND, id, "deleted");
        Ok(())
    }
}
