//! Postgres-backed product store.
//!
//! Expects the tables below to be provisioned (schema ownership stays with
//! the database, not this service):
//!
//! ```sql
//! products(id BIGINT PRIMARY KEY, sku BIGINT, name TEXT, amount BIGINT,
//!          payload TEXT, updated_at TIMESTAMPTZ)
//! loyalty_data(sku BIGINT PRIMARY KEY, data TEXT)
//! ```

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::debug;

use batchline_core::{LoyaltyRecord, ProductRecord};
use batchline_pipeline::{ProductStore, StoreError};

/// Postgres implementation of the pipeline's store seam.
///
/// Uses a shared SQLx pool (thread-safe, cheaply cloneable). Writes upsert on
/// the product id and stamp `updated_at`, which the verification read orders
/// by.
pub struct PostgresProductStore {
    pool: PgPool,
}

impl PostgresProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        debug!("connected Postgres product store");
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl ProductStore for PostgresProductStore {
    async fn read_batch(&self, limit: u32) -> Result<Vec<ProductRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, sku, name, amount, payload
            FROM products
            ORDER BY id
            LIMIT $1
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.iter().map(record_from_row).collect()
    }

    async fn fetch_loyalty(&self, sku: i64) -> Result<Option<LoyaltyRecord>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT sku, data
            FROM loyalty_data
            WHERE sku = $1
            "#,
        )
        .bind(sku)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        match row {
            Some(row) => {
                let data: String = row.try_get("data").map_err(map_sqlx_error)?;
                Ok(Some(LoyaltyRecord { sku, data }))
            }
            None => Ok(None),
        }
    }

    async fn write_enriched(&self, records: &[ProductRecord]) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        for record in records {
            sqlx::query(
                r#"
                INSERT INTO products (id, sku, name, amount, payload, updated_at)
                VALUES ($1, $2, $3, $4, $5, now())
                ON CONFLICT (id)
                DO UPDATE SET
                    sku = excluded.sku,
                    name = excluded.name,
                    amount = excluded.amount,
                    payload = excluded.payload,
                    updated_at = excluded.updated_at
                "#,
            )
            .bind(record.id)
            .bind(record.sku)
            .bind(&record.name)
            .bind(record.amount)
            .bind(&record.payload)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        }

        tx.commit().await.map_err(map_sqlx_error)?;
        debug!(written = records.len(), "committed enriched batch");
        Ok(())
    }

    async fn recent(&self, limit: u32) -> Result<Vec<ProductRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, sku, name, amount, payload
            FROM products
            ORDER BY updated_at DESC, id DESC
            LIMIT $1
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.iter().map(record_from_row).collect()
    }
}

fn record_from_row(row: &PgRow) -> Result<ProductRecord, StoreError> {
    Ok(ProductRecord {
        id: row.try_get("id").map_err(map_sqlx_error)?,
        sku: row.try_get("sku").map_err(map_sqlx_error)?,
        name: row.try_get("name").map_err(map_sqlx_error)?,
        amount: row.try_get("amount").map_err(map_sqlx_error)?,
        payload: row.try_get("payload").map_err(map_sqlx_error)?,
    })
}

/// Classify sqlx failures into the pipeline's transient/non-transient split.
fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            StoreError::Unavailable(err.to_string())
        }
        sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::TypeNotFound { .. } => StoreError::Malformed(err.to_string()),
        _ => StoreError::Query(err.to_string()),
    }
}
