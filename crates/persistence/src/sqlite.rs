//! SQLite-backed record store.
//!
//! Each table keys rows by normalized building name and period and keeps the
//! full record as a JSON payload, so new measure columns need no schema
//! change. "Tower" and " tower" land on the same row, as in [`MemoryStore`].

use crate::{MemoryStore, PublishedPrice, PublishedPriceTable, StoreError};
use pricing_core::{normalize_location, DailyOccupancyRecord, MonthlyRecord};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::str::FromStr;
use tracing::{debug, info};

const SCHEMA: [&str; 3] = [
    "CREATE TABLE IF NOT EXISTS monthly_records (
        location_key TEXT NOT NULL,
        year INTEGER NOT NULL,
        month INTEGER NOT NULL,
        payload TEXT NOT NULL,
        PRIMARY KEY (location_key, year, month)
    )",
    "CREATE TABLE IF NOT EXISTS daily_occupancy (
        location_key TEXT NOT NULL,
        date TEXT NOT NULL,
        payload TEXT NOT NULL,
        PRIMARY KEY (location_key, date)
    )",
    "CREATE TABLE IF NOT EXISTS published_prices (
        location_key TEXT NOT NULL,
        valid_from TEXT NOT NULL,
        payload TEXT NOT NULL,
        PRIMARY KEY (location_key, valid_from)
    )",
];

#[derive(Clone, Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `url` and ensure the tables exist.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        // Every connection to an in-memory database is a separate database.
        let pool = if url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new().max_connections(4).connect_with(options).await?
        };
        let store = Self { pool };
        store.init().await?;
        info!(url, "opened sqlite store");
        Ok(store)
    }

    async fn init(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    pub async fn upsert_monthly(&self, record: &MonthlyRecord) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO monthly_records (location_key, year, month, payload) VALUES (?, ?, ?, ?)
             ON CONFLICT (location_key, year, month) DO UPDATE SET payload = excluded.payload",
        )
        .bind(normalize_location(&record.building_name))
        .bind(i64::from(record.year))
        .bind(i64::from(record.month))
        .bind(serde_json::to_string(record)?)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn upsert_daily(&self, record: &DailyOccupancyRecord) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO daily_occupancy (location_key, date, payload) VALUES (?, ?, ?)
             ON CONFLICT (location_key, date) DO UPDATE SET payload = excluded.payload",
        )
        .bind(normalize_location(&record.building_name))
        .bind(record.date.to_string())
        .bind(serde_json::to_string(record)?)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn upsert_published_price(&self, price: &PublishedPrice) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO published_prices (location_key, valid_from, payload) VALUES (?, ?, ?)
             ON CONFLICT (location_key, valid_from) DO UPDATE SET payload = excluded.payload",
        )
        .bind(normalize_location(&price.building_name))
        .bind(price.valid_from.to_string())
        .bind(serde_json::to_string(price)?)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Load every row into memory for a synchronous pricing run.
    pub async fn snapshot(&self) -> Result<(MemoryStore, PublishedPriceTable), StoreError> {
        let monthly: Vec<MonthlyRecord> = self
            .payloads("SELECT payload FROM monthly_records ORDER BY year, month, location_key")
            .await?;
        let daily: Vec<DailyOccupancyRecord> = self
            .payloads("SELECT payload FROM daily_occupancy ORDER BY date, location_key")
            .await?;
        let prices: Vec<PublishedPrice> = self
            .payloads("SELECT payload FROM published_prices ORDER BY location_key, valid_from")
            .await?;
        debug!(
            monthly = monthly.len(),
            daily = daily.len(),
            prices = prices.len(),
            "sqlite snapshot"
        );
        Ok((MemoryStore::new(monthly, daily), PublishedPriceTable::new(prices)?))
    }

    async fn payloads<T: serde::de::DeserializeOwned>(&self, sql: &str) -> Result<Vec<T>, StoreError> {
        let rows = sqlx::query(sql).fetch_all(&self.pool).await?;
        rows.iter()
            .map(|row| {
                let payload: String = row.try_get("payload")?;
                serde_json::from_str(&payload)
                    .map_err(|e| StoreError::InvalidRecord(format!("undecodable payload: {e}")))
            })
            .collect()
    }
}
