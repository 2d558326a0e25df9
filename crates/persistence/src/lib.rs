#![deny(warnings)]

//! Persistence layer: record stores feeding the pricing pipeline.
//!
//! Three backends share the [`RecordSource`] trait: an in-memory store, a
//! JSON snapshot file and a SQLite database. Published list prices live in a
//! [`PublishedPriceTable`] next to the records.

pub mod json;
pub mod memory;
pub mod published;
pub mod sqlite;

pub use json::{JsonFileStore, Snapshot};
pub use memory::MemoryStore;
pub use published::{PublishedPrice, PublishedPriceTable};
pub use sqlite::SqliteStore;

use chrono::NaiveDate;
use pricing_core::{normalize_location, DailyOccupancyRecord, MonthlyRecord};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("sqlite error: {0}")]
    Sqlite(#[from] sqlx::Error),
    #[error("invalid record: {0}")]
    InvalidRecord(String),
}

/// Read access to monthly and daily source rows.
pub trait RecordSource {
    /// Monthly rows, optionally restricted to one building (case-insensitive).
    fn monthly_records(&self, location: Option<&str>) -> Result<Vec<MonthlyRecord>, StoreError>;

    /// Daily rows dated in `[from, to)`, optionally restricted to one building.
    fn daily_records(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        location: Option<&str>,
    ) -> Result<Vec<DailyOccupancyRecord>, StoreError>;
}

/// Returns the default SQLite URL used for local record stores.
pub fn default_sqlite_url() -> &'static str {
    "sqlite://./data/po_pricing.db"
}

pub(crate) fn matches_location(building_name: &str, filter: Option<&str>) -> bool {
    match filter {
        Some(wanted) => normalize_location(building_name) == normalize_location(wanted),
        None => true,
    }
}
