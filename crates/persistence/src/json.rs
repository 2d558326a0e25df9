//! JSON snapshot files.

use crate::{MemoryStore, PublishedPrice, PublishedPriceTable, StoreError};
use pricing_core::{DailyOccupancyRecord, MonthlyRecord};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Everything a pricing run reads, in one serialisable value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub monthly: Vec<MonthlyRecord>,
    #[serde(default)]
    pub daily: Vec<DailyOccupancyRecord>,
    #[serde(default)]
    pub published_prices: Vec<PublishedPrice>,
}

impl Snapshot {
    /// Split into a record store and a validated price table.
    pub fn into_parts(self) -> Result<(MemoryStore, PublishedPriceTable), StoreError> {
        let table = PublishedPriceTable::new(self.published_prices)?;
        Ok((MemoryStore::new(self.monthly, self.daily), table))
    }
}

/// A snapshot stored as pretty-printed JSON at a fixed path.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Snapshot, StoreError> {
        let text = fs::read_to_string(&self.path)?;
        let snapshot: Snapshot = serde_json::from_str(&text)?;
        info!(
            path = %self.path.display(),
            monthly = snapshot.monthly.len(),
            daily = snapshot.daily.len(),
            prices = snapshot.published_prices.len(),
            "loaded snapshot"
        );
        Ok(snapshot)
    }

    pub fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(snapshot)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pricing_core::YearMonth;
    use rust_decimal::Decimal;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("po-pricing-{}-{name}", std::process::id()))
    }

    #[test]
    fn save_then_load() {
        let snapshot = Snapshot {
            monthly: vec![MonthlyRecord::new("Tower", 2025, 6).with("total_po_seats", 10)],
            daily: vec![DailyOccupancyRecord::new("Tower", NaiveDate::from_ymd_opt(2025, 6, 30).unwrap())
                .with("po_seats_occupied_actual_pct", "75%")],
            published_prices: vec![PublishedPrice {
                building_name: "Tower".to_string(),
                valid_from: YearMonth::new(2025, 1).unwrap(),
                valid_to: None,
                price: Decimal::new(2_500_000, 0),
            }],
        };
        let store = JsonFileStore::new(temp_path("snapshot.json"));
        store.save(&snapshot).unwrap();
        assert_eq!(store.load().unwrap(), snapshot);
        fs::remove_file(store.path()).unwrap();
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let snapshot: Snapshot = serde_json::from_str(r#"{"monthly": []}"#).unwrap();
        let (store, table) = snapshot.into_parts().unwrap();
        assert!(store.monthly().is_empty());
        assert!(table.is_empty());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = JsonFileStore::new(temp_path("absent.json")).load().unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
    }

    #[test]
    fn sample_asset_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets/sample_data.json");
        let (store, table) = JsonFileStore::new(path).load().unwrap().into_parts().unwrap();
        assert!(!store.monthly().is_empty());
        assert!(!store.daily().is_empty());
        assert!(!table.is_empty());
    }
}
