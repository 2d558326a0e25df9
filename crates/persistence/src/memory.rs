use crate::{matches_location, RecordSource, StoreError};
use chrono::NaiveDate;
use pricing_core::{normalize_location, DailyOccupancyRecord, MonthlyRecord};

/// Vec-backed store. Also the landing type for [`crate::SqliteStore::snapshot`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemoryStore {
    monthly: Vec<MonthlyRecord>,
    daily: Vec<DailyOccupancyRecord>,
}

impl MemoryStore {
    pub fn new(monthly: Vec<MonthlyRecord>, daily: Vec<DailyOccupancyRecord>) -> Self {
        Self { monthly, daily }
    }

    pub fn monthly(&self) -> &[MonthlyRecord] {
        &self.monthly
    }

    pub fn daily(&self) -> &[DailyOccupancyRecord] {
        &self.daily
    }

    /// Insert `record`, replacing any row for the same building and month.
    pub fn upsert_monthly(&mut self, record: MonthlyRecord) {
        let key = normalize_location(&record.building_name);
        match self
            .monthly
            .iter_mut()
            .find(|r| r.period() == record.period() && normalize_location(&r.building_name) == key)
        {
            Some(slot) => *slot = record,
            None => self.monthly.push(record),
        }
    }

    /// Insert `record`, replacing any row for the same building and date.
    pub fn upsert_daily(&mut self, record: DailyOccupancyRecord) {
        let key = normalize_location(&record.building_name);
        match self
            .daily
            .iter_mut()
            .find(|r| r.date == record.date && normalize_location(&r.building_name) == key)
        {
            Some(slot) => *slot = record,
            None => self.daily.push(record),
        }
    }
}

impl RecordSource for MemoryStore {
    fn monthly_records(&self, location: Option<&str>) -> Result<Vec<MonthlyRecord>, StoreError> {
        Ok(self
            .monthly
            .iter()
            .filter(|r| matches_location(&r.building_name, location))
            .cloned()
            .collect())
    }

    fn daily_records(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        location: Option<&str>,
    ) -> Result<Vec<DailyOccupancyRecord>, StoreError> {
        Ok(self
            .daily
            .iter()
            .filter(|r| r.date >= from && r.date < to && matches_location(&r.building_name, location))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    #[test]
    fn upsert_replaces_same_key() {
        let mut store = MemoryStore::default();
        store.upsert_monthly(MonthlyRecord::new("Tower", 2025, 6).with("total_po_seats", 10));
        store.upsert_monthly(MonthlyRecord::new("tower", 2025, 6).with("total_po_seats", 20));
        store.upsert_monthly(MonthlyRecord::new("Tower", 2025, 7).with("total_po_seats", 30));
        assert_eq!(store.monthly().len(), 2);
        assert_eq!(store.monthly()[0].get("total_po_seats"), &serde_json::json!(20));

        store.upsert_daily(DailyOccupancyRecord::new("Tower", day(1)).with("po_seats_occupied_actual_pct", 50));
        store.upsert_daily(DailyOccupancyRecord::new("Tower", day(1)).with("po_seats_occupied_actual_pct", 60));
        assert_eq!(store.daily().len(), 1);
    }

    #[test]
    fn daily_range_is_half_open() {
        let store = MemoryStore::new(
            vec![],
            (1..=10).map(|d| DailyOccupancyRecord::new("Tower", day(d))).collect(),
        );
        let rows = store.daily_records(day(3), day(6), None).unwrap();
        let dates: Vec<NaiveDate> = rows.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![day(3), day(4), day(5)]);
        assert!(store.daily_records(day(3), day(6), Some("Elsewhere")).unwrap().is_empty());
    }

    #[test]
    fn monthly_filter_by_location() {
        let store = MemoryStore::new(
            vec![MonthlyRecord::new("A Tower", 2025, 6), MonthlyRecord::new("B Tower", 2025, 6)],
            vec![],
        );
        assert_eq!(store.monthly_records(None).unwrap().len(), 2);
        let only_a = store.monthly_records(Some("a tower")).unwrap();
        assert_eq!(only_a.len(), 1);
        assert_eq!(only_a[0].building_name, "A Tower");
    }
}
