//! Published list prices by building and validity range.

use crate::StoreError;
use pricing_core::{normalize_location, YearMonth};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

/// A list price valid from `valid_from` through `valid_to` (inclusive), or
/// indefinitely when `valid_to` is absent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PublishedPrice {
    pub building_name: String,
    pub valid_from: YearMonth,
    #[serde(default)]
    pub valid_to: Option<YearMonth>,
    pub price: Decimal,
}

impl PublishedPrice {
    pub fn covers(&self, period: YearMonth) -> bool {
        self.valid_from <= period && self.valid_to.map_or(true, |end| period <= end)
    }

    fn validate(&self) -> Result<(), StoreError> {
        if self.price < Decimal::ZERO {
            return Err(StoreError::InvalidRecord(format!(
                "published price for '{}' is negative: {}",
                self.building_name, self.price
            )));
        }
        if let Some(end) = self.valid_to {
            if end < self.valid_from {
                return Err(StoreError::InvalidRecord(format!(
                    "published price for '{}' ends ({end}) before it starts ({})",
                    self.building_name, self.valid_from
                )));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PublishedPriceTable {
    entries: Vec<PublishedPrice>,
}

impl PublishedPriceTable {
    pub fn new(entries: Vec<PublishedPrice>) -> Result<Self, StoreError> {
        let mut table = Self::default();
        for entry in entries {
            table.insert(entry)?;
        }
        Ok(table)
    }

    pub fn insert(&mut self, entry: PublishedPrice) -> Result<(), StoreError> {
        entry.validate()?;
        self.entries.push(entry);
        Ok(())
    }

    pub fn entries(&self) -> &[PublishedPrice] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Price in force for `building` in `period`.
    ///
    /// Among overlapping ranges the narrowest wins, bounded ranges before
    /// open-ended ones; equal widths go to the later start.
    pub fn lookup(&self, building: &str, period: YearMonth) -> Option<Decimal> {
        self.lookup_entry(building, period).map(|e| e.price)
    }

    /// Entry behind [`PublishedPriceTable::lookup`].
    pub fn lookup_entry(&self, building: &str, period: YearMonth) -> Option<&PublishedPrice> {
        let key = normalize_location(building);
        self.entries
            .iter()
            .filter(|e| e.covers(period) && normalize_location(&e.building_name) == key)
            .min_by_key(|e| {
                let span = e.valid_to.map(|end| e.valid_from.months_until(end));
                (span.is_none(), span.unwrap_or(0), Reverse(e.valid_from))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ym(year: i32, month: u32) -> YearMonth {
        YearMonth::new(year, month).unwrap()
    }

    fn entry(from: YearMonth, to: Option<YearMonth>, price: i64) -> PublishedPrice {
        PublishedPrice {
            building_name: "Pacific Place".to_string(),
            valid_from: from,
            valid_to: to,
            price: Decimal::new(price, 0),
        }
    }

    #[test]
    fn narrowest_range_wins() {
        let table = PublishedPriceTable::new(vec![
            entry(ym(2024, 1), None, 3_000_000),
            entry(ym(2025, 1), Some(ym(2025, 12)), 3_500_000),
            entry(ym(2025, 6), Some(ym(2025, 6)), 3_200_000),
        ])
        .unwrap();
        assert_eq!(table.lookup("Pacific Place", ym(2025, 6)), Some(Decimal::new(3_200_000, 0)));
        assert_eq!(table.lookup("pacific place", ym(2025, 7)), Some(Decimal::new(3_500_000, 0)));
        assert_eq!(table.lookup("Pacific Place", ym(2026, 1)), Some(Decimal::new(3_000_000, 0)));
        assert_eq!(table.lookup("Pacific Place", ym(2023, 12)), None);
        assert_eq!(table.lookup("Menara Astra", ym(2025, 6)), None);
    }

    #[test]
    fn later_start_breaks_ties() {
        let table = PublishedPriceTable::new(vec![
            entry(ym(2024, 1), None, 1_000_000),
            entry(ym(2025, 1), None, 2_000_000),
        ])
        .unwrap();
        assert_eq!(table.lookup("Pacific Place", ym(2025, 3)), Some(Decimal::new(2_000_000, 0)));
        assert_eq!(table.lookup("Pacific Place", ym(2024, 3)), Some(Decimal::new(1_000_000, 0)));
    }

    #[test]
    fn rejects_inverted_or_negative_entries() {
        assert!(PublishedPriceTable::new(vec![entry(ym(2025, 6), Some(ym(2025, 1)), 1)]).is_err());
        assert!(PublishedPriceTable::new(vec![entry(ym(2025, 6), None, -1)]).is_err());
    }
}
