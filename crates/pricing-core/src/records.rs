//! Row shapes yielded by the analytics data provider.
//!
//! Rows keep their measure columns as raw JSON cells; the aggregation
//! pipeline coerces them with [`crate::parse`].

use crate::period::YearMonth;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Monthly private-office expense column.
pub const EXPENSE_COLUMN: &str = "exp_total_po_expense_amount";
/// Total private-office seat count column.
pub const TOTAL_SEATS_COLUMN: &str = "total_po_seats";
/// Actual sold price per seat column.
pub const SOLD_PRICE_COLUMN: &str = "sold_price_per_po_seat_actual";
/// Legacy monthly occupancy column.
pub const MONTHLY_OCCUPANCY_COLUMN: &str = "po_seats_occupied_pct";
/// Occupancy column carried by daily records.
pub const DAILY_OCCUPANCY_COLUMN: &str = "po_seats_occupied_actual_pct";
/// Occupancy columns tried, in order, when no daily records exist.
pub const OCCUPANCY_FALLBACK_COLUMNS: [&str; 3] = [
    "po_seats_occupied_actual_pct",
    "po_seats_actual_occupied_pct",
    "po_seats_occupied_pct",
];

static NULL: Value = Value::Null;

/// One building's figures for one month.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRecord {
    pub building_name: String,
    pub year: i32,
    pub month: u32,
    #[serde(flatten)]
    pub columns: BTreeMap<String, Value>,
}

impl MonthlyRecord {
    pub fn new(building_name: impl Into<String>, year: i32, month: u32) -> Self {
        Self {
            building_name: building_name.into(),
            year,
            month,
            columns: BTreeMap::new(),
        }
    }

    /// Builder-style column setter.
    pub fn with(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.columns.insert(column.to_string(), value.into());
        self
    }

    /// Cell for `column`, or null when absent.
    pub fn get(&self, column: &str) -> &Value {
        self.columns.get(column).unwrap_or(&NULL)
    }

    pub fn period(&self) -> YearMonth {
        YearMonth {
            year: self.year,
            month: self.month,
        }
    }
}

/// One building's occupancy snapshot for one day.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DailyOccupancyRecord {
    pub building_name: String,
    pub date: NaiveDate,
    #[serde(flatten)]
    pub columns: BTreeMap<String, Value>,
}

impl DailyOccupancyRecord {
    pub fn new(building_name: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            building_name: building_name.into(),
            date,
            columns: BTreeMap::new(),
        }
    }

    pub fn with(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.columns.insert(column.to_string(), value.into());
        self
    }

    /// Raw occupancy cell.
    pub fn occupancy(&self) -> &Value {
        self.columns.get(DAILY_OCCUPANCY_COLUMN).unwrap_or(&NULL)
    }
}
