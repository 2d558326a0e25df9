#![deny(warnings)]

//! Aggregation of source rows into per-location pricing inputs.
//!
//! For each location with a row in the target month this selects a
//! representative occupancy (the recent daily average, falling back through
//! the monthly occupancy columns) and averages the absolute expense of up to
//! three preceding months.

use chrono::NaiveDate;
use pricing_core::parse::{parse_decimal_abs, parse_int, try_parse_decimal, try_parse_pct};
use pricing_core::records::{
    EXPENSE_COLUMN, MONTHLY_OCCUPANCY_COLUMN, OCCUPANCY_FALLBACK_COLUMNS, SOLD_PRICE_COLUMN, TOTAL_SEATS_COLUMN,
};
use pricing_core::{normalize_location, DailyOccupancyRecord, LocationData, MonthlyRecord, PricingPeriod, YearMonth};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::{debug, info, warn};

/// Months of history averaged for the expense figure.
pub const EXPENSE_HISTORY_MONTHS: usize = 3;

/// Where a location's occupancy figure came from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OccupancySource {
    /// Mean of daily records over `days` distinct dates.
    DailyAverage { days: usize },
    /// A single monthly column.
    MonthlyColumn { column: String },
}

impl fmt::Display for OccupancySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OccupancySource::DailyAverage { days } => write!(f, "{days}-day average"),
            OccupancySource::MonthlyColumn { column } => write!(f, "monthly {column}"),
        }
    }
}

/// Pricing inputs for one location plus their provenance.
#[derive(Clone, Debug, PartialEq)]
pub struct LocationInput {
    pub data: LocationData,
    pub occupancy_source: OccupancySource,
    /// Historical months behind `avg_expense_amount` (0 = current month only).
    pub expense_months: usize,
}

/// Why a location was left out of a run.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    EmptyName,
    Holding,
    ZeroSeats,
    NoOccupancy,
    /// Summing the location's figures left the decimal range.
    Overflow,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::EmptyName => "empty building name",
            SkipReason::Holding => "holding entity",
            SkipReason::ZeroSeats => "zero private-office seats",
            SkipReason::NoOccupancy => "no parseable occupancy",
            SkipReason::Overflow => "figures overflow decimal arithmetic",
        };
        f.write_str(text)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedLocation {
    pub name: String,
    pub reason: SkipReason,
}

/// Result of [`aggregate`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Aggregation {
    /// Inputs sorted by building name.
    pub inputs: Vec<LocationInput>,
    pub skipped: Vec<SkippedLocation>,
}

/// Mean daily occupancy and the number of distinct dates behind it.
///
/// Unparseable entries are skipped with a warning. `Ok(None)` when nothing
/// parses.
pub fn average_daily_occupancy(
    location: &str,
    records: &[&DailyOccupancyRecord],
) -> Result<Option<(Decimal, usize)>, SkipReason> {
    let mut sum = Decimal::ZERO;
    let mut count = 0u32;
    let mut dates: BTreeSet<NaiveDate> = BTreeSet::new();
    for rec in records {
        match try_parse_pct(rec.occupancy()) {
            Some(pct) => {
                sum = sum.checked_add(pct).ok_or(SkipReason::Overflow)?;
                count += 1;
                dates.insert(rec.date);
            }
            None => warn!(location, date = %rec.date, value = %rec.occupancy(), "skipping unparseable daily occupancy"),
        }
    }
    if count == 0 {
        return Ok(None);
    }
    Ok(Some((sum / Decimal::from(count), dates.len())))
}

/// First parseable occupancy column of a monthly row, in preference order.
pub fn monthly_occupancy(row: &MonthlyRecord) -> Option<(Decimal, &'static str)> {
    OCCUPANCY_FALLBACK_COLUMNS
        .iter()
        .find_map(|col| try_parse_pct(row.get(col)).map(|pct| (pct, *col)))
}

/// Daily average when any daily record parses, else the monthly fallback.
pub fn select_occupancy(
    row: &MonthlyRecord,
    daily: &[&DailyOccupancyRecord],
) -> Result<(Decimal, OccupancySource), SkipReason> {
    if let Some((pct, days)) = average_daily_occupancy(row.building_name.trim(), daily)? {
        return Ok((pct, OccupancySource::DailyAverage { days }));
    }
    monthly_occupancy(row)
        .map(|(pct, column)| {
            (
                pct,
                OccupancySource::MonthlyColumn {
                    column: column.to_string(),
                },
            )
        })
        .ok_or(SkipReason::NoOccupancy)
}

/// Mean absolute expense over the most recent months strictly before `target`.
///
/// Uses up to [`EXPENSE_HISTORY_MONTHS`] months, one row per month (first
/// occurrence wins). `Ok(None)` without any history.
pub fn trailing_expense(history: &[&MonthlyRecord], target: YearMonth) -> Result<Option<(Decimal, usize)>, SkipReason> {
    let mut by_month: BTreeMap<YearMonth, &MonthlyRecord> = BTreeMap::new();
    for rec in history.iter().filter(|r| r.period() < target) {
        by_month.entry(rec.period()).or_insert(rec);
    }
    let recent: Vec<Decimal> = by_month
        .values()
        .rev()
        .take(EXPENSE_HISTORY_MONTHS)
        .map(|r| parse_decimal_abs(r.get(EXPENSE_COLUMN), Decimal::ZERO))
        .collect();
    if recent.is_empty() {
        return Ok(None);
    }
    let total = recent
        .iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(*v))
        .ok_or(SkipReason::Overflow)?;
    Ok(Some((total / Decimal::from(recent.len() as u64), recent.len())))
}

/// Build pricing inputs for every location with a row in `period`'s month.
///
/// `daily` may contain any dates; only those inside the period's daily
/// window are used. Locations are deduplicated by normalized name.
pub fn aggregate(monthly: &[MonthlyRecord], daily: &[DailyOccupancyRecord], period: &PricingPeriod) -> Aggregation {
    let mut history: BTreeMap<String, Vec<&MonthlyRecord>> = BTreeMap::new();
    for rec in monthly {
        history.entry(normalize_location(&rec.building_name)).or_default().push(rec);
    }
    let (from, to) = period.daily_window();
    let mut recent_daily: BTreeMap<String, Vec<&DailyOccupancyRecord>> = BTreeMap::new();
    for rec in daily.iter().filter(|r| r.date >= from && r.date < to) {
        recent_daily.entry(normalize_location(&rec.building_name)).or_default().push(rec);
    }

    let mut out = Aggregation::default();
    let mut seen: BTreeSet<String> = BTreeSet::new();
    for row in monthly.iter().filter(|r| r.period() == period.month) {
        let name = row.building_name.trim();
        let key = normalize_location(name);
        if !seen.insert(key.clone()) {
            debug!(location = name, "duplicate location row ignored");
            continue;
        }
        match build_input(row, &history[&key], recent_daily.get(&key).map(Vec::as_slice).unwrap_or(&[]), period) {
            Ok(input) => out.inputs.push(input),
            Err(reason) => {
                warn!(location = name, %reason, "skipping location");
                out.skipped.push(SkippedLocation {
                    name: name.to_string(),
                    reason,
                });
            }
        }
    }
    out.inputs.sort_by(|a, b| a.data.name.cmp(&b.data.name));
    info!(
        month = %period.month,
        locations = out.inputs.len(),
        skipped = out.skipped.len(),
        "aggregated pricing inputs"
    );
    out
}

fn build_input(
    row: &MonthlyRecord,
    history: &[&MonthlyRecord],
    daily: &[&DailyOccupancyRecord],
    period: &PricingPeriod,
) -> Result<LocationInput, SkipReason> {
    let name = row.building_name.trim();
    if name.is_empty() {
        return Err(SkipReason::EmptyName);
    }
    if name.eq_ignore_ascii_case("holding") {
        return Err(SkipReason::Holding);
    }
    let seats = u32::try_from(parse_int(row.get(TOTAL_SEATS_COLUMN), 0))
        .ok()
        .filter(|s| *s > 0)
        .ok_or(SkipReason::ZeroSeats)?;
    let (occupancy_pct, occupancy_source) = select_occupancy(row, daily)?;

    let expense_amount = parse_decimal_abs(row.get(EXPENSE_COLUMN), Decimal::ZERO);
    let (avg_expense_amount, expense_months) =
        trailing_expense(history, period.month)?.unwrap_or((expense_amount, 0));

    Ok(LocationInput {
        data: LocationData {
            name: name.to_string(),
            expense_amount,
            avg_expense_amount,
            occupancy_pct,
            monthly_occupancy_pct: try_parse_pct(row.get(MONTHLY_OCCUPANCY_COLUMN)),
            total_po_seats: seats,
            published_price: None,
            sold_price_per_seat: try_parse_decimal(row.get(SOLD_PRICE_COLUMN)),
        },
        occupancy_source,
        expense_months,
    })
}
