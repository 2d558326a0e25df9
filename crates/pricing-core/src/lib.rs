#![deny(warnings)]

//! Core domain models for private-office seat pricing.
//!
//! This crate defines the serializable types shared by the pricing engine,
//! the aggregation pipeline and the service layer, together with the typed
//! pricing configuration, source record shapes and tolerant parsing helpers.
//!
//! All occupancy values are percentages on the 0-100 scale and all money is
//! carried as [`Decimal`].

pub mod config;
pub mod parse;
pub mod period;
pub mod records;

pub use config::{ConfigError, LocationOverrides, PricingConfig};
pub use period::{PricingPeriod, YearMonth};
pub use records::{DailyOccupancyRecord, MonthlyRecord};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Granularity of seat prices: every rounded price is a multiple of this.
pub const PRICE_STEP: i64 = 50_000;

/// Static breakeven target used when a location configures none.
pub const DEFAULT_TARGET_BREAKEVEN_PCT: i64 = 70;

/// Margin of safety used when the configuration sets no global value (0.5).
pub fn default_margin_of_safety() -> Decimal {
    Decimal::new(5, 1)
}

/// Normalize a building name for matching: trimmed, lower-cased, with `-`
/// treated as a space (chat commands and URLs use hyphenated names).
pub fn normalize_location(name: &str) -> String {
    name.replace('-', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Derived inputs for one location's price calculation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocationData {
    /// Building name as it appears in the source data.
    pub name: String,
    /// Absolute private-office expense for the target month.
    pub expense_amount: Decimal,
    /// Absolute expense averaged over the trailing months.
    pub avg_expense_amount: Decimal,
    /// Current (daily-average) occupancy percentage.
    pub occupancy_pct: Decimal,
    /// Legacy monthly occupancy percentage, when the source reports one.
    pub monthly_occupancy_pct: Option<Decimal>,
    /// Total private-office seats (> 0 for a valid calculation).
    pub total_po_seats: u32,
    /// Externally published price for the period.
    pub published_price: Option<Decimal>,
    /// Actual sold price per seat.
    pub sold_price_per_seat: Option<Decimal>,
}

/// Occupancy band `(min_occupancy, max_occupancy]` mapped to a price multiplier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DynamicPricingTier {
    /// Exclusive lower bound, percent.
    pub min_occupancy: Decimal,
    /// Inclusive upper bound, percent.
    pub max_occupancy: Decimal,
    /// Dimensionless multiplier, typically 0.8-1.2.
    pub multiplier: Decimal,
}

impl DynamicPricingTier {
    /// Whether `occupancy_pct` falls in this tier.
    pub fn contains(&self, occupancy_pct: Decimal) -> bool {
        self.min_occupancy < occupancy_pct && occupancy_pct <= self.max_occupancy
    }
}

/// Resolved pricing policy for one location.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricingRules {
    /// Lower price bound; `None` is unbounded.
    pub min_price: Option<Decimal>,
    /// Upper price bound; `None` is unbounded.
    pub max_price: Option<Decimal>,
    /// Fractional surcharge on the tier-adjusted price (0.5 = +50%).
    pub margin_of_safety: Decimal,
    /// Tiers in evaluation order.
    pub dynamic_pricing_tiers: Vec<DynamicPricingTier>,
    /// Whether the data-driven breakeven target applies.
    pub use_smart_target: bool,
}

/// Breakeven occupancy goal handed to the calculator.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BreakevenTarget {
    /// Target breakeven occupancy, percent.
    pub pct: Decimal,
    /// True when derived from actual performance rather than configuration.
    pub is_smart: bool,
}

impl BreakevenTarget {
    pub fn fixed(pct: Decimal) -> Self {
        Self { pct, is_smart: false }
    }

    pub fn smart(pct: Decimal) -> Self {
        Self { pct, is_smart: true }
    }
}

/// Whether a location covers its costs at current occupancy.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfitStatus {
    /// Occupancy is below the actual breakeven occupancy.
    Losing,
    /// Occupancy is at or above the actual breakeven occupancy.
    Profitable,
    /// No sold price is known, so actual breakeven cannot be computed.
    Indeterminate,
}

impl ProfitStatus {
    /// Classify `occupancy_pct` against an optional actual breakeven.
    pub fn classify(occupancy_pct: Decimal, actual_breakeven_pct: Option<Decimal>) -> Self {
        match actual_breakeven_pct {
            Some(breakeven) if occupancy_pct < breakeven => ProfitStatus::Losing,
            Some(_) => ProfitStatus::Profitable,
            None => ProfitStatus::Indeterminate,
        }
    }

    /// Collapsed boolean view: only [`ProfitStatus::Losing`] is `true`.
    pub fn is_losing(self) -> bool {
        matches!(self, ProfitStatus::Losing)
    }
}

/// Output of one price calculation, with every intermediate stage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricingResult {
    /// Location name.
    pub location: String,
    /// Recommended price; equal to `final_price`.
    pub recommended_price: Decimal,
    /// Occupancy used for tier selection, percent.
    pub occupancy_pct: Decimal,
    /// Breakeven occupancy the price was derived from, percent.
    pub target_breakeven_pct: Decimal,
    /// Breakeven occupancy implied by the actual sold price, percent.
    pub actual_breakeven_pct: Option<Decimal>,
    /// Three-state profitability.
    pub profit_status: ProfitStatus,
    /// `true` only when `profit_status` is losing.
    pub losing_money: bool,
    /// Unrounded breakeven price.
    pub raw_breakeven_price: Decimal,
    /// Breakeven price rounded up to the price step (the bottom price).
    pub breakeven_price: Decimal,
    /// Breakeven price after the tier multiplier.
    pub base_price: Decimal,
    /// Base price after the margin of safety.
    pub price_with_margin: Decimal,
    /// Rounded and clamped price.
    pub final_price: Decimal,
    /// Tier multiplier that was applied.
    pub dynamic_multiplier: Decimal,
    /// Whether the smart target was used.
    pub is_smart_target: bool,
}
