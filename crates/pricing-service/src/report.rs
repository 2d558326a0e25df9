use data_pipeline::{OccupancySource, SkippedLocation};
use pricing_core::{PricingPeriod, PricingResult, YearMonth};
use rust_decimal::Decimal;
use serde::Serialize;

/// One priced location, ready for JSON or text rendering.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PricingReport {
    pub period: YearMonth,
    #[serde(flatten)]
    pub result: PricingResult,
    pub occupancy_source: OccupancySource,
    pub expense_amount: Decimal,
    pub avg_expense_amount: Decimal,
    pub expense_months: usize,
    pub total_po_seats: u32,
    pub monthly_occupancy_pct: Option<Decimal>,
    pub sold_price_per_seat: Option<Decimal>,
    pub published_price: Option<Decimal>,
    pub published_valid_from: Option<YearMonth>,
    pub reasoning: Option<String>,
}

impl PricingReport {
    pub fn building_name(&self) -> &str {
        &self.result.location
    }
}

/// A location whose calculation failed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LocationFailure {
    pub location: String,
    pub error: String,
}

/// Outcome of a batch run. Failures never abort the batch.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PricingRun {
    pub period: PricingPeriod,
    pub reports: Vec<PricingReport>,
    pub skipped: Vec<SkippedLocation>,
    pub failures: Vec<LocationFailure>,
}
