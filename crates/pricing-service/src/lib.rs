#![deny(warnings)]

//! Pricing service: wires a record source, the pricing engine, published
//! prices and a reasoning generator into batch and single-location runs.

pub mod command;
pub mod format;
mod report;

pub use command::{parse_po_price_command, CommandError, PoPriceCommand};
pub use format::{format_chat, format_cli};
pub use report::{LocationFailure, PricingReport, PricingRun};

use chrono::NaiveDate;
use data_pipeline::{aggregate, LocationInput};
use persistence::{PublishedPriceTable, RecordSource, StoreError};
use pricing_core::{ConfigError, PricingConfig, PricingPeriod, PricingResult, YearMonth};
use pricing_econ::PricingEngine;
use reasoning::{is_available, ReasoningContext, ReasoningGenerator};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Location '{location}' not found for {year}-{month:02}")]
    NotFound { location: String, year: i32, month: u32 },
    #[error("No pricing results found for {year}-{month:02}")]
    NoResults { year: i32, month: u32 },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub struct PricingService<S, R> {
    engine: PricingEngine,
    source: S,
    published: PublishedPriceTable,
    reasoner: R,
}

impl<S: RecordSource, R: ReasoningGenerator> PricingService<S, R> {
    /// Validates `config` up front; every later run reuses it.
    pub fn new(
        config: PricingConfig,
        source: S,
        published: PublishedPriceTable,
        reasoner: R,
    ) -> Result<Self, ServiceError> {
        Ok(Self {
            engine: PricingEngine::new(config)?,
            source,
            published,
            reasoner,
        })
    }

    pub fn engine(&self) -> &PricingEngine {
        &self.engine
    }

    /// Price every location (or just `location`) with data for `period`.
    ///
    /// Reasoning is only requested when `verbose` is set.
    pub fn run(
        &self,
        period: &PricingPeriod,
        location: Option<&str>,
        verbose: bool,
    ) -> Result<PricingRun, ServiceError> {
        let monthly = self.source.monthly_records(location)?;
        let (from, to) = period.daily_window();
        let daily = self.source.daily_records(from, to, location)?;
        let aggregation = aggregate(&monthly, &daily, period);

        let mut reports = Vec::with_capacity(aggregation.inputs.len());
        let mut failures = Vec::new();
        for input in aggregation.inputs {
            let name = input.data.name.clone();
            match self.price_input(input, period.month, verbose) {
                Ok(report) => reports.push(report),
                Err(err) => {
                    warn!(location = %name, error = %err, "pricing failed; skipping location");
                    failures.push(LocationFailure {
                        location: name,
                        error: err.to_string(),
                    });
                }
            }
        }
        info!(
            month = %period.month,
            target_date = %period.target_date,
            priced = reports.len(),
            skipped = aggregation.skipped.len(),
            failed = failures.len(),
            "pricing run complete"
        );
        Ok(PricingRun {
            period: *period,
            reports,
            skipped: aggregation.skipped,
            failures,
        })
    }

    fn price_input(
        &self,
        input: LocationInput,
        month: YearMonth,
        verbose: bool,
    ) -> Result<PricingReport, pricing_econ::PricingError> {
        let LocationInput {
            mut data,
            occupancy_source,
            expense_months,
        } = input;
        let published = self.published.lookup_entry(&data.name, month);
        data.published_price = published.map(|p| p.price);
        let result = self.engine.price(&data)?;
        let reasoning = if verbose { self.reasoning_for(&result, data.published_price) } else { None };
        Ok(PricingReport {
            period: month,
            result,
            occupancy_source,
            expense_amount: data.expense_amount,
            avg_expense_amount: data.avg_expense_amount,
            expense_months,
            total_po_seats: data.total_po_seats,
            monthly_occupancy_pct: data.monthly_occupancy_pct,
            sold_price_per_seat: data.sold_price_per_seat,
            published_price: data.published_price,
            published_valid_from: published.map(|p| p.valid_from),
            reasoning,
        })
    }

    fn reasoning_for(&self, result: &PricingResult, published_price: Option<rust_decimal::Decimal>) -> Option<String> {
        let context = ReasoningContext {
            location: result.location.clone(),
            recommended_price: result.recommended_price,
            occupancy_pct: result.occupancy_pct,
            breakeven_occupancy_pct: result.target_breakeven_pct,
            published_price,
        };
        let text = self.reasoner.generate(&context);
        if is_available(&text) {
            Some(text)
        } else {
            debug!(location = %result.location, "dropping unavailable reasoning");
            None
        }
    }

    /// Report for one location, or [`ServiceError::NotFound`].
    pub fn price_location(&self, location: &str, period: &PricingPeriod) -> Result<PricingReport, ServiceError> {
        self.run(period, Some(location), false)?
            .reports
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::NotFound {
                location: location.to_string(),
                year: period.month.year,
                month: period.month.month,
            })
    }

    /// Reports for every location, or [`ServiceError::NoResults`] when none priced.
    pub fn price_all(&self, period: &PricingPeriod) -> Result<Vec<PricingReport>, ServiceError> {
        let reports = self.run(period, None, false)?.reports;
        if reports.is_empty() {
            return Err(ServiceError::NoResults {
                year: period.month.year,
                month: period.month.month,
            });
        }
        Ok(reports)
    }

    /// Reply text for a chat message. Without an explicit month the month
    /// containing `today` is priced.
    pub fn handle_chat_message(&self, text: &str, today: NaiveDate) -> String {
        let command = match parse_po_price_command(text) {
            Ok(command) => command,
            Err(err) => return format!("**Error:** {err}"),
        };
        let month = command.period.unwrap_or_else(|| YearMonth::of(today));
        let Some(period) = PricingPeriod::for_month(month.year, month.month) else {
            return format!("**Error:** {}", CommandError::InvalidMonth);
        };
        match self.price_location(&command.location, &period) {
            Ok(report) => format_chat(&report),
            Err(err @ ServiceError::NotFound { .. }) => format!("**Error:** {err}"),
            Err(err) => {
                warn!(location = %command.location, error = %err, "chat pricing failed");
                format!("**Unexpected error:** {err}")
            }
        }
    }
}
