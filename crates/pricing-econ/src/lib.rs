#![deny(warnings)]

//! Pricing economics: rule resolution, smart breakeven targets and the
//! four-stage seat price calculation.
//!
//! The stages are pure arithmetic over [`rust_decimal::Decimal`]:
//! 1. breakeven price at the target occupancy,
//! 2. occupancy-tier multiplier,
//! 3. margin of safety,
//! 4. rounding to the price step and clamping to the configured bounds.

pub mod calculator;
pub mod engine;
pub mod rules;
pub mod smart_target;

pub use calculator::calculate;
pub use engine::PricingEngine;
pub use rules::{resolve_rules, target_breakeven_occupancy};
pub use smart_target::{improvement_multiplier, smart_target};

use pricing_core::ConfigError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors produced while pricing a single location.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// Seat count is zero or the target occupancy is not positive.
    #[error("location '{location}': seats and target occupancy must be positive (seats: {seats}, target: {target_pct}%)")]
    InvalidPreconditions {
        location: String,
        seats: u32,
        target_pct: Decimal,
    },
    /// Rule resolution failed for the location.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Decimal arithmetic left the representable range.
    #[error("location '{0}': arithmetic overflow")]
    Overflow(String),
}
