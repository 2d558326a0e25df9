//! Pricing engine: a configured service object tying rules, targets and the
//! calculator together.

use crate::calculator::{actual_breakeven_pct, calculate};
use crate::rules::{resolve_rules, target_breakeven_occupancy};
use crate::PricingError;
use pricing_core::{BreakevenTarget, ConfigError, LocationData, PricingConfig, PricingResult, PricingRules};
use tracing::debug;

/// Owns a validated [`PricingConfig`]. Stateless between calls.
#[derive(Clone, Debug)]
pub struct PricingEngine {
    config: PricingConfig,
}

impl PricingEngine {
    /// Validate `config` and wrap it.
    pub fn new(config: PricingConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    pub fn rules_for(&self, location: &str) -> Result<PricingRules, ConfigError> {
        resolve_rules(location, &self.config)
    }

    /// Breakeven target for `data`, smart when enabled and derivable.
    pub fn target_for(&self, data: &LocationData) -> Result<BreakevenTarget, ConfigError> {
        let actual = actual_breakeven_pct(data.avg_expense_amount, data.sold_price_per_seat, data.total_po_seats);
        target_breakeven_occupancy(&data.name, &self.config, actual, Some(data.occupancy_pct))
    }

    /// Resolve rules and target, then run the calculator.
    pub fn price(&self, data: &LocationData) -> Result<PricingResult, PricingError> {
        let rules = self.rules_for(&data.name)?;
        let target = self.target_for(data)?;
        let result = calculate(data, &rules, target)?;
        debug!(
            location = %data.name,
            price = %result.final_price,
            target = %result.target_breakeven_pct,
            smart = result.is_smart_target,
            "priced location"
        );
        Ok(result)
    }
}
