//! Data-driven breakeven targets.
//!
//! A smart target is always an improvement goal: a fixed fraction of the
//! location's actual breakeven occupancy. Profitable locations with more
//! headroom get a deeper cut; losing locations get a deeper cut the wider
//! their loss gap.

use rust_decimal::Decimal;
use thiserror::Error;

/// Inputs the smart target cannot be derived from.
#[derive(Debug, Error, PartialEq)]
pub enum SmartTargetError {
    #[error("actual breakeven occupancy must be positive, got {0}")]
    NonPositiveBreakeven(Decimal),
    #[error("current occupancy must be non-negative, got {0}")]
    NegativeOccupancy(Decimal),
}

/// Step function from profitability state to target multiplier.
///
/// Thresholds are inclusive: a value on a cutoff belongs to the lower bucket.
pub fn improvement_multiplier(actual_breakeven_pct: Decimal, current_occupancy_pct: Decimal) -> Decimal {
    let fifty = Decimal::new(50, 0);
    let seventy = Decimal::new(70, 0);
    let fifteen = Decimal::new(15, 0);
    let twenty_five = Decimal::new(25, 0);

    if current_occupancy_pct >= actual_breakeven_pct {
        if actual_breakeven_pct <= fifty {
            Decimal::new(97, 2)
        } else if actual_breakeven_pct <= seventy {
            Decimal::new(95, 2)
        } else {
            Decimal::new(93, 2)
        }
    } else {
        let gap = actual_breakeven_pct - current_occupancy_pct;
        if gap <= fifteen {
            Decimal::new(97, 2)
        } else if gap <= twenty_five {
            Decimal::new(94, 2)
        } else {
            Decimal::new(90, 2)
        }
    }
}

/// Smart breakeven target, percent. Strictly below `actual_breakeven_pct`.
pub fn smart_target(
    actual_breakeven_pct: Decimal,
    current_occupancy_pct: Decimal,
) -> Result<Decimal, SmartTargetError> {
    if actual_breakeven_pct <= Decimal::ZERO {
        return Err(SmartTargetError::NonPositiveBreakeven(actual_breakeven_pct));
    }
    if current_occupancy_pct < Decimal::ZERO {
        return Err(SmartTargetError::NegativeOccupancy(current_occupancy_pct));
    }
    Ok(actual_breakeven_pct * improvement_multiplier(actual_breakeven_pct, current_occupancy_pct))
}
