//! Four-stage seat price derivation.

use crate::PricingError;
use pricing_core::{
    BreakevenTarget, DynamicPricingTier, LocationData, PricingResult, PricingRules, ProfitStatus, PRICE_STEP,
};
use rust_decimal::Decimal;

fn step() -> Decimal {
    Decimal::from(PRICE_STEP)
}

/// Round up to the next multiple of the price step. `None` on overflow.
pub fn ceil_to_step(value: Decimal) -> Option<Decimal> {
    (value / step()).ceil().checked_mul(step())
}

/// Round to the nearest multiple of the price step; exact halves go to the
/// even multiple. `None` on overflow.
pub fn round_to_step(value: Decimal) -> Option<Decimal> {
    (value / step()).round().checked_mul(step())
}

/// Per-seat price that covers `avg_expense` at `target_pct` occupancy.
///
/// `None` when there are no seats, the target is not positive, or the
/// quotient overflows.
pub fn breakeven_price(avg_expense: Decimal, total_seats: u32, target_pct: Decimal) -> Option<Decimal> {
    if total_seats == 0 || target_pct <= Decimal::ZERO {
        return None;
    }
    let paying_seats = Decimal::from(total_seats) * target_pct / Decimal::ONE_HUNDRED;
    avg_expense.checked_div(paying_seats)
}

/// Multiplier of the first tier containing `occupancy_pct`, else 1.0.
pub fn dynamic_multiplier(occupancy_pct: Decimal, tiers: &[DynamicPricingTier]) -> Decimal {
    tiers
        .iter()
        .find(|t| t.contains(occupancy_pct))
        .map(|t| t.multiplier)
        .unwrap_or(Decimal::ONE)
}

pub fn apply_margin(base_price: Decimal, margin_of_safety: Decimal) -> Decimal {
    base_price * (Decimal::ONE + margin_of_safety)
}

/// Raise to `min_price`, then lower to `max_price`, when set.
pub fn enforce_bounds(price: Decimal, min_price: Option<Decimal>, max_price: Option<Decimal>) -> Decimal {
    match (min_price, max_price) {
        (Some(min), _) if price < min => min,
        (_, Some(max)) if price > max => max,
        _ => price,
    }
}

/// Occupancy at which actual sold prices cover `avg_expense`, percent.
///
/// `None` without a positive sold price or with no seats.
pub fn actual_breakeven_pct(
    avg_expense: Decimal,
    sold_price_per_seat: Option<Decimal>,
    total_seats: u32,
) -> Option<Decimal> {
    let sold = sold_price_per_seat.filter(|p| *p > Decimal::ZERO)?;
    if total_seats == 0 {
        return None;
    }
    let revenue_at_full = sold.checked_mul(Decimal::from(total_seats))?;
    avg_expense
        .checked_div(revenue_at_full)?
        .checked_mul(Decimal::ONE_HUNDRED)
}

/// Price one location.
///
/// Stage 1 divides the average expense by the paying seats at the target
/// occupancy; the ceiling-rounded copy is reported as the bottom price while
/// the raw value feeds stage 2. Rounding happens only in stage 4, before the
/// clamp, so a clamped price equals the bound exactly.
pub fn calculate(
    data: &LocationData,
    rules: &PricingRules,
    target: BreakevenTarget,
) -> Result<PricingResult, PricingError> {
    if data.total_po_seats == 0 || target.pct <= Decimal::ZERO {
        return Err(PricingError::InvalidPreconditions {
            location: data.name.clone(),
            seats: data.total_po_seats,
            target_pct: target.pct,
        });
    }
    let overflow = || PricingError::Overflow(data.name.clone());
    let raw_breakeven =
        breakeven_price(data.avg_expense_amount, data.total_po_seats, target.pct).ok_or_else(overflow)?;
    let bottom_price = ceil_to_step(raw_breakeven).ok_or_else(overflow)?;

    let multiplier = dynamic_multiplier(data.occupancy_pct, &rules.dynamic_pricing_tiers);
    let base_price = raw_breakeven.checked_mul(multiplier).ok_or_else(overflow)?;
    let price_with_margin = base_price
        .checked_mul(Decimal::ONE + rules.margin_of_safety)
        .ok_or_else(overflow)?;
    let rounded = round_to_step(price_with_margin).ok_or_else(overflow)?;
    let final_price = enforce_bounds(rounded, rules.min_price, rules.max_price);

    let actual_breakeven = actual_breakeven_pct(data.avg_expense_amount, data.sold_price_per_seat, data.total_po_seats);
    let profit_status = ProfitStatus::classify(data.occupancy_pct, actual_breakeven);

    Ok(PricingResult {
        location: data.name.clone(),
        recommended_price: final_price,
        occupancy_pct: data.occupancy_pct,
        target_breakeven_pct: target.pct,
        actual_breakeven_pct: actual_breakeven,
        profit_status,
        losing_money: profit_status.is_losing(),
        raw_breakeven_price: raw_breakeven,
        breakeven_price: bottom_price,
        base_price,
        price_with_margin,
        final_price,
        dynamic_multiplier: multiplier,
        is_smart_target: target.is_smart,
    })
}
