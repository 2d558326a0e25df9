#![deny(warnings)]

//! Free-text reasoning attached to verbose price recommendations.
//!
//! Generators never fail: when no reasoning can be produced they return a
//! sentinel starting with [`UNAVAILABLE_PREFIX`], which presentation layers
//! detect with [`is_available`] and omit.

use pricing_core::parse::{format_one_dp, format_thousands};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use tracing::debug;

/// Prefix of every "no reasoning" sentinel.
pub const UNAVAILABLE_PREFIX: &str = "[LLM reasoning unavailable";

/// Inputs a generator reasons about.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReasoningContext {
    pub location: String,
    pub recommended_price: Decimal,
    pub occupancy_pct: Decimal,
    /// Target breakeven occupancy the price was derived from.
    pub breakeven_occupancy_pct: Decimal,
    pub published_price: Option<Decimal>,
}

impl ReasoningContext {
    /// Flat string map keyed the way prompt templates expect.
    pub fn to_map(&self) -> BTreeMap<&'static str, String> {
        let mut map = BTreeMap::new();
        map.insert("location", self.location.clone());
        map.insert("recommended_price", self.recommended_price.to_string());
        map.insert("occupancy_pct", self.occupancy_pct.to_string());
        map.insert("breakeven_occupancy_pct", self.breakeven_occupancy_pct.to_string());
        map.insert(
            "published_price",
            self.published_price.map(|p| p.to_string()).unwrap_or_default(),
        );
        map
    }

    /// Analyst prompt for a language-model backed generator.
    pub fn prompt(&self) -> String {
        format!(
            "You are an expert pricing analyst for flexible office space in Indonesia.\n\
             Location: {}\n\
             Recommended Price: {}\n\
             Published Price: {}\n\
             Occupancy Rate: {}\n\
             Breakeven Occupancy: {}\n\n\
             Based on these metrics, provide a concise (max 6 sentences) reasoning for whether the \
             recommended price is justified. Address the occupancy, price difference, and impact on \
             revenue. Respond in clear, practical business language.",
            self.location,
            rupiah(Some(self.recommended_price)),
            rupiah(self.published_price),
            pct(self.occupancy_pct),
            pct(self.breakeven_occupancy_pct),
        )
    }
}

fn rupiah(price: Option<Decimal>) -> String {
    match price {
        Some(p) => format!("Rp {}", format_thousands(p.round())),
        None => "Not set".to_string(),
    }
}

fn pct(value: Decimal) -> String {
    format!("{}%", format_one_dp(value))
}

/// Produces reasoning text for one recommendation.
pub trait ReasoningGenerator {
    fn generate(&self, context: &ReasoningContext) -> String;
}

impl<T: ReasoningGenerator + ?Sized> ReasoningGenerator for Box<T> {
    fn generate(&self, context: &ReasoningContext) -> String {
        (**self).generate(context)
    }
}

/// Sentinel text for `reason`.
pub fn unavailable(reason: &str) -> String {
    format!("{UNAVAILABLE_PREFIX}: {reason}]")
}

/// Whether `text` is real reasoning rather than the sentinel.
pub fn is_available(text: &str) -> bool {
    !text.trim().is_empty() && !text.starts_with(UNAVAILABLE_PREFIX)
}

/// Generator that never has reasoning, e.g. when no model is configured.
#[derive(Clone, Debug)]
pub struct Unavailable {
    pub reason: String,
}

impl Unavailable {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

impl Default for Unavailable {
    fn default() -> Self {
        Self::new("no reasoning backend configured")
    }
}

impl ReasoningGenerator for Unavailable {
    fn generate(&self, context: &ReasoningContext) -> String {
        debug!(location = %context.location, reason = %self.reason, "reasoning unavailable");
        unavailable(&self.reason)
    }
}

/// Deterministic offline summary built from the context figures alone.
#[derive(Copy, Clone, Debug, Default)]
pub struct RuleBasedReasoner;

impl ReasoningGenerator for RuleBasedReasoner {
    fn generate(&self, ctx: &ReasoningContext) -> String {
        let mut out = String::new();
        let headroom = ctx.occupancy_pct - ctx.breakeven_occupancy_pct;
        if headroom >= Decimal::ZERO {
            let _ = write!(
                out,
                "{} is running at {} occupancy, {} points above its {} breakeven target, so the \
                 recommended {} covers costs with room to spare.",
                ctx.location,
                pct(ctx.occupancy_pct),
                format_one_dp(headroom),
                pct(ctx.breakeven_occupancy_pct),
                rupiah(Some(ctx.recommended_price)),
            );
        } else {
            let _ = write!(
                out,
                "{} is running at {} occupancy, {} points below its {} breakeven target, so the \
                 recommended {} leans on price to cover costs until occupancy recovers.",
                ctx.location,
                pct(ctx.occupancy_pct),
                format_one_dp(-headroom),
                pct(ctx.breakeven_occupancy_pct),
                rupiah(Some(ctx.recommended_price)),
            );
        }
        match ctx.published_price {
            Some(published) if published > Decimal::ZERO => {
                let diff = ctx.recommended_price - published;
                let change = diff / published * Decimal::ONE_HUNDRED;
                if diff.is_zero() {
                    out.push_str(" It matches the published price.");
                } else {
                    let direction = if diff > Decimal::ZERO { "above" } else { "below" };
                    let _ = write!(
                        out,
                        " It sits {}% {direction} the published {}.",
                        format_one_dp(change.abs()),
                        rupiah(Some(published)),
                    );
                }
            }
            _ => out.push_str(" No published price is set for comparison."),
        }
        out
    }
}
