//! Plain-text renderings of a [`PricingReport`] for the terminal and chat.

use crate::PricingReport;
use pricing_core::parse::{format_one_dp, format_thousands};
use pricing_core::{YearMonth, PRICE_STEP};
use reasoning::is_available;
use rust_decimal::Decimal;

/// Rounding step for displayed sold prices.
pub const SOLD_PRICE_DISPLAY_STEP: i64 = 10_000;

const MONTH_ABBR: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// `value` rounded to the nearest `step` (half to even) with thousands
/// separators, or "Not set".
pub fn format_rounded(value: Option<Decimal>, step: i64) -> String {
    match value {
        Some(v) => {
            let step = Decimal::from(step);
            format_thousands((v / step).round() * step)
        }
        None => "Not set".to_string(),
    }
}

/// Capitalise the first letter of every alphabetic run, lowercase the rest.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

fn month_label(ym: YearMonth) -> String {
    let idx = (ym.month as usize).saturating_sub(1).min(11);
    format!("{} {}", MONTH_ABBR[idx], ym.year)
}

fn published_line(report: &PricingReport) -> String {
    match (report.published_price, report.published_valid_from) {
        (Some(price), Some(from)) => format!(
            "Published Price: {} (Valid from {})",
            format_thousands(price),
            month_label(from)
        ),
        (Some(price), None) => format!("Published Price: {}", format_thousands(price)),
        _ => "Published Price: Not set".to_string(),
    }
}

fn actual_breakeven_line(report: &PricingReport) -> String {
    match report.result.actual_breakeven_pct {
        Some(pct) => format!("Actual Breakeven Occupancy: {}%", format_one_dp(pct)),
        None => "Actual Breakeven Occupancy: Not available".to_string(),
    }
}

fn target_line(report: &PricingReport) -> String {
    let kind = if report.result.is_smart_target {
        "Smart Target"
    } else {
        "Static Target"
    };
    format!(
        "Target Breakeven Occupancy: {}% ({kind})",
        format_one_dp(report.result.target_breakeven_pct)
    )
}

fn available_reasoning(report: &PricingReport) -> Option<&str> {
    report.reasoning.as_deref().filter(|r| is_available(r))
}

/// Indented terminal block. `verbose` adds the tier multiplier and reasoning.
pub fn format_cli(report: &PricingReport, verbose: bool) -> String {
    let r = &report.result;
    let mut lines = vec![
        format!("{}:", r.location),
        format!("  Latest Occupancy: {}%", format_one_dp(r.occupancy_pct)),
        format!("  {}", actual_breakeven_line(report)),
    ];
    if report.sold_price_per_seat.is_some() {
        lines.push(format!(
            "  Sold Price/Seat (Actual): {}",
            format_rounded(report.sold_price_per_seat, SOLD_PRICE_DISPLAY_STEP)
        ));
    }
    lines.push(String::new());
    lines.push(format!("  {}", target_line(report)));
    if verbose {
        lines.push(format!("  Dynamic Multiplier: {:.2}x", r.dynamic_multiplier.round_dp(2)));
    }
    lines.push(format!("  {}", published_line(report)));
    lines.push(format!("  Recommended Price: {}", format_thousands(r.recommended_price)));
    lines.push(format!(
        "  Bottom Price: {}",
        format_rounded(Some(r.breakeven_price), PRICE_STEP)
    ));
    if r.losing_money {
        lines.push("  ⚠️ ALERT: This location is losing money at current occupancy!".to_string());
    }
    lines.push(String::new());
    if verbose {
        if let Some(text) = available_reasoning(report) {
            lines.push(format!("  Reasoning: {text}"));
        }
    }
    lines.join("\n")
}

/// Chat message body with a title banner.
pub fn format_chat(report: &PricingReport) -> String {
    let r = &report.result;
    let mut lines = vec![
        format!("\u{1f3e2} {}", title_case(&r.location)),
        "=".repeat(r.location.chars().count() + 4),
        String::new(),
        format!("Latest Occupancy: {}%", format_one_dp(r.occupancy_pct)),
        actual_breakeven_line(report),
        format!(
            "Sold Price/Seat (Actual): {}",
            format_rounded(report.sold_price_per_seat, SOLD_PRICE_DISPLAY_STEP)
        ),
        String::new(),
        target_line(report),
        published_line(report),
        format!("Recommended Price: {}", format_thousands(r.recommended_price)),
        format!("Bottom Price: {}", format_rounded(Some(r.breakeven_price), PRICE_STEP)),
        String::new(),
    ];
    if r.losing_money {
        lines.push("⚠️  WARNING: Location is currently losing money ⚠️".to_string());
        lines.push(String::new());
    }
    if let Some(text) = available_reasoning(report) {
        lines.push("Reasoning:".to_string());
        lines.push("-".repeat(10));
        lines.push(text.to_string());
        lines.push(String::new());
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_pipeline::OccupancySource;
    use pricing_core::{PricingResult, ProfitStatus};

    fn d(v: i64) -> Decimal {
        Decimal::new(v, 0)
    }

    fn report(losing: bool, reasoning: Option<&str>) -> PricingReport {
        PricingReport {
            period: YearMonth::new(2025, 7).unwrap(),
            result: PricingResult {
                location: "pacific place".to_string(),
                recommended_price: d(3_300_000),
                occupancy_pct: Decimal::new(8125, 2),
                target_breakeven_pct: Decimal::new(6333, 2),
                actual_breakeven_pct: Some(Decimal::new(66666, 3)),
                profit_status: if losing { ProfitStatus::Losing } else { ProfitStatus::Profitable },
                losing_money: losing,
                raw_breakeven_price: d(2_210_000),
                breakeven_price: d(2_250_000),
                base_price: d(2_431_000),
                price_with_margin: d(3_646_500),
                final_price: d(3_300_000),
                dynamic_multiplier: Decimal::new(11, 1),
                is_smart_target: true,
            },
            occupancy_source: OccupancySource::DailyAverage { days: 7 },
            expense_amount: d(300_000_000),
            avg_expense_amount: d(280_000_000),
            expense_months: 3,
            total_po_seats: 200,
            monthly_occupancy_pct: None,
            sold_price_per_seat: Some(d(2_104_999)),
            published_price: Some(d(3_000_000)),
            published_valid_from: YearMonth::new(2025, 7),
            reasoning: reasoning.map(str::to_string),
        }
    }

    #[test]
    fn rounding_helper() {
        assert_eq!(format_rounded(Some(d(2_104_999)), 10_000), "2,100,000");
        assert_eq!(format_rounded(Some(d(2_225_000)), 50_000), "2,200,000");
        assert_eq!(format_rounded(Some(d(2_275_000)), 50_000), "2,300,000");
        assert_eq!(format_rounded(None, 50_000), "Not set");
    }

    #[test]
    fn title_case_matches_word_boundaries() {
        assert_eq!(title_case("pacific place"), "Pacific Place");
        assert_eq!(title_case("MENARA astra-2"), "Menara Astra-2");
        assert_eq!(title_case("o'neil tower"), "O'Neil Tower");
    }

    #[test]
    fn cli_block() {
        let text = format_cli(&report(false, Some("Looks fine.")), false);
        let expected = [
            "pacific place:",
            "  Latest Occupancy: 81.2%",
            "  Actual Breakeven Occupancy: 66.7%",
            "  Sold Price/Seat (Actual): 2,100,000",
            "",
            "  Target Breakeven Occupancy: 63.3% (Smart Target)",
            "  Published Price: 3,000,000 (Valid from Jul 2025)",
            "  Recommended Price: 3,300,000",
            "  Bottom Price: 2,250,000",
            "",
        ]
        .join("\n");
        assert_eq!(text, expected);
    }

    #[test]
    fn cli_verbose_adds_multiplier_reasoning_and_alert() {
        let text = format_cli(&report(true, Some("Looks fine.")), true);
        assert!(text.contains("  Dynamic Multiplier: 1.10x"));
        assert!(text.contains("⚠️ ALERT: This location is losing money at current occupancy!"));
        assert!(text.ends_with("  Reasoning: Looks fine."));

        let text = format_cli(&report(false, Some("[LLM reasoning unavailable: no key]")), true);
        assert!(!text.contains("Reasoning"));
    }

    #[test]
    fn chat_block() {
        let text = format_chat(&report(true, Some("Hold the price.")));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "\u{1f3e2} Pacific Place");
        assert_eq!(lines[1], "=".repeat(17));
        assert!(lines.contains(&"Sold Price/Seat (Actual): 2,100,000"));
        assert!(lines.contains(&"⚠️  WARNING: Location is currently losing money ⚠️"));
        assert!(lines.contains(&"----------"));
        assert!(lines.contains(&"Hold the price."));
    }

    #[test]
    fn chat_handles_missing_figures() {
        let mut rep = report(false, None);
        rep.sold_price_per_seat = None;
        rep.published_price = None;
        rep.published_valid_from = None;
        rep.result.actual_breakeven_pct = None;
        rep.result.is_smart_target = false;
        let text = format_chat(&rep);
        assert!(text.contains("Sold Price/Seat (Actual): Not set"));
        assert!(text.contains("Published Price: Not set"));
        assert!(text.contains("Actual Breakeven Occupancy: Not available"));
        assert!(text.contains("(Static Target)"));
        assert!(!text.contains("Reasoning"));
    }
}
