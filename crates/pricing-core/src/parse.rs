//! Tolerant numeric coercion for heterogeneous source cells.
//!
//! Source data mixes `"1,250,000"`, `"75%"`, `0.75`, `75.0` and nulls. None of
//! these helpers fail: the `parse_*` forms fall back to a caller-supplied
//! default and the `try_parse_*` forms return `None`.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde_json::{Number, Value};
use std::str::FromStr;

/// Parse a decimal from text, ignoring surrounding whitespace and `,`
/// thousands separators. Scientific notation is accepted.
pub fn decimal_from_str(text: &str) -> Option<Decimal> {
    let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned)
        .ok()
        .or_else(|| Decimal::from_scientific(&cleaned).ok())
}

fn decimal_from_number(n: &Number) -> Option<Decimal> {
    if let Some(i) = n.as_i64() {
        return Some(Decimal::from(i));
    }
    if let Some(u) = n.as_u64() {
        return Some(Decimal::from(u));
    }
    // Go through the shortest textual form so 0.7 stays 0.7.
    decimal_from_str(&n.to_string()).or_else(|| n.as_f64().and_then(Decimal::from_f64))
}

/// Parse a numeric cell. Strings and numbers are accepted; anything else is `None`.
pub fn try_parse_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::String(s) => decimal_from_str(s),
        Value::Number(n) => decimal_from_number(n),
        _ => None,
    }
}

/// Parse a numeric cell, returning `default` on failure.
pub fn parse_decimal(value: &Value, default: Decimal) -> Decimal {
    try_parse_decimal(value).unwrap_or(default)
}

/// Parse a numeric cell and take its absolute value; `default` is returned
/// unchanged on failure.
pub fn parse_decimal_abs(value: &Value, default: Decimal) -> Decimal {
    try_parse_decimal(value).map(|d| d.abs()).unwrap_or(default)
}

/// Parse an integer cell. Integral decimals such as `"200.0"` are accepted.
pub fn try_parse_int(value: &Value) -> Option<i64> {
    let d = try_parse_decimal(value)?;
    if !d.fract().is_zero() {
        return None;
    }
    d.to_i64()
}

/// Parse an integer cell, returning `default` on failure.
pub fn parse_int(value: &Value, default: i64) -> i64 {
    try_parse_int(value).unwrap_or(default)
}

/// Bring a raw number onto the 0-100 scale: magnitudes below 1 are read as
/// fractions and multiplied by 100, everything else passes through.
pub fn normalize_pct(value: Decimal) -> Decimal {
    if value.abs() < Decimal::ONE {
        fraction_to_pct(value)
    } else {
        value
    }
}

/// Parse a percentage cell onto the 0-100 scale.
///
/// `"75%"` is taken as already being a percentage; `"0.75"`, `0.75`, `75`
/// and `"75"` all go through [`normalize_pct`].
pub fn try_parse_pct(value: &Value) -> Option<Decimal> {
    match value {
        Value::String(s) if s.contains('%') => decimal_from_str(&s.replace('%', "")),
        other => try_parse_decimal(other).map(normalize_pct),
    }
}

/// Parse a percentage cell, returning `default` on failure.
pub fn parse_pct(value: &Value, default: Decimal) -> Decimal {
    try_parse_pct(value).unwrap_or(default)
}

/// 0.75 -> 75.
pub fn fraction_to_pct(fraction: Decimal) -> Decimal {
    fraction * Decimal::ONE_HUNDRED
}

/// 75 -> 0.75.
pub fn pct_to_fraction(pct: Decimal) -> Decimal {
    pct / Decimal::ONE_HUNDRED
}

/// One-decimal display, e.g. `66.666` -> `"66.7"`.
pub fn format_one_dp(value: Decimal) -> String {
    format!("{:.1}", value.round_dp(1))
}

/// Integer part of `value` with `,` thousands separators.
pub fn format_thousands(value: Decimal) -> String {
    let whole = value.trunc().to_i128().unwrap_or_default();
    let digits = whole.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if whole < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn one_decimal_display() {
        assert_eq!(format_one_dp(Decimal::new(80, 0)), "80.0");
        assert_eq!(format_one_dp(Decimal::new(66666, 3)), "66.7");
        assert_eq!(format_one_dp(Decimal::new(-125, 1)), "-12.5");
    }

    #[test]
    fn strips_thousands_separators() {
        assert_eq!(
            try_parse_decimal(&json!("1,250,000.50")),
            Some(Decimal::new(125_000_050, 2))
        );
        assert_eq!(try_parse_decimal(&json!(" 42 ")), Some(Decimal::new(42, 0)));
    }

    #[test]
    fn json_floats_keep_their_short_form() {
        assert_eq!(try_parse_decimal(&json!(0.7)), Some(Decimal::new(7, 1)));
        assert_eq!(
            try_parse_decimal(&json!(-100000000.0)),
            Some(Decimal::new(-100_000_000, 0))
        );
    }

    #[test]
    fn failures_fall_back_to_default() {
        let dflt = Decimal::new(-1, 0);
        assert_eq!(parse_decimal(&Value::Null, dflt), dflt);
        assert_eq!(parse_decimal(&json!(""), dflt), dflt);
        assert_eq!(parse_decimal(&json!("n/a"), dflt), dflt);
        assert_eq!(parse_decimal(&json!(true), dflt), dflt);
        assert_eq!(parse_int(&json!("abc"), 0), 0);
    }

    #[test]
    fn absolute_expense() {
        assert_eq!(
            parse_decimal_abs(&json!("-3,000"), Decimal::ZERO),
            Decimal::new(3000, 0)
        );
    }

    #[test]
    fn integers_accept_integral_decimals_only() {
        assert_eq!(try_parse_int(&json!("1,200")), Some(1200));
        assert_eq!(try_parse_int(&json!(200.0)), Some(200));
        assert_eq!(try_parse_int(&json!("12.5")), None);
    }

    #[test]
    fn percentages() {
        assert_eq!(try_parse_pct(&json!("75%")), Some(Decimal::new(75, 0)));
        assert_eq!(try_parse_pct(&json!("0.5%")), Some(Decimal::new(5, 1)));
        assert_eq!(try_parse_pct(&json!(0.75)), Some(Decimal::new(75, 0)));
        assert_eq!(try_parse_pct(&json!("0.75")), Some(Decimal::new(75, 0)));
        assert_eq!(try_parse_pct(&json!(70.0)), Some(Decimal::new(70, 0)));
        assert_eq!(try_parse_pct(&json!(1)), Some(Decimal::ONE));
        assert_eq!(try_parse_pct(&json!("-0.2")), Some(Decimal::new(-20, 0)));
        assert_eq!(try_parse_pct(&json!("%")), None);
        assert_eq!(parse_pct(&Value::Null, Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn unit_converters() {
        assert_eq!(fraction_to_pct(Decimal::new(75, 2)), Decimal::new(75, 0));
        assert_eq!(pct_to_fraction(Decimal::new(75, 0)), Decimal::new(75, 2));
    }

    #[test]
    fn thousands_formatting() {
        assert_eq!(format_thousands(Decimal::new(250_000, 0)), "250,000");
        assert_eq!(format_thousands(Decimal::new(999, 0)), "999");
        assert_eq!(format_thousands(Decimal::new(12_345_678_9, 1)), "12,345,678");
        assert_eq!(format_thousands(Decimal::new(-1_000_000, 0)), "-1,000,000");
        assert_eq!(format_thousands(Decimal::ZERO), "0");
    }

    proptest! {
        #[test]
        fn parse_never_panics(s in ".*") {
            let _ = parse_pct(&Value::String(s.clone()), Decimal::ZERO);
            let _ = parse_int(&Value::String(s), 0);
        }

        #[test]
        fn formatted_integers_round_trip(n in -10_000_000_000i64..10_000_000_000i64) {
            let text = format_thousands(Decimal::from(n));
            prop_assert_eq!(try_parse_int(&Value::String(text)), Some(n));
        }
    }
}
