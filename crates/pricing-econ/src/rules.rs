//! Merges global defaults with per-location overrides.

use crate::smart_target::smart_target;
use pricing_core::{BreakevenTarget, ConfigError, PricingConfig, PricingRules, DEFAULT_TARGET_BREAKEVEN_PCT};
use rust_decimal::Decimal;
use tracing::{debug, warn};

/// Resolve the rule set for `location`.
///
/// Locations missing from the configuration get empty overrides: no price
/// bounds, the global margin and static targeting. Tiers always come from the
/// global list.
pub fn resolve_rules(location: &str, config: &PricingConfig) -> Result<PricingRules, ConfigError> {
    let global_margin = config.global_margin_of_safety();
    let tiers = config.dynamic_pricing_tiers.clone();
    let Some((name, overrides)) = config.location(location) else {
        return Ok(PricingRules {
            min_price: None,
            max_price: None,
            margin_of_safety: global_margin,
            dynamic_pricing_tiers: tiers,
            use_smart_target: false,
        });
    };

    let use_smart_target = overrides
        .use_smart_target
        .ok_or_else(|| ConfigError::MissingSmartTarget(name.to_string()))?;
    if use_smart_target {
        if let Some(t) = overrides.target_breakeven_occupancy {
            if t <= Decimal::ZERO {
                return Err(ConfigError::InvalidTarget {
                    location: name.to_string(),
                    value: t,
                });
            }
        }
    }

    Ok(PricingRules {
        min_price: overrides.min_price,
        max_price: overrides.max_price,
        margin_of_safety: overrides.margin_of_safety.unwrap_or(global_margin),
        dynamic_pricing_tiers: tiers,
        use_smart_target,
    })
}

/// Configured static target for `location`, percent (70 when unset).
pub fn static_target(location: &str, config: &PricingConfig) -> Decimal {
    config
        .location(location)
        .and_then(|(_, o)| o.target_breakeven_occupancy)
        .unwrap_or_else(|| Decimal::new(DEFAULT_TARGET_BREAKEVEN_PCT, 0))
}

/// Pick the breakeven target for `location`.
///
/// With smart targeting enabled and both the actual breakeven and the current
/// occupancy known, the smart target applies. Otherwise, or if the smart
/// target cannot be derived, the static target is used.
pub fn target_breakeven_occupancy(
    location: &str,
    config: &PricingConfig,
    actual_breakeven_pct: Option<Decimal>,
    current_occupancy_pct: Option<Decimal>,
) -> Result<BreakevenTarget, ConfigError> {
    let rules = resolve_rules(location, config)?;
    if rules.use_smart_target {
        if let (Some(actual), Some(current)) = (actual_breakeven_pct, current_occupancy_pct) {
            match smart_target(actual, current) {
                Ok(pct) => {
                    debug!(location, target = %pct, actual = %actual, "using smart breakeven target");
                    return Ok(BreakevenTarget::smart(pct));
                }
                Err(err) => {
                    warn!(location, reason = %err, "smart target unavailable; using static target");
                }
            }
        }
    }
    Ok(BreakevenTarget::fixed(static_target(location, config)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PricingConfig {
        PricingConfig::from_yaml_str(
            r#"
margin_of_safety: 0.5
dynamic_pricing_tiers:
  - { min_occupancy: 0, max_occupancy: 50, multiplier: 0.8 }
  - { min_occupancy: 50, max_occupancy: 100, multiplier: 1.0 }
locations:
  Smart Tower:
    max_price: 3000000
    target_breakeven_occupancy: 70
    use_smart_target: true
  Static Tower:
    min_price: 1000000
    margin_of_safety: 0.25
    target_breakeven_occupancy: 60
    use_smart_target: false
"#,
        )
        .unwrap()
    }

    #[test]
    fn overrides_merge_with_globals() {
        let cfg = config();
        let rules = resolve_rules("Static Tower", &cfg).unwrap();
        assert_eq!(rules.min_price, Some(Decimal::new(1_000_000, 0)));
        assert_eq!(rules.max_price, None);
        assert_eq!(rules.margin_of_safety, Decimal::new(25, 2));
        assert_eq!(rules.dynamic_pricing_tiers.len(), 2);
        assert!(!rules.use_smart_target);

        let rules = resolve_rules("Smart Tower", &cfg).unwrap();
        assert_eq!(rules.margin_of_safety, Decimal::new(5, 1));
        assert!(rules.use_smart_target);
    }

    #[test]
    fn unknown_location_gets_defaults() {
        let rules = resolve_rules("Elsewhere", &config()).unwrap();
        assert_eq!(rules.min_price, None);
        assert_eq!(rules.max_price, None);
        assert_eq!(rules.margin_of_safety, Decimal::new(5, 1));
        assert!(!rules.use_smart_target);
    }

    #[test]
    fn margin_defaults_when_globally_absent() {
        let cfg = PricingConfig::default();
        assert_eq!(resolve_rules("X", &cfg).unwrap().margin_of_safety, Decimal::new(5, 1));
    }

    #[test]
    fn unvalidated_config_still_fails_resolution() {
        let mut cfg = config();
        cfg.locations.get_mut("Smart Tower").unwrap().target_breakeven_occupancy = Some(Decimal::new(-5, 0));
        assert!(matches!(
            resolve_rules("Smart Tower", &cfg),
            Err(ConfigError::InvalidTarget { .. })
        ));
        cfg.locations.get_mut("Static Tower").unwrap().use_smart_target = None;
        assert_eq!(
            resolve_rules("Static Tower", &cfg),
            Err(ConfigError::MissingSmartTarget("Static Tower".to_string()))
        );
    }

    #[test]
    fn smart_target_when_inputs_known() {
        let t = target_breakeven_occupancy(
            "Smart Tower",
            &config(),
            Some(Decimal::new(80, 0)),
            Some(Decimal::new(85, 0)),
        )
        .unwrap();
        assert!(t.is_smart);
        assert_eq!(t.pct, Decimal::new(744, 1));
    }

    #[test]
    fn static_fallbacks() {
        let cfg = config();
        let missing = target_breakeven_occupancy("Smart Tower", &cfg, None, Some(Decimal::new(85, 0))).unwrap();
        assert_eq!(missing, BreakevenTarget::fixed(Decimal::new(70, 0)));

        let invalid = target_breakeven_occupancy("Smart Tower", &cfg, Some(Decimal::ZERO), Some(Decimal::new(85, 0))).unwrap();
        assert_eq!(invalid, BreakevenTarget::fixed(Decimal::new(70, 0)));

        let disabled = target_breakeven_occupancy(
            "Static Tower",
            &cfg,
            Some(Decimal::new(80, 0)),
            Some(Decimal::new(85, 0)),
        )
        .unwrap();
        assert_eq!(disabled, BreakevenTarget::fixed(Decimal::new(60, 0)));

        let unknown = target_breakeven_occupancy("Nowhere", &cfg, Some(Decimal::new(80, 0)), Some(Decimal::new(85, 0))).unwrap();
        assert_eq!(unknown, BreakevenTarget::fixed(Decimal::new(70, 0)));
    }
}
