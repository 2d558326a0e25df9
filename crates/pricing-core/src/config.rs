//! Typed pricing configuration, validated at load time.
//!
//! ```yaml
//! margin_of_safety: 0.5
//! dynamic_pricing_tiers:
//!   - { min_occupancy: 0, max_occupancy: 50, multiplier: 0.8 }
//!   - { min_occupancy: 50, max_occupancy: 100, multiplier: 1.0 }
//! locations:
//!   Pacific Place:
//!     min_price: 1000000
//!     max_price: 3000000
//!     target_breakeven_occupancy: 70
//!     use_smart_target: true
//! ```

use crate::parse::normalize_pct;
use crate::{default_margin_of_safety, normalize_location, DynamicPricingTier};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

/// Configuration problems. Each names the offending location or tier.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("location '{0}' must have 'use_smart_target' configured")]
    MissingSmartTarget(String),
    #[error("location '{location}' has invalid target_breakeven_occupancy value: {value}. Must be a positive number no greater than 100.")]
    InvalidTarget { location: String, value: Decimal },
    #[error("location '{location}' has min_price {min} above max_price {max}")]
    InvalidBounds {
        location: String,
        min: Decimal,
        max: Decimal,
    },
    #[error("location '{location}' has negative {field}: {value}")]
    NegativeValue {
        location: String,
        field: &'static str,
        value: Decimal,
    },
    #[error("margin_of_safety for {scope} must be non-negative, got {value}")]
    InvalidMargin { scope: String, value: Decimal },
    #[error("dynamic pricing tier {index} is invalid: {reason}")]
    InvalidTier { index: usize, reason: String },
    #[error("dynamic pricing tiers {first} and {second} overlap")]
    OverlappingTiers { first: usize, second: usize },
    #[error("io error: {0}")]
    Io(String),
    #[error("yaml error: {0}")]
    Yaml(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e.to_string())
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(e: serde_yaml::Error) -> Self {
        ConfigError::Yaml(e.to_string())
    }
}

/// Per-location overrides. Every listed location must set `use_smart_target`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationOverrides {
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub margin_of_safety: Option<Decimal>,
    /// Static breakeven target, percent (fractions are normalized on load).
    pub target_breakeven_occupancy: Option<Decimal>,
    pub use_smart_target: Option<bool>,
}

/// Pricing configuration: global margin, global tiers, per-location overrides.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    pub margin_of_safety: Option<Decimal>,
    #[serde(default)]
    pub dynamic_pricing_tiers: Vec<DynamicPricingTier>,
    #[serde(default)]
    pub locations: BTreeMap<String, LocationOverrides>,
}

impl PricingConfig {
    /// Parse, normalize and validate a YAML document.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let mut cfg: PricingConfig = serde_yaml::from_str(text)?;
        cfg.normalize();
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read and validate a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Rewrite fractional static targets (`0.7`) onto the percentage scale.
    pub fn normalize(&mut self) {
        for overrides in self.locations.values_mut() {
            if let Some(t) = overrides.target_breakeven_occupancy {
                overrides.target_breakeven_occupancy = Some(normalize_pct(t));
            }
        }
    }

    /// Global margin of safety, defaulting to 0.5.
    pub fn global_margin_of_safety(&self) -> Decimal {
        self.margin_of_safety.unwrap_or_else(default_margin_of_safety)
    }

    /// Overrides for `name`: exact match first, then normalized match.
    pub fn location(&self, name: &str) -> Option<(&str, &LocationOverrides)> {
        if let Some((k, v)) = self.locations.get_key_value(name) {
            return Some((k.as_str(), v));
        }
        let wanted = normalize_location(name);
        self.locations
            .iter()
            .find(|(k, _)| normalize_location(k) == wanted)
            .map(|(k, v)| (k.as_str(), v))
    }

    /// Check every invariant the engine relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(m) = self.margin_of_safety {
            if m < Decimal::ZERO {
                return Err(ConfigError::InvalidMargin {
                    scope: "global".to_string(),
                    value: m,
                });
            }
        }
        validate_tiers(&self.dynamic_pricing_tiers)?;
        for (name, overrides) in &self.locations {
            validate_location(name, overrides)?;
        }
        Ok(())
    }
}

fn validate_location(name: &str, o: &LocationOverrides) -> Result<(), ConfigError> {
    if o.use_smart_target.is_none() {
        return Err(ConfigError::MissingSmartTarget(name.to_string()));
    }
    if let Some(t) = o.target_breakeven_occupancy {
        if t <= Decimal::ZERO || t > Decimal::ONE_HUNDRED {
            return Err(ConfigError::InvalidTarget {
                location: name.to_string(),
                value: t,
            });
        }
    }
    for (field, value) in [("min_price", o.min_price), ("max_price", o.max_price)] {
        if let Some(v) = value {
            if v < Decimal::ZERO {
                return Err(ConfigError::NegativeValue {
                    location: name.to_string(),
                    field,
                    value: v,
                });
            }
        }
    }
    if let (Some(min), Some(max)) = (o.min_price, o.max_price) {
        if min > max {
            return Err(ConfigError::InvalidBounds {
                location: name.to_string(),
                min,
                max,
            });
        }
    }
    if let Some(m) = o.margin_of_safety {
        if m < Decimal::ZERO {
            return Err(ConfigError::InvalidMargin {
                scope: format!("location '{name}'"),
                value: m,
            });
        }
    }
    Ok(())
}

/// Tiers must be well-formed and must not overlap; gaps only warn because
/// the calculator falls back to a 1.0 multiplier there.
pub fn validate_tiers(tiers: &[DynamicPricingTier]) -> Result<(), ConfigError> {
    for (index, t) in tiers.iter().enumerate() {
        if t.min_occupancy >= t.max_occupancy {
            return Err(ConfigError::InvalidTier {
                index,
                reason: format!(
                    "min_occupancy {} must be below max_occupancy {}",
                    t.min_occupancy, t.max_occupancy
                ),
            });
        }
        if t.min_occupancy < Decimal::ZERO || t.max_occupancy > Decimal::ONE_HUNDRED {
            return Err(ConfigError::InvalidTier {
                index,
                reason: "bounds must lie within [0, 100]".to_string(),
            });
        }
        if t.multiplier <= Decimal::ZERO {
            return Err(ConfigError::InvalidTier {
                index,
                reason: format!("multiplier must be positive, got {}", t.multiplier),
            });
        }
    }
    for (i, a) in tiers.iter().enumerate() {
        for (j, b) in tiers.iter().enumerate().skip(i + 1) {
            if a.min_occupancy < b.max_occupancy && b.min_occupancy < a.max_occupancy {
                return Err(ConfigError::OverlappingTiers {
                    first: i,
                    second: j,
                });
            }
        }
    }

    let mut sorted: Vec<&DynamicPricingTier> = tiers.iter().collect();
    sorted.sort_by(|a, b| a.min_occupancy.cmp(&b.min_occupancy));
    let mut covered = Decimal::ZERO;
    for t in &sorted {
        if t.min_occupancy > covered {
            warn!(from = %covered, to = %t.min_occupancy, "gap in dynamic pricing tiers; multiplier 1.0 applies");
        }
        covered = covered.max(t.max_occupancy);
    }
    if !tiers.is_empty() && covered < Decimal::ONE_HUNDRED {
        warn!(from = %covered, "dynamic pricing tiers stop short of 100%");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const BASE: &str = r#"
margin_of_safety: 0.5
dynamic_pricing_tiers:
  - { min_occupancy: 0, max_occupancy: 50, multiplier: 0.8 }
  - { min_occupancy: 50, max_occupancy: 100, multiplier: 1.1 }
locations:
  Pacific Place:
    min_price: 1000000
    max_price: 3000000
    target_breakeven_occupancy: 0.7
    use_smart_target: true
  Test Tower:
    margin_of_safety: 0.25
    use_smart_target: false
"#;

    #[test]
    fn loads_and_normalizes_targets() {
        let cfg = PricingConfig::from_yaml_str(BASE).unwrap();
        assert_eq!(cfg.global_margin_of_safety(), Decimal::new(5, 1));
        let (_, pp) = cfg.location("Pacific Place").unwrap();
        assert_eq!(pp.target_breakeven_occupancy, Some(Decimal::new(70, 0)));
        assert_eq!(pp.min_price, Some(Decimal::new(1_000_000, 0)));
        assert_eq!(cfg.dynamic_pricing_tiers[0].multiplier, Decimal::new(8, 1));
    }

    #[test]
    fn location_lookup_is_forgiving() {
        let cfg = PricingConfig::from_yaml_str(BASE).unwrap();
        let (name, _) = cfg.location("pacific-place").unwrap();
        assert_eq!(name, "Pacific Place");
        assert!(cfg.location("Nowhere").is_none());
    }

    #[test]
    fn smart_target_flag_is_mandatory() {
        let text = "locations:\n  Solo:\n    min_price: 10\n";
        assert_eq!(
            PricingConfig::from_yaml_str(text),
            Err(ConfigError::MissingSmartTarget("Solo".to_string()))
        );
    }

    #[test]
    fn rejects_non_positive_target() {
        let text = "locations:\n  Solo:\n    use_smart_target: true\n    target_breakeven_occupancy: 0\n";
        assert!(matches!(
            PricingConfig::from_yaml_str(text),
            Err(ConfigError::InvalidTarget { .. })
        ));
    }

    #[test]
    fn rejects_inverted_bounds() {
        let text = "locations:\n  Solo:\n    use_smart_target: false\n    min_price: 5\n    max_price: 1\n";
        assert!(matches!(
            PricingConfig::from_yaml_str(text),
            Err(ConfigError::InvalidBounds { .. })
        ));
    }

    #[test]
    fn rejects_overlapping_tiers() {
        let text = r#"
dynamic_pricing_tiers:
  - { min_occupancy: 0, max_occupancy: 60, multiplier: 0.8 }
  - { min_occupancy: 50, max_occupancy: 100, multiplier: 1.0 }
"#;
        assert_eq!(
            PricingConfig::from_yaml_str(text),
            Err(ConfigError::OverlappingTiers { first: 0, second: 1 })
        );
    }

    #[test]
    fn tolerates_gapped_tiers() {
        let text = r#"
dynamic_pricing_tiers:
  - { min_occupancy: 0, max_occupancy: 40, multiplier: 0.8 }
  - { min_occupancy: 60, max_occupancy: 100, multiplier: 1.0 }
"#;
        assert!(PricingConfig::from_yaml_str(text).is_ok());
    }

    #[test]
    fn rejects_degenerate_tier() {
        let text = "dynamic_pricing_tiers:\n  - { min_occupancy: 50, max_occupancy: 50, multiplier: 1.0 }\n";
        assert!(matches!(
            PricingConfig::from_yaml_str(text),
            Err(ConfigError::InvalidTier { index: 0, .. })
        ));
    }

    #[test]
    fn yaml_errors_are_reported() {
        assert!(matches!(
            PricingConfig::from_yaml_str("locations: [1, 2"),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn bundled_rules_validate() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../assets/pricing_rules.yaml");
        let cfg = PricingConfig::load(path).unwrap();
        assert!(!cfg.dynamic_pricing_tiers.is_empty());
        assert!(!cfg.locations.is_empty());
    }
}
