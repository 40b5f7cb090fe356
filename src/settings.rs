use crate::api::{MinorUnits, Points, MINOR_UNITS_PER_UNIT};
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use log::debug;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const ENV_PREFIX: &str = "POINTSMARKET";
pub const DEFAULT_CONFIG_FILE: &str = "pointsmarket";

/// Numbers the market charges and gates on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketRules {
    pub protocol_fee_bps: u32,
    pub listing_fee: MinorUnits,
    /// Earned points needed before a user may list points for sale.
    pub sell_threshold: Points,
    /// Stake size used for the ROI summary of an event.
    pub roi_probe: Points,
    pub starting_points: Points,
    pub max_username_len: usize,
}
impl Default for MarketRules {
    fn default() -> Self {
        Self {
            protocol_fee_bps: 200,
            listing_fee: 10 * MINOR_UNITS_PER_UNIT,
            sell_threshold: 10_000,
            roi_probe: 100,
            starting_points: 1000,
            max_username_len: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub rules: MarketRules,
    /// How long the mock host pretends to fetch a snapshot.
    pub load_delay_ms: u64,
    pub port: u16,
}
impl Default for Settings {
    fn default() -> Self {
        Self {
            rules: MarketRules::default(),
            load_delay_ms: 500,
            port: 8081,
        }
    }
}
impl Settings {
    /// Layers an optional config file and `POINTSMARKET_*` environment
    /// variables over the defaults. Nested keys use `__`, e.g.
    /// `POINTSMARKET_RULES__PROTOCOL_FEE_BPS=250`.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let file = path.unwrap_or(DEFAULT_CONFIG_FILE);
        let settings = Config::builder()
            .add_source(File::with_name(file).required(path.is_some()))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .with_context(|| format!("failed to read settings from {}", file))?
            .try_deserialize::<Settings>()
            .context("failed to deserialize settings")?;
        debug!("Loaded settings {:?}", settings);
        Ok(settings)
    }
    pub fn load_delay(&self) -> Duration {
        Duration::from_millis(self.load_delay_ms)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_match_the_market() {
        let rules = MarketRules::default();
        assert_eq!(rules.protocol_fee_bps, 200);
        assert_eq!(rules.listing_fee, 10_000_000);
        assert_eq!(rules.sell_threshold, 10_000);
        assert_eq!(rules.roi_probe, 100);
        assert_eq!(Settings::default().load_delay(), Duration::from_millis(500));
    }

    #[test]
    fn missing_default_file_is_fine() {
        let settings = Settings::load(None).unwrap();
        assert_eq!(settings.rules, MarketRules::default());
    }

    #[test]
    fn explicit_file_must_exist() {
        assert!(Settings::load(Some("does/not/exist")).is_err());
    }
}
