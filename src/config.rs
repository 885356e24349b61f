use crate::currency::Currency;
use crate::rates::ManualRates;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::{fs, path::PathBuf};
use tracing::debug;

/// Per-platform payout policy. Fee applicability and native currency are
/// explicit attributes here, keyed by platform identity, instead of being
/// inferred from the platform name.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PlatformPolicy {
    pub currency: Currency,
    /// Minimum native-currency balance required to request payout.
    #[serde(default)]
    pub threshold: f64,
    /// Whether the platform deducts the configurable fee percentage.
    #[serde(default)]
    pub fee_bearing: bool,
}

impl Default for PlatformPolicy {
    fn default() -> Self {
        PlatformPolicy {
            currency: Currency::Usd,
            threshold: 0.0,
            fee_bearing: false,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RatesProviderConfig {
    pub base_url: String,
}

impl Default for RatesProviderConfig {
    fn default() -> Self {
        RatesProviderConfig {
            base_url: "https://api.frankfurter.app".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_platforms")]
    pub platforms: HashMap<String, PlatformPolicy>,
    #[serde(default)]
    pub provider: RatesProviderConfig,
    /// Default display currency.
    #[serde(default = "default_currency")]
    pub currency: Currency,
    /// Default manual conversion rates.
    #[serde(default)]
    pub rates: ManualRates,
    /// Fee percentage applied to fee-bearing platforms.
    #[serde(default = "default_fee_pct")]
    pub fee_pct: f64,
    /// Path to the earnings dataset; can be overridden on the command line.
    #[serde(default)]
    pub data_file: Option<PathBuf>,
}

fn default_currency() -> Currency {
    Currency::Brl
}

fn default_fee_pct() -> f64 {
    24.0
}

fn default_platforms() -> HashMap<String, PlatformPolicy> {
    let policy = |currency, threshold, fee_bearing| PlatformPolicy {
        currency,
        threshold,
        fee_bearing,
    };
    HashMap::from([
        ("Adobe Stock".to_string(), policy(Currency::Usd, 25.0, false)),
        ("Freepik".to_string(), policy(Currency::Eur, 50.0, true)),
        (
            "Shutterstock".to_string(),
            policy(Currency::Usd, 35.0, false),
        ),
        (
            "Getty Images".to_string(),
            policy(Currency::Usd, 50.0, false),
        ),
        (
            "Deposite Photos".to_string(),
            policy(Currency::Usd, 50.0, false),
        ),
        ("123RF".to_string(), policy(Currency::Usd, 50.0, false)),
        (
            "Dreamstime".to_string(),
            policy(Currency::Usd, 100.0, false),
        ),
        ("Alamy".to_string(), policy(Currency::Usd, 50.0, false)),
    ])
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            platforms: default_platforms(),
            provider: RatesProviderConfig::default(),
            currency: default_currency(),
            rates: ManualRates::default(),
            fee_pct: default_fee_pct(),
            data_file: None,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("in", "codito", "mstk")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Policy for a platform; unknown platforms get the default policy
    /// (USD, no threshold, no fee).
    pub fn policy(&self, platform: &str) -> PlatformPolicy {
        self.platforms.get(platform).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config: AppConfig = serde_yaml::from_str("{}").expect("Failed to deserialize");
        assert_eq!(config.currency, Currency::Brl);
        assert_eq!(config.rates.usd_brl, 5.0);
        assert_eq!(config.rates.eur_brl, 6.0);
        assert_eq!(config.fee_pct, 24.0);
        assert_eq!(config.provider.base_url, "https://api.frankfurter.app");
        assert_eq!(config.platforms.len(), 8);

        let freepik = config.policy("Freepik");
        assert_eq!(freepik.currency, Currency::Eur);
        assert_eq!(freepik.threshold, 50.0);
        assert!(freepik.fee_bearing);

        let unknown = config.policy("Somewhere Else");
        assert_eq!(unknown.currency, Currency::Usd);
        assert_eq!(unknown.threshold, 0.0);
        assert!(!unknown.fee_bearing);
    }

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
platforms:
  "Adobe Stock":
    currency: USD
    threshold: 25
  "Freepik":
    currency: EUR
    threshold: 50
    fee_bearing: true
provider:
  base_url: "http://example.com/rates"
currency: "USD"
rates:
  usd_brl: 5.25
  eur_brl: 6.10
fee_pct: 20
data_file: "/tmp/dados.json"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.platforms.len(), 2);
        assert_eq!(config.currency, Currency::Usd);
        assert_eq!(config.rates.usd_brl, 5.25);
        assert_eq!(config.rates.eur_brl, 6.10);
        assert_eq!(config.fee_pct, 20.0);
        assert_eq!(config.provider.base_url, "http://example.com/rates");
        assert_eq!(config.data_file, Some(PathBuf::from("/tmp/dados.json")));
        assert!(!config.policy("Adobe Stock").fee_bearing);
        assert!(config.policy("Freepik").fee_bearing);
    }
}
