//! Treasury configuration.
//!
//! Parameters fixed at construction and later adjustable through privileged
//! operations. Configuration is plain JSON on disk, with environment overrides
//! for the numeric knobs.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::fees::FeeStructure;
use crate::error::{Error, Result};
use crate::utils::constants::*;

/// Environment variable overriding the withdrawal delay (seconds)
pub const ENV_WITHDRAWAL_DELAY: &str = "TREASURY_WITHDRAWAL_DELAY";

/// Environment variable overriding the approval threshold
pub const ENV_REQUIRED_APPROVALS: &str = "TREASURY_REQUIRED_APPROVALS";

/// Environment variable overriding the deployment cap
pub const ENV_MAX_DEPLOYMENT: &str = "TREASURY_MAX_DEPLOYMENT";

// ═══════════════════════════════════════════════════════════════════════════════
// TREASURY CONFIGURATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Initial treasury parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreasuryConfig {
    /// Minimum seconds between a withdrawal request and its execution
    pub withdrawal_delay_secs: u64,

    /// Distinct operator approvals needed for quorum-gated operations
    pub required_approvals: u32,

    /// Cap on a single stability fund deployment
    pub max_deployment: u64,

    /// Initial fee rates and distribution shares
    pub fee_structure: FeeStructure,
}

impl Default for TreasuryConfig {
    fn default() -> Self {
        Self {
            withdrawal_delay_secs: DEFAULT_WITHDRAWAL_DELAY_SECS,
            required_approvals: DEFAULT_REQUIRED_APPROVALS,
            max_deployment: DEFAULT_MAX_DEPLOYMENT,
            fee_structure: FeeStructure::default(),
        }
    }
}

impl TreasuryConfig {
    /// Configuration for test deployments (short delay, single approval)
    pub fn testnet() -> Self {
        Self {
            withdrawal_delay_secs: 60,
            required_approvals: 1,
            ..Default::default()
        }
    }

    /// Builder-style delay override
    pub fn with_withdrawal_delay(mut self, secs: u64) -> Self {
        self.withdrawal_delay_secs = secs;
        self
    }

    /// Builder-style threshold override
    pub fn with_required_approvals(mut self, required: u32) -> Self {
        self.required_approvals = required;
        self
    }

    /// Validate parameters are consistent
    pub fn validate(&self) -> Result<()> {
        if self.required_approvals == 0 {
            return Err(Error::InvalidConfiguration("required_approvals must be positive".into()));
        }
        self.fee_structure.validate()
    }

    /// Load from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save to a JSON file, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply overrides from the process environment
    pub fn from_env(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_WITHDRAWAL_DELAY) {
            self.withdrawal_delay_secs = parse_override(ENV_WITHDRAWAL_DELAY, &value)?;
        }
        if let Some(value) = lookup(ENV_REQUIRED_APPROVALS) {
            self.required_approvals = parse_override(ENV_REQUIRED_APPROVALS, &value)?;
        }
        if let Some(value) = lookup(ENV_MAX_DEPLOYMENT) {
            self.max_deployment = parse_override(ENV_MAX_DEPLOYMENT, &value)?;
        }
        self.validate()?;
        Ok(self)
    }
}

fn parse_override<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::InvalidConfiguration(format!("{}: cannot parse {:?}", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_config_default() {
        let config = TreasuryConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.withdrawal_delay_secs, DEFAULT_WITHDRAWAL_DELAY_SECS);
        assert_eq!(config.required_approvals, DEFAULT_REQUIRED_APPROVALS);
    }

    #[test]
    fn test_config_validation() {
        assert!(TreasuryConfig::default().with_required_approvals(0).validate().is_err());

        let mut config = TreasuryConfig::testnet();
        config.fee_structure.development_share = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_WITHDRAWAL_DELAY, "3600"),
            (ENV_REQUIRED_APPROVALS, " 3 "),
        ]
        .into_iter()
        .collect();

        let config = TreasuryConfig::default()
            .with_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.withdrawal_delay_secs, 3600);
        assert_eq!(config.required_approvals, 3);
        assert_eq!(config.max_deployment, DEFAULT_MAX_DEPLOYMENT);
    }

    #[test]
    fn test_bad_overrides() {
        let result = TreasuryConfig::default()
            .with_overrides(|key| (key == ENV_MAX_DEPLOYMENT).then(|| "lots".to_string()));
        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));

        let result = TreasuryConfig::default()
            .with_overrides(|key| (key == ENV_REQUIRED_APPROVALS).then(|| "0".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("treasury.json");

        let config = TreasuryConfig::testnet().with_withdrawal_delay(90);
        config.save(&path).unwrap();

        let loaded = TreasuryConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: TreasuryConfig = serde_json::from_str(r#"{"required_approvals": 4}"#).unwrap();
        assert_eq!(config.required_approvals, 4);
        assert_eq!(config.fee_structure, FeeStructure::default());
    }
}
