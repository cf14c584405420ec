//! Protocol deployment configuration.

use crate::{error::Result, oracle::AdapterConfig, utils::Address, MarketError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Everything needed to deploy a fresh [`crate::Protocol`].
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ProtocolConfig {
    /// Council admin, adapter admin and fee router admin
    pub admin: Address,
    /// Destination of distributed trading fees
    pub fee_recipient: Address,
    /// Display symbol of the wrapped collateral
    pub collateral_symbol: String,
    /// One oracle adapter is deployed per entry
    pub adapters: Vec<AdapterConfig>,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            admin: Address::from_label("bondmarket/admin"),
            fee_recipient: Address::from_label("bondmarket/treasury"),
            collateral_symbol: "WETH".to_string(),
            adapters: vec![
                AdapterConfig::crypto(),
                AdapterConfig::sports(),
                AdapterConfig::trends(),
            ],
        }
    }
}

impl ProtocolConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.admin.is_zero() {
            return Err(MarketError::ZeroAddress("admin"));
        }
        if self.fee_recipient.is_zero() {
            return Err(MarketError::ZeroAddress("fee recipient"));
        }
        if self.collateral_symbol.trim().is_empty() {
            return Err(MarketError::Other("collateral symbol is empty".to_string()));
        }
        if self.adapters.is_empty() {
            return Err(MarketError::Oracle("at least one adapter is required".to_string()));
        }
        let mut seen = BTreeSet::new();
        for adapter in &self.adapters {
            adapter.validate()?;
            if !seen.insert(adapter.category.as_str()) {
                return Err(MarketError::Oracle(format!(
                    "duplicate adapter category: {}",
                    adapter.category
                )));
            }
        }
        Ok(())
    }

    pub fn adapter(&self, category: &str) -> Option<&AdapterConfig> {
        self.adapters.iter().find(|a| a.category == category)
    }
}
