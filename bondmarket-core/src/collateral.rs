//! # Collateral Asset
//!
//! A wrapped-native fungible token. Every trade, bond, fee and payout in the
//! system moves units of this one asset. Balances are held per [`Address`],
//! including the custody accounts of markets, oracle adapters and the fee router.

use crate::{error::Result, utils::Address, MarketError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Fungible collateral ledger with ERC-20 style allowances.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct CollateralToken {
    /// Ticker shown by front ends (e.g. "WETH")
    pub symbol: String,
    balances: BTreeMap<Address, u128>,
    allowances: BTreeMap<Address, BTreeMap<Address, u128>>,
    total_supply: u128,
}

impl CollateralToken {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Self::default()
        }
    }

    pub fn balance_of(&self, owner: &Address) -> u128 {
        self.balances.get(owner).copied().unwrap_or(0)
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> u128 {
        self.allowances
            .get(owner)
            .and_then(|m| m.get(spender))
            .copied()
            .unwrap_or(0)
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    /// Wrap `amount` of the native asset into collateral for `owner`.
    pub fn deposit(&mut self, owner: Address, amount: u128) -> Result<()> {
        if owner.is_zero() {
            return Err(MarketError::ZeroAddress("deposit owner"));
        }
        let total = self
            .total_supply
            .checked_add(amount)
            .ok_or(MarketError::Overflow("collateral supply"))?;
        let balance = self
            .balance_of(&owner)
            .checked_add(amount)
            .ok_or(MarketError::Overflow("collateral balance"))?;
        self.total_supply = total;
        self.balances.insert(owner, balance);
        debug!(%owner, amount, "collateral wrapped");
        Ok(())
    }

    /// Unwrap collateral back into the native asset.
    pub fn withdraw(&mut self, owner: Address, amount: u128) -> Result<()> {
        self.ensure_balance(&owner, amount)?;
        self.debit(&owner, amount);
        self.total_supply -= amount;
        debug!(%owner, amount, "collateral unwrapped");
        Ok(())
    }

    /// Set the amount `spender` may move out of `owner`'s balance.
    pub fn approve(&mut self, owner: Address, spender: Address, amount: u128) -> Result<()> {
        if spender.is_zero() {
            return Err(MarketError::ZeroAddress("spender"));
        }
        self.allowances
            .entry(owner)
            .or_default()
            .insert(spender, amount);
        Ok(())
    }

    /// Move `amount` from `from` to `to`, authorised by `from` itself.
    pub fn transfer(&mut self, from: Address, to: Address, amount: u128) -> Result<()> {
        if to.is_zero() {
            return Err(MarketError::ZeroAddress("transfer recipient"));
        }
        self.ensure_balance(&from, amount)?;
        self.ensure_credit(&to, amount)?;
        self.debit(&from, amount);
        self.credit(to, amount);
        Ok(())
    }

    /// Move `amount` from `from` to `to` on behalf of `spender`, consuming allowance.
    pub fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<()> {
        if to.is_zero() {
            return Err(MarketError::ZeroAddress("transfer recipient"));
        }
        self.ensure_allowance(&from, &spender, amount)?;
        self.ensure_balance(&from, amount)?;
        self.ensure_credit(&to, amount)?;
        if let Some(m) = self.allowances.get_mut(&from) {
            if let Some(a) = m.get_mut(&spender) {
                *a -= amount;
            }
        }
        self.debit(&from, amount);
        self.credit(to, amount);
        Ok(())
    }

    /// Check that `owner` can pay `amount` without touching any state.
    pub fn ensure_balance(&self, owner: &Address, amount: u128) -> Result<()> {
        let available = self.balance_of(owner);
        if available < amount {
            return Err(MarketError::InsufficientBalance {
                account: *owner,
                available,
                required: amount,
            });
        }
        Ok(())
    }

    /// Check that `spender` may move `amount` out of `owner`.
    pub fn ensure_allowance(&self, owner: &Address, spender: &Address, amount: u128) -> Result<()> {
        let available = self.allowance(owner, spender);
        if available < amount {
            return Err(MarketError::InsufficientAllowance {
                spender: *spender,
                available,
                required: amount,
            });
        }
        Ok(())
    }

    fn ensure_credit(&self, to: &Address, amount: u128) -> Result<()> {
        self.balance_of(to)
            .checked_add(amount)
            .map(|_| ())
            .ok_or(MarketError::Overflow("collateral balance"))
    }

    fn debit(&mut self, owner: &Address, amount: u128) {
        if let Some(b) = self.balances.get_mut(owner) {
            *b -= amount;
            if *b == 0 {
                self.balances.remove(owner);
            }
        }
    }

    fn credit(&mut self, owner: Address, amount: u128) {
        if amount > 0 {
            *self.balances.entry(owner).or_insert(0) += amount;
        }
    }
}
