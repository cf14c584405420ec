//! # Outcome Token Ledger
//!
//! One fungible token per (market, outcome). Only the market a token set was
//! registered for may mint or burn it, so the total supply of outcome `k`
//! always mirrors the market's `outstanding_supply[k]`.

use crate::{error::Result, utils::Address, MarketError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The token set of a single market.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct MarketTokens {
    /// The only address allowed to mint and burn
    pub minter: Address,
    supplies: Vec<u128>,
    balances: Vec<BTreeMap<Address, u128>>,
}

impl MarketTokens {
    fn new(minter: Address, outcomes: usize) -> Self {
        Self {
            minter,
            supplies: vec![0; outcomes],
            balances: vec![BTreeMap::new(); outcomes],
        }
    }

    pub fn outcome_count(&self) -> usize {
        self.supplies.len()
    }

    fn check_outcome(&self, outcome: usize) -> Result<()> {
        if outcome >= self.supplies.len() {
            return Err(MarketError::UnknownOutcome {
                index: outcome,
                count: self.supplies.len(),
            });
        }
        Ok(())
    }
}

/// Ledger of every market's outcome tokens.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct OutcomeTokenLedger {
    markets: BTreeMap<Address, MarketTokens>,
}

impl OutcomeTokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the token set for `market`, mintable only by `minter`.
    pub fn register(&mut self, market: Address, minter: Address, outcomes: usize) -> Result<()> {
        if self.markets.contains_key(&market) {
            return Err(MarketError::AlreadyRegistered(market));
        }
        if minter.is_zero() {
            return Err(MarketError::ZeroAddress("outcome token minter"));
        }
        self.markets.insert(market, MarketTokens::new(minter, outcomes));
        Ok(())
    }

    pub fn tokens(&self, market: &Address) -> Option<&MarketTokens> {
        self.markets.get(market)
    }

    pub fn balance_of(&self, market: &Address, outcome: usize, holder: &Address) -> u128 {
        self.markets
            .get(market)
            .and_then(|t| t.balances.get(outcome))
            .and_then(|b| b.get(holder))
            .copied()
            .unwrap_or(0)
    }

    /// Balances of every outcome held by `holder`.
    pub fn balances_of(&self, market: &Address, holder: &Address) -> Vec<u128> {
        match self.markets.get(market) {
            Some(t) => (0..t.outcome_count())
                .map(|k| self.balance_of(market, k, holder))
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn total_supply(&self, market: &Address, outcome: usize) -> u128 {
        self.markets
            .get(market)
            .and_then(|t| t.supplies.get(outcome))
            .copied()
            .unwrap_or(0)
    }

    /// Holders of a given outcome token with a non-zero balance.
    pub fn holders(&self, market: &Address, outcome: usize) -> Vec<Address> {
        self.markets
            .get(market)
            .and_then(|t| t.balances.get(outcome))
            .map(|b| b.keys().copied().collect())
            .unwrap_or_default()
    }

    pub fn mint(
        &mut self,
        caller: &Address,
        market: &Address,
        outcome: usize,
        to: Address,
        amount: u128,
    ) -> Result<()> {
        if to.is_zero() {
            return Err(MarketError::ZeroAddress("outcome token recipient"));
        }
        let tokens = self.authorized(caller, market)?;
        tokens.check_outcome(outcome)?;
        let supply = tokens.supplies[outcome]
            .checked_add(amount)
            .ok_or(MarketError::Overflow("outcome supply"))?;
        tokens.supplies[outcome] = supply;
        *tokens.balances[outcome].entry(to).or_insert(0) += amount;
        Ok(())
    }

    pub fn burn(
        &mut self,
        caller: &Address,
        market: &Address,
        outcome: usize,
        from: &Address,
        amount: u128,
    ) -> Result<()> {
        self.ensure_balance(market, outcome, from, amount)?;
        let tokens = self.authorized(caller, market)?;
        tokens.supplies[outcome] -= amount;
        let balances = &mut tokens.balances[outcome];
        if let Some(b) = balances.get_mut(from) {
            *b -= amount;
            if *b == 0 {
                balances.remove(from);
            }
        }
        Ok(())
    }

    /// Holder-initiated transfer of outcome shares.
    pub fn transfer(
        &mut self,
        market: &Address,
        outcome: usize,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<()> {
        if to.is_zero() {
            return Err(MarketError::ZeroAddress("outcome token recipient"));
        }
        self.ensure_balance(market, outcome, &from, amount)?;
        let tokens = self
            .markets
            .get_mut(market)
            .ok_or_else(|| MarketError::MarketNotFound(market.to_string()))?;
        let balances = &mut tokens.balances[outcome];
        if let Some(b) = balances.get_mut(&from) {
            *b -= amount;
            if *b == 0 {
                balances.remove(&from);
            }
        }
        if amount > 0 {
            *balances.entry(to).or_insert(0) += amount;
        }
        Ok(())
    }

    /// Check `holder` owns at least `amount` of `outcome` without touching state.
    pub fn ensure_balance(
        &self,
        market: &Address,
        outcome: usize,
        holder: &Address,
        amount: u128,
    ) -> Result<()> {
        let tokens = self
            .markets
            .get(market)
            .ok_or_else(|| MarketError::MarketNotFound(market.to_string()))?;
        tokens.check_outcome(outcome)?;
        let available = self.balance_of(market, outcome, holder);
        if available < amount {
            return Err(MarketError::InsufficientShares {
                outcome,
                available,
                required: amount,
            });
        }
        Ok(())
    }

    fn authorized(&mut self, caller: &Address, market: &Address) -> Result<&mut MarketTokens> {
        let tokens = self
            .markets
            .get_mut(market)
            .ok_or_else(|| MarketError::MarketNotFound(market.to_string()))?;
        if tokens.minter != *caller {
            return Err(MarketError::Unauthorized(format!(
                "{caller} cannot mint or burn outcome tokens of {market}"
            )));
        }
        Ok(tokens)
    }
}
