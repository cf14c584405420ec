//! # Market Factory
//!
//! Each factory builds one market variant. It assigns sequential ids, derives
//! the market's custody address from its own address and the caller's
//! market key, and seeds the new market with the creator's liquidity.

use crate::{
    collateral::CollateralToken,
    error::Result,
    market::{Market, MarketParams, MarketVariant},
    outcome_token::OutcomeTokenLedger,
    utils::{derive_market_address, Address, MarketKey},
    MarketError,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Which variant a factory builds.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum FactoryKind {
    Binary,
    Multi,
    Scalar,
}

impl FactoryKind {
    fn of(variant: &MarketVariant) -> Self {
        match variant {
            MarketVariant::Binary => FactoryKind::Binary,
            MarketVariant::Multi { .. } => FactoryKind::Multi,
            MarketVariant::Scalar { .. } => FactoryKind::Scalar,
        }
    }
}

impl fmt::Display for FactoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FactoryKind::Binary => "binary",
            FactoryKind::Multi => "multi",
            FactoryKind::Scalar => "scalar",
        };
        f.write_str(s)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct MarketFactory {
    pub address: Address,
    pub kind: FactoryKind,
    markets: Vec<Market>,
    keys: BTreeMap<MarketKey, u64>,
}

impl MarketFactory {
    pub fn new(address: Address, kind: FactoryKind) -> Result<Self> {
        if address.is_zero() {
            return Err(MarketError::ZeroAddress("factory"));
        }
        Ok(Self {
            address,
            kind,
            markets: Vec::new(),
            keys: BTreeMap::new(),
        })
    }

    /// Validate `params` and build the unseeded market the factory would create,
    /// without recording anything.
    pub fn prepare(&self, params: MarketParams, variant: MarketVariant, now: u64) -> Result<Market> {
        if FactoryKind::of(&variant) != self.kind {
            return Err(MarketError::InvalidMarket(format!(
                "{} factory cannot build a {} market",
                self.kind,
                variant.tag()
            )));
        }
        if self.keys.contains_key(&params.market_key) {
            return Err(MarketError::DuplicateMarketKey(params.market_key.to_string()));
        }
        let address = derive_market_address(&self.address, variant.tag(), &params.market_key);
        Market::new(self.market_count(), address, self.address, params, variant, now)
    }

    /// Check a prepared market can be seeded by its creator.
    pub fn ensure_launchable(&self, market: &Market, collateral: &CollateralToken, tokens: &OutcomeTokenLedger) -> Result<()> {
        if market.factory != self.address || market.market_id != self.market_count() {
            return Err(MarketError::InvalidMarket(format!(
                "market {} was not prepared by this factory",
                market.address
            )));
        }
        if tokens.tokens(&market.address).is_some() {
            return Err(MarketError::AlreadyRegistered(market.address));
        }
        market.ensure_seedable(collateral, &self.address)
    }

    /// Seed a prepared market and record it.
    pub fn launch(
        &mut self,
        mut market: Market,
        collateral: &mut CollateralToken,
        tokens: &mut OutcomeTokenLedger,
    ) -> Result<(u64, Address)> {
        self.ensure_launchable(&market, collateral, tokens)?;
        market.seed(collateral, tokens, &self.address)?;
        let id = market.market_id;
        let address = market.address;
        self.keys.insert(market.market_key, id);
        self.markets.push(market);
        Ok((id, address))
    }

    pub fn market_count(&self) -> u64 {
        self.markets.len() as u64
    }

    pub fn market_of(&self, id: u64) -> Result<Address> {
        usize::try_from(id)
            .ok()
            .and_then(|i| self.markets.get(i))
            .map(|m| m.address)
            .ok_or_else(|| MarketError::MarketNotFound(format!("{} market #{id}", self.kind)))
    }

    pub fn all_markets(&self) -> Vec<Address> {
        self.markets.iter().map(|m| m.address).collect()
    }

    pub fn id_of_key(&self, key: &MarketKey) -> Option<u64> {
        self.keys.get(key).copied()
    }

    pub fn markets(&self) -> impl Iterator<Item = &Market> {
        self.markets.iter()
    }

    pub fn market(&self, address: &Address) -> Option<&Market> {
        self.markets.iter().find(|m| m.address == *address)
    }

    pub fn market_mut(&mut self, address: &Address) -> Option<&mut Market> {
        self.markets.iter_mut().find(|m| m.address == *address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{market::MarketState, test_utils, UNIT};

    fn setup(kind: FactoryKind) -> (MarketFactory, CollateralToken, OutcomeTokenLedger) {
        let factory = MarketFactory::new(Address::from_label(&format!("{kind}-factory")), kind).unwrap();
        let creator = test_utils::market_params("x").creator;
        let mut collateral = CollateralToken::new("WETH");
        collateral.deposit(creator, 10_000 * UNIT).unwrap();
        collateral
            .approve(creator, factory.address, u128::MAX)
            .unwrap();
        (factory, collateral, OutcomeTokenLedger::new())
    }

    // one-step creation used to exercise the factory on its own
    impl MarketFactory {
        pub fn create_binary(
            &mut self,
            collateral: &mut CollateralToken,
            tokens: &mut OutcomeTokenLedger,
            params: MarketParams,
            now: u64,
        ) -> Result<(u64, Address)> {
            let market = self.prepare(params, MarketVariant::Binary, now)?;
            self.launch(market, collateral, tokens)
        }

        pub fn create_multi(
            &mut self,
            collateral: &mut CollateralToken,
            tokens: &mut OutcomeTokenLedger,
            params: MarketParams,
            labels: Vec<String>,
            now: u64,
        ) -> Result<(u64, Address)> {
            let market = self.prepare(params, MarketVariant::Multi { labels }, now)?;
            self.launch(market, collateral, tokens)
        }

        pub fn create_scalar(
            &mut self,
            collateral: &mut CollateralToken,
            tokens: &mut OutcomeTokenLedger,
            params: MarketParams,
            lower_bound: i128,
            upper_bound: i128,
            now: u64,
        ) -> Result<(u64, Address)> {
            let variant = MarketVariant::Scalar {
                lower_bound,
                upper_bound,
            };
            let market = self.prepare(params, variant, now)?;
            self.launch(market, collateral, tokens)
        }
    }

    #[test]
    fn test_create_binary_seeds_market() {
        let (mut factory, mut collateral, mut tokens) = setup(FactoryKind::Binary);
        let params = test_utils::market_params("btc-100k");
        let creator = params.creator;

        let (id, address) = factory
            .create_binary(&mut collateral, &mut tokens, params, 1_000)
            .unwrap();
        assert_eq!(id, 0);
        assert_eq!(factory.market_count(), 1);
        assert_eq!(factory.market_of(0).unwrap(), address);
        assert_eq!(factory.all_markets(), vec![address]);

        let market = factory.market(&address).unwrap();
        assert_eq!(market.state(), MarketState::Open);
        assert_eq!(market.supplies(), &[100 * UNIT, 100 * UNIT]);
        assert_eq!(collateral.balance_of(&address), 100 * UNIT);
        assert_eq!(collateral.balance_of(&creator), 9_900 * UNIT);
        assert_eq!(tokens.balances_of(&address, &creator), vec![100 * UNIT, 100 * UNIT]);
    }

    #[test]
    fn test_sequential_ids() {
        let (mut factory, mut collateral, mut tokens) = setup(FactoryKind::Multi);
        let labels = || vec!["A".to_string(), "B".to_string(), "C".to_string()];
        let (a, _) = factory
            .create_multi(&mut collateral, &mut tokens, test_utils::market_params("one"), labels(), 1_000)
            .unwrap();
        let (b, addr) = factory
            .create_multi(&mut collateral, &mut tokens, test_utils::market_params("two"), labels(), 1_000)
            .unwrap();
        assert_eq!((a, b), (0, 1));
        assert_eq!(factory.market(&addr).unwrap().outcome_count(), 3);
        assert!(factory.market_of(2).is_err());
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let (mut factory, mut collateral, mut tokens) = setup(FactoryKind::Binary);
        factory
            .create_binary(&mut collateral, &mut tokens, test_utils::market_params("dup"), 1_000)
            .unwrap();
        let before = collateral.balance_of(&test_utils::market_params("dup").creator);
        let err = factory
            .create_binary(&mut collateral, &mut tokens, test_utils::market_params("dup"), 1_000)
            .unwrap_err();
        assert!(matches!(err, MarketError::DuplicateMarketKey(_)));
        assert_eq!(factory.market_count(), 1);
        assert_eq!(collateral.balance_of(&test_utils::market_params("dup").creator), before);
    }

    #[test]
    fn test_same_key_different_factories() {
        let (mut f1, mut collateral, mut tokens) = setup(FactoryKind::Binary);
        let mut f2 = MarketFactory::new(Address::from_label("other-factory"), FactoryKind::Binary).unwrap();
        let creator = test_utils::market_params("k").creator;
        collateral.approve(creator, f2.address, u128::MAX).unwrap();

        let (_, a1) = f1
            .create_binary(&mut collateral, &mut tokens, test_utils::market_params("k"), 1_000)
            .unwrap();
        let (_, a2) = f2
            .create_binary(&mut collateral, &mut tokens, test_utils::market_params("k"), 1_000)
            .unwrap();
        assert_ne!(a1, a2);
    }

    #[test]
    fn test_wrong_variant_rejected() {
        let (mut factory, mut collateral, mut tokens) = setup(FactoryKind::Binary);
        let err = factory
            .create_scalar(&mut collateral, &mut tokens, test_utils::market_params("s"), 0, 100, 1_000)
            .unwrap_err();
        assert!(matches!(err, MarketError::InvalidMarket(_)));
    }

    #[test]
    fn test_invalid_params_leave_no_trace() {
        let (mut factory, mut collateral, mut tokens) = setup(FactoryKind::Scalar);
        let params = test_utils::market_params("bad-bounds");
        let creator = params.creator;
        assert!(factory
            .create_scalar(&mut collateral, &mut tokens, params, 10, 10, 1_000)
            .is_err());

        let mut params = test_utils::market_params("bad-times");
        params.end_time = params.start_time;
        assert!(factory
            .create_scalar(&mut collateral, &mut tokens, params, 0, 10, 1_000)
            .is_err());

        assert_eq!(factory.market_count(), 0);
        assert_eq!(collateral.balance_of(&creator), 10_000 * UNIT);
    }

    #[test]
    fn test_unfunded_creator_rejected() {
        let (mut factory, mut collateral, mut tokens) = setup(FactoryKind::Binary);
        let mut params = test_utils::market_params("unfunded");
        params.creator = Address::from_label("broke");
        collateral
            .approve(params.creator, factory.address, u128::MAX)
            .unwrap();
        let err = factory
            .create_binary(&mut collateral, &mut tokens, params, 1_000)
            .unwrap_err();
        assert!(matches!(err, MarketError::InsufficientBalance { .. }));
        assert_eq!(factory.market_count(), 0);
    }
}
