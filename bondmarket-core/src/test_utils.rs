//! Common test utilities for bondmarket-core tests.
//!
//! This module provides shared functionality for testing across all modules,
//! including seeded markets, funded traders and a small protocol fixture.

use crate::{
    collateral::CollateralToken,
    config::ProtocolConfig,
    curve::TradeQuote,
    error::Result,
    fees::FeeRouter,
    market::{Ledgers, Market, MarketParams, MarketVariant},
    outcome_token::OutcomeTokenLedger,
    protocol::Protocol,
    utils::{derive_market_address, Address, MarketKey},
    UNIT,
};

/// Shared test constants for consistent test setup.
pub mod constants {
    /// Trading opens (2025-01-01 00:00:00 UTC)
    pub const TEST_START: u64 = 1_735_689_600;
    /// Trading ends one week later
    pub const TEST_END: u64 = TEST_START + 7 * 86_400;
    /// Resolution deadline three days after the end
    pub const TEST_DEADLINE: u64 = TEST_END + 3 * 86_400;
    /// Collateral handed to the default creator
    pub const CREATOR_FUNDS: u128 = 1_000_000 * crate::UNIT;
}

use constants::*;

/// Creation parameters with deterministic addresses derived from `label`.
pub fn market_params(label: &str) -> MarketParams {
    MarketParams {
        question: format!("Will {label} happen?"),
        metadata_uri: format!("ipfs://{label}"),
        creator: Address::from_label("creator"),
        oracle_adapter: Address::from_label("adapter"),
        fee_router: Address::from_label("fee-router"),
        market_key: MarketKey::from_label(label),
        fee_bps: 100,
        liquidity: 100 * UNIT,
        start_time: TEST_START,
        end_time: TEST_END,
        resolution_deadline: TEST_DEADLINE,
    }
}

/// A seeded market with its own ledgers, driven at a settable clock.
pub struct MarketHarness {
    pub market: Market,
    pub collateral: CollateralToken,
    pub tokens: OutcomeTokenLedger,
    pub fees: FeeRouter,
    pub now: u64,
}

impl MarketHarness {
    pub fn binary(liquidity: u128, fee_bps: u16) -> Self {
        Self::build(MarketVariant::Binary, liquidity, fee_bps)
    }

    pub fn multi(liquidity: u128, fee_bps: u16, labels: &[&str]) -> Self {
        let labels = labels.iter().map(|l| l.to_string()).collect();
        Self::build(MarketVariant::Multi { labels }, liquidity, fee_bps)
    }

    pub fn scalar(liquidity: u128, fee_bps: u16, lower_bound: i128, upper_bound: i128) -> Self {
        Self::build(
            MarketVariant::Scalar {
                lower_bound,
                upper_bound,
            },
            liquidity,
            fee_bps,
        )
    }

    fn build(variant: MarketVariant, liquidity: u128, fee_bps: u16) -> Self {
        let factory = Address::from_label("factory");
        let mut params = market_params(variant.tag());
        params.liquidity = liquidity;
        params.fee_bps = fee_bps;

        let mut collateral = CollateralToken::new("WETH");
        collateral.deposit(params.creator, CREATOR_FUNDS).unwrap();
        collateral
            .approve(params.creator, factory, liquidity)
            .unwrap();

        let fees = FeeRouter::new(
            params.fee_router,
            Address::from_label("treasury"),
            Address::from_label("admin"),
        )
        .unwrap();
        let address = derive_market_address(&factory, variant.tag(), &params.market_key);
        let mut market = Market::new(0, address, factory, params, variant, TEST_START - 3_600).unwrap();
        let mut tokens = OutcomeTokenLedger::new();
        market.seed(&mut collateral, &mut tokens, &factory).unwrap();

        Self {
            market,
            collateral,
            tokens,
            fees,
            now: TEST_START,
        }
    }

    /// Split the harness into the market and the ledgers it settles against.
    fn split(&mut self) -> (&mut Market, Ledgers<'_>, u64) {
        let MarketHarness {
            market,
            collateral,
            tokens,
            fees,
            now,
        } = self;
        (
            market,
            Ledgers {
                collateral,
                tokens,
                fees,
            },
            *now,
        )
    }

    pub fn buy(&mut self, trader: Address, outcome: usize, shares: u128, max_cost: u128) -> Result<TradeQuote> {
        let (market, mut ledgers, now) = self.split();
        market.buy(&mut ledgers, trader, outcome, shares, max_cost, now)
    }

    pub fn sell(&mut self, trader: Address, outcome: usize, shares: u128, min_payout: u128) -> Result<TradeQuote> {
        let (market, mut ledgers, now) = self.split();
        market.sell(&mut ledgers, trader, outcome, shares, min_payout, now)
    }

    pub fn redeem(&mut self, holder: Address) -> Result<u128> {
        let (market, mut ledgers, _) = self.split();
        market.redeem(&mut ledgers, holder)
    }

    /// Close at the end of trading and resolve with `value` as the adapter.
    pub fn settle(&mut self, value: i128) {
        let adapter = self.market.oracle_adapter;
        self.market.close(TEST_END).unwrap();
        self.market.resolve(&adapter, value, TEST_END).unwrap();
        self.now = TEST_END;
    }
}

/// Fund a fresh trader and let them spend freely through the harness market.
pub fn funded_trader(h: &mut MarketHarness, label: &str, amount: u128) -> Address {
    let trader = Address::from_label(label);
    h.collateral.deposit(trader, amount).unwrap();
    h.collateral
        .approve(trader, h.market.address, u128::MAX)
        .unwrap();
    trader
}

/// A deployed protocol with a council member and funded actors.
pub struct ProtocolFixture {
    pub protocol: Protocol,
    pub admin: Address,
    pub creator: Address,
    pub member: Address,
    pub reporter: Address,
    pub disputer: Address,
}

impl ProtocolFixture {
    /// Parameters for a market resolved by the `category` adapter.
    pub fn params(&self, label: &str, category: &str) -> MarketParams {
        let mut params = market_params(label);
        params.creator = self.creator;
        params.fee_router = self.protocol.fees.address;
        params.oracle_adapter = self.protocol.adapter(category).unwrap().address;
        params
    }

    /// Fund a trader and approve `market` to spend for them.
    pub fn trader(&mut self, label: &str, amount: u128, market: &Address) -> Address {
        let trader = Address::from_label(label);
        self.protocol.deposit(trader, amount).unwrap();
        self.protocol.approve(trader, *market, u128::MAX).unwrap();
        trader
    }
}

pub fn protocol_fixture() -> ProtocolFixture {
    let config = ProtocolConfig::default();
    let admin = config.admin;
    let mut protocol = Protocol::new(config).unwrap();

    let creator = Address::from_label("creator");
    let member = Address::from_label("council-member");
    let reporter = Address::from_label("reporter");
    let disputer = Address::from_label("disputer");

    protocol.set_council_member(&admin, member, true).unwrap();
    protocol.deposit(creator, CREATOR_FUNDS).unwrap();
    let factories: Vec<Address> = protocol.factories().iter().map(|f| f.address).collect();
    for factory in factories {
        protocol.approve(creator, factory, u128::MAX).unwrap();
    }
    protocol.deposit(reporter, 1_000 * UNIT).unwrap();
    protocol.deposit(disputer, 1_000 * UNIT).unwrap();

    ProtocolFixture {
        protocol,
        admin,
        creator,
        member,
        reporter,
        disputer,
    }
}
