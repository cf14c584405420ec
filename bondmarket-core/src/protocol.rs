//! # Protocol
//!
//! Wires every component together: one collateral ledger, one outcome token
//! ledger, one fee router, the curation council, a factory per market variant
//! and an oracle adapter per category. This is the only place where
//! components call each other.
//!
//! Each operation looks everything up and checks every precondition it can
//! before the first write, so an `Err` leaves the whole state untouched.

use crate::{
    collateral::CollateralToken,
    config::ProtocolConfig,
    curation::{CouncilRegistry, Curation, CurationStatus},
    curve::TradeQuote,
    error::Result,
    factory::{FactoryKind, MarketFactory},
    fees::FeeRouter,
    market::{Ledgers, Market, MarketParams, MarketState, MarketVariant, Resolution},
    oracle::{DesignatedArbitrator, OracleAdapter, ReportStatus, Ruling, ValueDomain},
    outcome_token::OutcomeTokenLedger,
    utils::Address,
    MarketError,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// The complete protocol state.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Protocol {
    pub config: ProtocolConfig,
    pub collateral: CollateralToken,
    pub tokens: OutcomeTokenLedger,
    pub fees: FeeRouter,
    pub council: CouncilRegistry,
    pub curation: Curation,
    /// Decides disputed reports; the protocol admin is the arbiter
    pub arbitrator: DesignatedArbitrator,
    binary_factory: MarketFactory,
    multi_factory: MarketFactory,
    scalar_factory: MarketFactory,
    /// Oracle adapters keyed by category
    adapters: BTreeMap<String, OracleAdapter>,
}

impl Protocol {
    /// Deploy every component described by `config`. All three factories are
    /// authorized on every adapter.
    pub fn new(config: ProtocolConfig) -> Result<Self> {
        config.validate()?;
        let admin = config.admin;

        let binary_factory = MarketFactory::new(
            Address::from_label("bondmarket/factory/binary"),
            FactoryKind::Binary,
        )?;
        let multi_factory = MarketFactory::new(
            Address::from_label("bondmarket/factory/multi"),
            FactoryKind::Multi,
        )?;
        let scalar_factory = MarketFactory::new(
            Address::from_label("bondmarket/factory/scalar"),
            FactoryKind::Scalar,
        )?;

        let mut adapters = BTreeMap::new();
        for adapter_config in &config.adapters {
            let address = Address::from_label(&format!("bondmarket/adapter/{}", adapter_config.category));
            let mut adapter = OracleAdapter::new(address, admin, adapter_config.clone())?;
            for factory in [&binary_factory, &multi_factory, &scalar_factory] {
                adapter.set_factory(&admin, factory.address, true)?;
            }
            adapters.insert(adapter_config.category.clone(), adapter);
        }

        let fees = FeeRouter::new(
            Address::from_label("bondmarket/fee-router"),
            config.fee_recipient,
            admin,
        )?;

        info!(
            %admin,
            adapters = adapters.len(),
            collateral = %config.collateral_symbol,
            "protocol deployed"
        );
        Ok(Self {
            collateral: CollateralToken::new(config.collateral_symbol.clone()),
            tokens: OutcomeTokenLedger::new(),
            fees,
            council: CouncilRegistry::new(admin)?,
            curation: Curation::new(),
            arbitrator: DesignatedArbitrator::new(admin),
            binary_factory,
            multi_factory,
            scalar_factory,
            adapters,
            config,
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    // ---- collateral ----

    /// Wrap native value into collateral.
    pub fn deposit(&mut self, owner: Address, amount: u128) -> Result<()> {
        self.collateral.deposit(owner, amount)
    }

    /// Unwrap collateral into native value.
    pub fn withdraw(&mut self, owner: Address, amount: u128) -> Result<()> {
        self.collateral.withdraw(owner, amount)
    }

    pub fn approve(&mut self, owner: Address, spender: Address, amount: u128) -> Result<()> {
        self.collateral.approve(owner, spender, amount)
    }

    pub fn transfer_shares(
        &mut self,
        market: &Address,
        outcome: usize,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<()> {
        self.tokens.transfer(market, outcome, from, to, amount)
    }

    // ---- market creation ----

    pub fn create_binary(&mut self, params: MarketParams, now: u64) -> Result<(u64, Address)> {
        self.create(FactoryKind::Binary, params, MarketVariant::Binary, now)
    }

    pub fn create_multi(&mut self, params: MarketParams, labels: Vec<String>, now: u64) -> Result<(u64, Address)> {
        self.create(FactoryKind::Multi, params, MarketVariant::Multi { labels }, now)
    }

    pub fn create_scalar(
        &mut self,
        params: MarketParams,
        lower_bound: i128,
        upper_bound: i128,
        now: u64,
    ) -> Result<(u64, Address)> {
        let variant = MarketVariant::Scalar {
            lower_bound,
            upper_bound,
        };
        self.create(FactoryKind::Scalar, params, variant, now)
    }

    fn create(
        &mut self,
        kind: FactoryKind,
        params: MarketParams,
        variant: MarketVariant,
        now: u64,
    ) -> Result<(u64, Address)> {
        if params.fee_router != self.fees.address {
            return Err(MarketError::InvalidMarket(format!(
                "unknown fee router {}",
                params.fee_router
            )));
        }
        let domain = match &variant {
            MarketVariant::Scalar { .. } => ValueDomain::Scalar,
            other => ValueDomain::Outcome {
                count: other.outcome_count(),
            },
        };
        let adapter_address = params.oracle_adapter;

        let factory = match kind {
            FactoryKind::Binary => &mut self.binary_factory,
            FactoryKind::Multi => &mut self.multi_factory,
            FactoryKind::Scalar => &mut self.scalar_factory,
        };
        let market = factory.prepare(params, variant, now)?;
        factory.ensure_launchable(&market, &self.collateral, &self.tokens)?;
        let adapter = adapter_by_address(&mut self.adapters, &adapter_address)?;
        adapter.ensure_registrable(&factory.address, &market.address)?;
        if self.curation.record(&market.address).is_some() {
            return Err(MarketError::AlreadyRegistered(market.address));
        }

        let factory_address = factory.address;
        let (id, address) = factory.launch(market, &mut self.collateral, &mut self.tokens)?;
        adapter.register_market(&factory_address, address, domain)?;
        self.curation.register(address, now)?;
        info!(
            %address,
            id,
            kind = %kind,
            category = %adapter.config.category,
            "market created"
        );
        Ok((id, address))
    }

    // ---- trading ----

    pub fn buy(
        &mut self,
        market: &Address,
        trader: Address,
        outcome: usize,
        shares: u128,
        max_cost: u128,
        now: u64,
    ) -> Result<TradeQuote> {
        let (market, mut ledgers) = self.market_and_ledgers(market)?;
        market.buy(&mut ledgers, trader, outcome, shares, max_cost, now)
    }

    pub fn sell(
        &mut self,
        market: &Address,
        trader: Address,
        outcome: usize,
        shares: u128,
        min_payout: u128,
        now: u64,
    ) -> Result<TradeQuote> {
        let (market, mut ledgers) = self.market_and_ledgers(market)?;
        market.sell(&mut ledgers, trader, outcome, shares, min_payout, now)
    }

    pub fn close(&mut self, market: &Address, now: u64) -> Result<()> {
        self.market_mut(market)?.close(now)
    }

    // ---- oracle ----

    /// Post a bonded report for a closed market.
    pub fn report(&mut self, reporter: Address, market: &Address, value: i128, now: u64) -> Result<()> {
        let m = self.market(market)?;
        ensure_closed(m)?;
        m.settlement_for(value, now)?;
        if m.is_resolution_overdue(now) {
            warn!(%market, deadline = m.resolution_deadline, now, "report submitted after resolution deadline");
        }
        let adapter_address = m.oracle_adapter;
        let adapter = adapter_by_address(&mut self.adapters, &adapter_address)?;
        adapter.report(&mut self.collateral, reporter, market, value, now)
    }

    pub fn dispute(&mut self, disputer: Address, market: &Address, now: u64) -> Result<()> {
        let adapter_address = self.market(market)?.oracle_adapter;
        let adapter = adapter_by_address(&mut self.adapters, &adapter_address)?;
        adapter.dispute(&mut self.collateral, disputer, market, now)
    }

    /// Finalize an undisputed report and resolve the market with its value.
    pub fn finalize(&mut self, market: &Address, now: u64) -> Result<Resolution> {
        let m = self.market(market)?;
        ensure_closed(m)?;
        let adapter_address = m.oracle_adapter;
        let adapter = self.adapter_at(&adapter_address)?;
        let value = adapter.ensure_finalizable(market, now)?;
        m.settlement_for(value, now)?;

        adapter_by_address(&mut self.adapters, &adapter_address)?.finalize(
            &mut self.collateral,
            market,
            now,
        )?;
        self.market_mut(market)?.resolve(&adapter_address, value, now)
    }

    /// Record the arbiter's decision on a disputed market.
    pub fn rule(&mut self, caller: &Address, market: &Address, ruling: Ruling) -> Result<()> {
        self.market(market)?;
        self.arbitrator.rule(caller, *market, ruling)
    }

    /// Apply the arbiter's ruling to a disputed report and resolve the market.
    pub fn settle_dispute(&mut self, market: &Address, now: u64) -> Result<Resolution> {
        let m = self.market(market)?;
        ensure_closed(m)?;
        let adapter_address = m.oracle_adapter;
        let adapter = self.adapter_at(&adapter_address)?;
        let (_, ruling) = adapter.ensure_adjudicable(market, &self.arbitrator)?;
        m.settlement_for(ruling.final_value, now)?;

        let value = adapter_by_address(&mut self.adapters, &adapter_address)?.settle_dispute(
            &mut self.collateral,
            market,
            &self.arbitrator,
            now,
        )?;
        self.market_mut(market)?.resolve(&adapter_address, value, now)
    }

    // ---- settlement ----

    pub fn redeem(&mut self, market: &Address, holder: Address) -> Result<u128> {
        let (market, mut ledgers) = self.market_and_ledgers(market)?;
        market.redeem(&mut ledgers, holder)
    }

    pub fn withdraw_surplus(&mut self, market: &Address, caller: &Address) -> Result<u128> {
        let (market, ledgers) = self.market_and_ledgers(market)?;
        market.withdraw_surplus(ledgers.collateral, caller)
    }

    // ---- curation ----

    pub fn approve_market(&mut self, caller: &Address, market: &Address, now: u64) -> Result<()> {
        self.market(market)?;
        self.curation.approve_market(&self.council, caller, market, now)
    }

    pub fn flag_market(&mut self, caller: &Address, market: &Address, now: u64) -> Result<()> {
        self.market(market)?;
        self.curation.flag_market(&self.council, caller, market, now)
    }

    pub fn reset_market(&mut self, caller: &Address, market: &Address, now: u64) -> Result<()> {
        self.market(market)?;
        self.curation.reset_market(&self.council, caller, market, now)
    }

    pub fn set_council_member(&mut self, caller: &Address, member: Address, enabled: bool) -> Result<()> {
        self.council.set_council_member(caller, member, enabled)
    }

    pub fn status_of(&self, market: &Address) -> Result<CurationStatus> {
        self.curation.status_of(market)
    }

    // ---- administration ----

    /// Authorize or revoke a factory on the adapter serving `category`.
    pub fn set_factory(&mut self, caller: &Address, category: &str, factory: Address, allowed: bool) -> Result<()> {
        self.adapters
            .get_mut(category)
            .ok_or_else(|| MarketError::Oracle(format!("no adapter for category {category}")))?
            .set_factory(caller, factory, allowed)
    }

    pub fn distribute_fees(&mut self) -> Result<u128> {
        self.fees.distribute(&mut self.collateral)
    }

    pub fn set_fee_recipient(&mut self, caller: &Address, recipient: Address) -> Result<()> {
        self.fees.set_recipient(caller, recipient)
    }

    // ---- queries ----

    pub fn factory(&self, kind: FactoryKind) -> &MarketFactory {
        match kind {
            FactoryKind::Binary => &self.binary_factory,
            FactoryKind::Multi => &self.multi_factory,
            FactoryKind::Scalar => &self.scalar_factory,
        }
    }

    pub fn factories(&self) -> [&MarketFactory; 3] {
        [&self.binary_factory, &self.multi_factory, &self.scalar_factory]
    }

    pub fn adapter(&self, category: &str) -> Option<&OracleAdapter> {
        self.adapters.get(category)
    }

    pub fn adapters(&self) -> impl Iterator<Item = &OracleAdapter> {
        self.adapters.values()
    }

    /// The adapter a market resolves through.
    pub fn adapter_for(&self, market: &Address) -> Result<&OracleAdapter> {
        let m = self.market(market)?;
        self.adapter_at(&m.oracle_adapter)
    }

    pub fn oracle_status(&self, market: &Address) -> Result<ReportStatus> {
        Ok(self.adapter_for(market)?.status(market))
    }

    /// Every market across all factories.
    pub fn markets(&self) -> impl Iterator<Item = &Market> {
        self.factories().into_iter().flat_map(|f| f.markets())
    }

    pub fn market_count(&self) -> u64 {
        self.factories().iter().map(|f| f.market_count()).sum()
    }

    pub fn market(&self, address: &Address) -> Result<&Market> {
        self.factories()
            .into_iter()
            .find_map(|f| f.market(address))
            .ok_or_else(|| MarketError::MarketNotFound(address.to_string()))
    }

    /// Markets still waiting on a report past their resolution deadline.
    pub fn overdue_markets(&self, now: u64) -> Vec<Address> {
        self.markets()
            .filter(|m| m.is_resolution_overdue(now))
            .map(|m| m.address)
            .collect()
    }

    fn market_mut(&mut self, address: &Address) -> Result<&mut Market> {
        self.binary_factory
            .market_mut(address)
            .or_else(|| self.multi_factory.market_mut(address))
            .or_else(|| self.scalar_factory.market_mut(address))
            .ok_or_else(|| MarketError::MarketNotFound(address.to_string()))
    }

    fn market_and_ledgers(&mut self, address: &Address) -> Result<(&mut Market, Ledgers<'_>)> {
        let Protocol {
            binary_factory,
            multi_factory,
            scalar_factory,
            collateral,
            tokens,
            fees,
            ..
        } = self;
        let market = binary_factory
            .market_mut(address)
            .or_else(|| multi_factory.market_mut(address))
            .or_else(|| scalar_factory.market_mut(address))
            .ok_or_else(|| MarketError::MarketNotFound(address.to_string()))?;
        Ok((
            market,
            Ledgers {
                collateral,
                tokens,
                fees,
            },
        ))
    }

    fn adapter_at(&self, address: &Address) -> Result<&OracleAdapter> {
        self.adapters
            .values()
            .find(|a| a.address == *address)
            .ok_or_else(|| MarketError::Oracle(format!("no oracle adapter at {address}")))
    }
}

fn adapter_by_address<'a>(
    adapters: &'a mut BTreeMap<String, OracleAdapter>,
    address: &Address,
) -> Result<&'a mut OracleAdapter> {
    adapters
        .values_mut()
        .find(|a| a.address == *address)
        .ok_or_else(|| MarketError::Oracle(format!("no oracle adapter at {address}")))
}

fn ensure_closed(market: &Market) -> Result<()> {
    if market.state() != MarketState::Closed {
        return Err(MarketError::InvalidState {
            expected: MarketState::Closed.as_str(),
            actual: market.state().as_str(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::{LONG, NO, SHORT, YES};
    use crate::test_utils::{constants::*, protocol_fixture, ProtocolFixture};
    use crate::UNIT;

    fn binary(f: &mut ProtocolFixture, label: &str) -> Address {
        let params = f.params(label, "crypto");
        f.protocol.create_binary(params, TEST_START - 60).unwrap().1
    }

    #[test]
    fn test_new_protocol_wiring() {
        let f = protocol_fixture();
        let p = &f.protocol;
        assert_eq!(p.adapters().count(), 3);
        for adapter in p.adapters() {
            for factory in p.factories() {
                assert!(adapter.is_factory_authorized(&factory.address));
            }
        }
        assert_eq!(p.adapter("trends").unwrap().config.liveness, 900);
        assert_eq!(p.market_count(), 0);
    }

    #[test]
    fn test_create_registers_everywhere() {
        let mut f = protocol_fixture();
        let market = binary(&mut f, "eth-etf");
        let p = &f.protocol;
        assert_eq!(p.market_count(), 1);
        assert_eq!(p.factory(FactoryKind::Binary).market_of(0).unwrap(), market);
        assert_eq!(p.status_of(&market).unwrap(), CurationStatus::Pending);
        assert_eq!(p.oracle_status(&market).unwrap(), ReportStatus::Unreported);
        assert_eq!(p.adapter_for(&market).unwrap().config.category, "crypto");
        assert!(p
            .adapter("crypto")
            .unwrap()
            .registration(&market)
            .is_some());
    }

    #[test]
    fn test_create_with_unknown_adapter_leaves_no_trace() {
        let mut f = protocol_fixture();
        let mut params = f.params("orphan", "crypto");
        params.oracle_adapter = Address::from_label("nowhere");
        let creator_before = f.protocol.collateral.balance_of(&f.creator);
        assert!(f.protocol.create_binary(params, TEST_START).is_err());
        assert_eq!(f.protocol.market_count(), 0);
        assert_eq!(f.protocol.collateral.balance_of(&f.creator), creator_before);
    }

    #[test]
    fn test_revoked_factory_cannot_create() {
        let mut f = protocol_fixture();
        let factory = f.protocol.factory(FactoryKind::Binary).address;
        let admin = f.admin;
        f.protocol
            .set_factory(&admin, "sports", factory, false)
            .unwrap();
        let params = f.params("match", "sports");
        let err = f.protocol.create_binary(params, TEST_START).unwrap_err();
        assert!(matches!(err, MarketError::Unauthorized(_)));
        assert_eq!(f.protocol.market_count(), 0);

        let params = f.params("match", "crypto");
        assert!(f.protocol.create_binary(params, TEST_START).is_ok());
    }

    #[test]
    fn test_full_binary_lifecycle() {
        let mut f = protocol_fixture();
        let market = binary(&mut f, "worked-example");
        let alice = f.trader("alice", 1_000 * UNIT, &market);
        let bob = f.trader("bob", 1_000 * UNIT, &market);

        let quote = f
            .protocol
            .buy(&market, alice, YES, 10 * UNIT, 21 * UNIT, TEST_START)
            .unwrap();
        assert_eq!(quote.total, 20_200_000);
        f.protocol
            .buy(&market, bob, NO, 5 * UNIT, u128::MAX, TEST_START + 10)
            .unwrap();

        assert!(f.protocol.report(f.reporter, &market, YES as i128, TEST_END).is_err());
        f.protocol.close(&market, TEST_END).unwrap();
        f.protocol
            .report(f.reporter, &market, YES as i128, TEST_END + 5)
            .unwrap();
        assert!(matches!(
            f.protocol.finalize(&market, TEST_END + 5 + 3_599),
            Err(MarketError::LivenessNotElapsed { .. })
        ));
        assert_eq!(
            f.protocol.finalize(&market, TEST_END + 5 + 3_600).unwrap(),
            Resolution::Outcome(YES)
        );
        assert_eq!(f.protocol.market(&market).unwrap().state(), MarketState::Resolved);
        assert!(f.protocol.finalize(&market, TEST_END + 10_000).is_err());

        assert_eq!(f.protocol.redeem(&market, alice).unwrap(), 10 * UNIT);
        assert_eq!(f.protocol.redeem(&market, bob).unwrap(), 0);
        let creator = f.creator;
        assert_eq!(f.protocol.redeem(&market, creator).unwrap(), 100 * UNIT);
        f.protocol.withdraw_surplus(&market, &creator).unwrap();

        let m = f.protocol.market(&market).unwrap();
        assert_eq!(m.collateral_held(), 0);
        assert_eq!(f.protocol.collateral.balance_of(&market), 0);

        let fees = f.protocol.distribute_fees().unwrap();
        assert_eq!(fees, f.protocol.fees.total_accrued());
        assert_eq!(
            f.protocol.collateral.balance_of(&f.protocol.config.fee_recipient),
            fees
        );
    }

    #[test]
    fn test_disputed_scalar_lifecycle() {
        let mut f = protocol_fixture();
        let params = f.params("cpi", "trends");
        let (_, market) = f
            .protocol
            .create_scalar(params, -100, 300, TEST_START)
            .unwrap();
        let alice = f.trader("alice", 1_000 * UNIT, &market);
        f.protocol
            .buy(&market, alice, LONG, 4 * UNIT, u128::MAX, TEST_START)
            .unwrap();
        f.protocol.close(&market, TEST_END).unwrap();
        f.protocol.report(f.reporter, &market, 300, TEST_END).unwrap();
        f.protocol.dispute(f.disputer, &market, TEST_END + 100).unwrap();
        assert_eq!(f.protocol.oracle_status(&market).unwrap(), ReportStatus::Disputed);

        // only the admin arbitrates
        let creator = f.creator;
        assert!(f
            .protocol
            .rule(&creator, &market, Ruling::overturn(100))
            .is_err());
        assert!(f.protocol.settle_dispute(&market, TEST_END + 200).is_err());

        let admin = f.admin;
        f.protocol
            .rule(&admin, &market, Ruling::overturn(100))
            .unwrap();
        let reporter_before = f.protocol.collateral.balance_of(&f.reporter);
        let disputer_before = f.protocol.collateral.balance_of(&f.disputer);
        let resolution = f.protocol.settle_dispute(&market, TEST_END + 200).unwrap();
        assert_eq!(
            resolution,
            Resolution::Scalar {
                value: 100,
                ratio: UNIT / 2
            }
        );
        // 25 + 50 bond pot to the disputer, reporter bond already gone
        assert_eq!(
            f.protocol.collateral.balance_of(&f.disputer),
            disputer_before + 75 * UNIT
        );
        assert_eq!(f.protocol.collateral.balance_of(&f.reporter), reporter_before);

        let paid = f.protocol.redeem(&market, alice).unwrap();
        assert_eq!(paid, 2 * UNIT);
        let m = f.protocol.market(&market).unwrap();
        assert_eq!(m.supply(SHORT).unwrap(), 100 * UNIT);
    }

    #[test]
    fn test_finalize_at_supply_cap_resolves_market() {
        let mut f = protocol_fixture();
        let market = binary(&mut f, "whale");
        let whale = f.trader("whale", 100_000 * UNIT, &market);
        let chunk = u128::MAX / (2 * 100 * UNIT);
        for _ in 0..1_000 {
            let q = f.protocol.market(&market).unwrap().q_yes();
            if f
                .protocol
                .buy(&market, whale, YES, q.min(chunk), u128::MAX, TEST_START)
                .is_err()
            {
                break;
            }
        }
        f.protocol.close(&market, TEST_END).unwrap();
        f.protocol.report(f.reporter, &market, YES as i128, TEST_END).unwrap();
        assert_eq!(
            f.protocol.finalize(&market, TEST_END + 3_600).unwrap(),
            Resolution::Outcome(YES)
        );
        // oracle and market agree on finality
        assert_eq!(f.protocol.oracle_status(&market).unwrap(), ReportStatus::Finalized);
        assert_eq!(f.protocol.market(&market).unwrap().state(), MarketState::Resolved);
        f.protocol.redeem(&market, whale).unwrap();
        let creator = f.creator;
        f.protocol.redeem(&market, creator).unwrap();
        f.protocol.withdraw_surplus(&market, &creator).unwrap();
    }

    #[test]
    fn test_failed_finalize_leaves_oracle_untouched() {
        let mut f = protocol_fixture();
        let market = binary(&mut f, "early");
        f.protocol.close(&market, TEST_END).unwrap();
        f.protocol.report(f.reporter, &market, NO as i128, TEST_END).unwrap();
        let before = f.protocol.clone();
        assert!(f.protocol.finalize(&market, TEST_END + 10).is_err());
        assert!(f.protocol.settle_dispute(&market, TEST_END + 10).is_err());
        assert_eq!(f.protocol, before);
        assert_eq!(f.protocol.oracle_status(&market).unwrap(), ReportStatus::Reported);
    }

    #[test]
    fn test_report_rejects_value_outside_market() {
        let mut f = protocol_fixture();
        let labels = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        let params = f.params("three-way", "sports");
        let (_, market) = f.protocol.create_multi(params, labels, TEST_START).unwrap();
        f.protocol.close(&market, TEST_END).unwrap();
        let before = f.protocol.collateral.balance_of(&f.reporter);
        assert!(f.protocol.report(f.reporter, &market, 3, TEST_END).is_err());
        assert_eq!(f.protocol.collateral.balance_of(&f.reporter), before);
        f.protocol.report(f.reporter, &market, 2, TEST_END).unwrap();
        assert_eq!(
            f.protocol.finalize(&market, TEST_END + 1_800).unwrap(),
            Resolution::Outcome(2)
        );
    }

    #[test]
    fn test_curation_does_not_touch_market() {
        let mut f = protocol_fixture();
        let market = binary(&mut f, "curated");
        let alice = f.trader("alice", 1_000 * UNIT, &market);
        let member = f.member;
        let before = f.protocol.market(&market).unwrap().clone();

        f.protocol.approve_market(&member, &market, TEST_START).unwrap();
        f.protocol.flag_market(&member, &market, TEST_START).unwrap();
        assert_eq!(f.protocol.market(&market).unwrap(), &before);

        // flagged markets keep trading; curation is advisory
        f.protocol
            .buy(&market, alice, YES, UNIT, u128::MAX, TEST_START)
            .unwrap();
        f.protocol.reset_market(&member, &market, TEST_START).unwrap();
        assert_eq!(f.protocol.status_of(&market).unwrap(), CurationStatus::Pending);
        assert!(f
            .protocol
            .approve_market(&member, &Address::from_label("ghost"), TEST_START)
            .is_err());
    }

    #[test]
    fn test_overdue_markets() {
        let mut f = protocol_fixture();
        let market = binary(&mut f, "slow");
        assert!(f.protocol.overdue_markets(TEST_END).is_empty());
        assert_eq!(f.protocol.overdue_markets(TEST_DEADLINE), vec![market]);

        // reporting stays open after the deadline
        f.protocol.close(&market, TEST_DEADLINE).unwrap();
        f.protocol
            .report(f.reporter, &market, NO as i128, TEST_DEADLINE + 1)
            .unwrap();
        f.protocol.finalize(&market, TEST_DEADLINE + 3_601).unwrap();
        assert!(f.protocol.overdue_markets(TEST_DEADLINE + 3_601).is_empty());
    }

    #[test]
    fn test_json_snapshot_round_trip() {
        let mut f = protocol_fixture();
        let market = binary(&mut f, "persisted");
        let alice = f.trader("alice", 1_000 * UNIT, &market);
        f.protocol
            .buy(&market, alice, NO, 3 * UNIT, u128::MAX, TEST_START)
            .unwrap();
        let member = f.member;
        f.protocol.approve_market(&member, &market, TEST_START).unwrap();

        let json = f.protocol.to_json().unwrap();
        let restored = Protocol::from_json(&json).unwrap();
        assert_eq!(restored, f.protocol);
        assert_eq!(restored.market(&market).unwrap().q_no(), 103 * UNIT);
    }
}
