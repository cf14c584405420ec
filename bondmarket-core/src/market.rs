//! # Prediction Market Implementation
//!
//! The market accounting core shared by binary, multi-outcome and scalar
//! markets. A market custodies collateral under its own address, prices
//! trades on the bonding curve in [`crate::curve`], and walks the one-way
//! lifecycle `Open -> Closed -> Resolved`.
//!
//! Every mutating method checks all of its preconditions before it moves a
//! single unit, so a returned error always means nothing changed.

use crate::{
    collateral::CollateralToken,
    curve::{self, TradeQuote},
    error::Result,
    fees::FeeRouter,
    outcome_token::OutcomeTokenLedger,
    utils::{Address, MarketKey},
    MarketError, MAX_FEE_BPS, UNIT,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info};

/// Outcome index of YES in a binary market
pub const YES: usize = 0;
/// Outcome index of NO in a binary market
pub const NO: usize = 1;
/// Outcome index of the LONG side of a scalar market
pub const LONG: usize = 0;
/// Outcome index of the SHORT side of a scalar market
pub const SHORT: usize = 1;

/// The three market flavours. They share all accounting and differ only in
/// outcome cardinality and in how a reported value maps to payouts.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum MarketVariant {
    /// YES / NO
    Binary,
    /// One outcome per label, at least two
    Multi { labels: Vec<String> },
    /// LONG / SHORT over a numeric range
    Scalar { lower_bound: i128, upper_bound: i128 },
}

impl MarketVariant {
    pub fn outcome_count(&self) -> usize {
        match self {
            MarketVariant::Binary | MarketVariant::Scalar { .. } => 2,
            MarketVariant::Multi { labels } => labels.len(),
        }
    }

    /// Tag mixed into the market address derivation.
    pub fn tag(&self) -> &'static str {
        match self {
            MarketVariant::Binary => "binary",
            MarketVariant::Multi { .. } => "multi",
            MarketVariant::Scalar { .. } => "scalar",
        }
    }

    pub fn outcome_label(&self, outcome: usize) -> Option<String> {
        match self {
            MarketVariant::Binary => ["YES", "NO"].get(outcome).map(|s| s.to_string()),
            MarketVariant::Scalar { .. } => ["LONG", "SHORT"].get(outcome).map(|s| s.to_string()),
            MarketVariant::Multi { labels } => labels.get(outcome).cloned(),
        }
    }

    fn validate(&self) -> Result<()> {
        match self {
            MarketVariant::Binary => Ok(()),
            MarketVariant::Multi { labels } => {
                if labels.len() < 2 {
                    return Err(MarketError::InvalidMarket(format!(
                        "multi-outcome market needs at least 2 outcomes, got {}",
                        labels.len()
                    )));
                }
                if u8::try_from(labels.len()).is_err() {
                    return Err(MarketError::InvalidMarket(format!(
                        "too many outcomes: {}",
                        labels.len()
                    )));
                }
                Ok(())
            }
            MarketVariant::Scalar {
                lower_bound,
                upper_bound,
            } => {
                if lower_bound >= upper_bound {
                    return Err(MarketError::InvalidMarket(format!(
                        "scalar lower bound {lower_bound} must be below upper bound {upper_bound}"
                    )));
                }
                if upper_bound.abs_diff(*lower_bound) > curve::MAX_SCALAR_SPAN {
                    return Err(MarketError::InvalidMarket(format!(
                        "scalar range [{lower_bound}, {upper_bound}] is wider than {}",
                        curve::MAX_SCALAR_SPAN
                    )));
                }
                Ok(())
            }
        }
    }
}

/// Lifecycle state. Transitions only ever move forward.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum MarketState {
    Open,
    Closed,
    Resolved,
}

impl MarketState {
    /// Numeric code exposed to front ends (0, 1, 2).
    pub fn code(&self) -> u8 {
        *self as u8
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MarketState::Open => "open",
            MarketState::Closed => "closed",
            MarketState::Resolved => "resolved",
        }
    }
}

impl fmt::Display for MarketState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The final answer pushed in by the oracle adapter.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// Winning outcome index (binary and multi markets)
    Outcome(usize),
    /// Reported value and the LONG payout ratio derived from it (`UNIT` = 100%)
    Scalar { value: i128, ratio: u128 },
}

/// Settlement bookkeeping fixed at resolution time.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Settlement {
    pub resolution: Resolution,
    pub resolved_at: u64,
    /// Collateral owed to all holders at face value
    pub claims: u128,
    /// Fraction of face value actually paid (`UNIT` unless under-collateralised)
    pub payout_factor: u128,
    /// Collateral left over for the liquidity provider
    pub surplus: u128,
    pub surplus_withdrawn: bool,
}

/// Creation parameters shared by every variant.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct MarketParams {
    pub question: String,
    pub metadata_uri: String,
    /// Liquidity provider; funds the seed and owns the surplus
    pub creator: Address,
    pub oracle_adapter: Address,
    pub fee_router: Address,
    pub market_key: MarketKey,
    pub fee_bps: u16,
    /// Liquidity parameter `L`, in collateral units
    pub liquidity: u128,
    pub start_time: u64,
    pub end_time: u64,
    pub resolution_deadline: u64,
}

impl MarketParams {
    /// Reject bad time ranges, zero addresses and out-of-range numbers.
    pub fn validate(&self) -> Result<()> {
        if self.creator.is_zero() {
            return Err(MarketError::ZeroAddress("creator"));
        }
        if self.oracle_adapter.is_zero() {
            return Err(MarketError::ZeroAddress("oracle adapter"));
        }
        if self.fee_router.is_zero() {
            return Err(MarketError::ZeroAddress("fee router"));
        }
        if self.start_time >= self.end_time {
            return Err(MarketError::InvalidMarket(format!(
                "start time {} must be before end time {}",
                self.start_time, self.end_time
            )));
        }
        if self.end_time >= self.resolution_deadline {
            return Err(MarketError::InvalidMarket(format!(
                "end time {} must be before resolution deadline {}",
                self.end_time, self.resolution_deadline
            )));
        }
        if self.fee_bps > MAX_FEE_BPS {
            return Err(MarketError::InvalidMarket(format!(
                "fee of {} bps exceeds {MAX_FEE_BPS}",
                self.fee_bps
            )));
        }
        if self.liquidity == 0 {
            return Err(MarketError::InvalidMarket(
                "liquidity parameter must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Mutable access to the ledgers a market settles against.
pub struct Ledgers<'a> {
    pub collateral: &'a mut CollateralToken,
    pub tokens: &'a mut OutcomeTokenLedger,
    pub fees: &'a mut FeeRouter,
}

/// A bonding-curve prediction market.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Market {
    /// Sequential id within the creating factory
    pub market_id: u64,
    pub market_key: MarketKey,
    /// Custody address of this market
    pub address: Address,
    pub factory: Address,
    pub question: String,
    pub metadata_uri: String,
    pub creator: Address,
    pub oracle_adapter: Address,
    pub fee_router: Address,
    pub fee_bps: u16,
    pub start_time: u64,
    pub end_time: u64,
    pub resolution_deadline: u64,
    pub variant: MarketVariant,
    pub created_at: u64,

    state: MarketState,
    liquidity: u128,
    supplies: Vec<u128>,
    collateral_held: u128,
    total_in: u128,
    total_out: u128,
    settlement: Option<Settlement>,
    volumes: BTreeMap<Address, u128>,
}

impl Market {
    /// Build an unseeded market. Factories call [`Market::seed`] right after.
    pub(crate) fn new(
        market_id: u64,
        address: Address,
        factory: Address,
        params: MarketParams,
        variant: MarketVariant,
        now: u64,
    ) -> Result<Self> {
        params.validate()?;
        variant.validate()?;
        let outcomes = variant.outcome_count();
        Ok(Self {
            market_id,
            market_key: params.market_key,
            address,
            factory,
            question: params.question,
            metadata_uri: params.metadata_uri,
            creator: params.creator,
            oracle_adapter: params.oracle_adapter,
            fee_router: params.fee_router,
            fee_bps: params.fee_bps,
            start_time: params.start_time,
            end_time: params.end_time,
            resolution_deadline: params.resolution_deadline,
            variant,
            created_at: now,
            state: MarketState::Open,
            liquidity: params.liquidity,
            supplies: vec![0; outcomes],
            collateral_held: 0,
            total_in: 0,
            total_out: 0,
            settlement: None,
            volumes: BTreeMap::new(),
        })
    }

    /// Check the creator can fund the seed through `spender` (the factory).
    pub(crate) fn ensure_seedable(&self, collateral: &CollateralToken, spender: &Address) -> Result<()> {
        collateral.ensure_allowance(&self.creator, spender, self.liquidity)?;
        collateral.ensure_balance(&self.creator, self.liquidity)
    }

    /// Pull `L` collateral from the creator and mint `L` shares of every
    /// outcome to them, so every supply starts at `L`.
    pub(crate) fn seed(
        &mut self,
        collateral: &mut CollateralToken,
        tokens: &mut OutcomeTokenLedger,
        spender: &Address,
    ) -> Result<()> {
        self.ensure_seedable(collateral, spender)?;
        tokens.register(self.address, self.address, self.outcome_count())?;
        collateral.transfer_from(*spender, self.creator, self.address, self.liquidity)?;
        for outcome in 0..self.outcome_count() {
            tokens.mint(&self.address, &self.address, outcome, self.creator, self.liquidity)?;
            self.supplies[outcome] = self.liquidity;
        }
        self.collateral_held = self.liquidity;
        self.total_in = self.liquidity;
        info!(
            market = %self.address,
            id = self.market_id,
            variant = self.variant.tag(),
            liquidity = self.liquidity,
            "market seeded"
        );
        Ok(())
    }

    pub fn state(&self) -> MarketState {
        self.state
    }

    pub fn liquidity(&self) -> u128 {
        self.liquidity
    }

    pub fn outcome_count(&self) -> usize {
        self.supplies.len()
    }

    /// Outstanding supply of every outcome.
    pub fn supplies(&self) -> &[u128] {
        &self.supplies
    }

    pub fn supply(&self, outcome: usize) -> Result<u128> {
        self.supplies
            .get(outcome)
            .copied()
            .ok_or(MarketError::UnknownOutcome {
                index: outcome,
                count: self.supplies.len(),
            })
    }

    pub fn q_yes(&self) -> u128 {
        self.supplies[YES]
    }

    pub fn q_no(&self) -> u128 {
        self.supplies[NO]
    }

    /// Collateral custodied by the market.
    pub fn collateral_held(&self) -> u128 {
        self.collateral_held
    }

    /// Lifetime collateral received (seed plus trade costs, fees excluded).
    pub fn total_collateral_in(&self) -> u128 {
        self.total_in
    }

    /// Lifetime collateral paid out (sells, redemptions, surplus).
    pub fn total_collateral_out(&self) -> u128 {
        self.total_out
    }

    pub fn settlement(&self) -> Option<&Settlement> {
        self.settlement.as_ref()
    }

    pub fn resolution(&self) -> Option<Resolution> {
        self.settlement.as_ref().map(|s| s.resolution)
    }

    pub fn has_traded(&self, trader: &Address) -> bool {
        self.volumes.contains_key(trader)
    }

    /// Cumulative gross curve cost (fees excluded) of a trader's buys and sells.
    pub fn trader_volume(&self, trader: &Address) -> u128 {
        self.volumes.get(trader).copied().unwrap_or(0)
    }

    pub fn traders(&self) -> impl Iterator<Item = &Address> {
        self.volumes.keys()
    }

    /// Whether the trading window is open at `now`.
    pub fn is_trading(&self, now: u64) -> bool {
        self.state == MarketState::Open && now >= self.start_time && now < self.end_time
    }

    /// The market passed its resolution deadline without being resolved.
    pub fn is_resolution_overdue(&self, now: u64) -> bool {
        self.state != MarketState::Resolved && now >= self.resolution_deadline
    }

    /// Marginal price of one share of `outcome`, in collateral units.
    pub fn price(&self, outcome: usize) -> Result<u128> {
        curve::marginal_price(self.supply(outcome)?, self.liquidity, self.outcome_count())
    }

    pub fn prices(&self) -> Result<Vec<u128>> {
        (0..self.outcome_count()).map(|k| self.price(k)).collect()
    }

    /// Prices normalised so they sum to (about) `UNIT`.
    pub fn implied_probabilities(&self) -> Result<Vec<u128>> {
        curve::implied_probabilities(&self.supplies)
    }

    pub fn quote_buy(&self, outcome: usize, shares: u128) -> Result<TradeQuote> {
        curve::quote_buy(&self.supplies, outcome, shares, self.liquidity, self.fee_bps)
    }

    pub fn quote_sell(&self, outcome: usize, shares: u128) -> Result<TradeQuote> {
        curve::quote_sell(&self.supplies, outcome, shares, self.liquidity, self.fee_bps)
    }

    /// Buy `shares` of `outcome`, paying at most `max_cost` including the fee.
    ///
    /// The trader must have approved the market address for the total.
    pub fn buy(
        &mut self,
        ledgers: &mut Ledgers<'_>,
        trader: Address,
        outcome: usize,
        shares: u128,
        max_cost: u128,
        now: u64,
    ) -> Result<TradeQuote> {
        self.ensure_trading(now)?;
        self.ensure_router(ledgers.fees)?;
        if trader.is_zero() {
            return Err(MarketError::ZeroAddress("trader"));
        }
        if shares == 0 {
            return Err(MarketError::InvalidTrade("shares must be positive".to_string()));
        }
        let quote = self.quote_buy(outcome, shares)?;
        if quote.total > max_cost {
            return Err(MarketError::SlippageExceeded {
                actual: quote.total,
                limit: max_cost,
            });
        }
        ledgers
            .collateral
            .ensure_allowance(&trader, &self.address, quote.total)?;
        ledgers.collateral.ensure_balance(&trader, quote.total)?;
        let new_supply = self.supplies[outcome]
            .checked_add(shares)
            .filter(|q| *q <= curve::MAX_OUTCOME_SUPPLY)
            .ok_or(MarketError::Overflow("outcome supply"))?;
        let new_held = self
            .collateral_held
            .checked_add(quote.cost)
            .ok_or(MarketError::Overflow("collateral held"))?;

        ledgers
            .collateral
            .transfer_from(self.address, trader, self.address, quote.cost)?;
        if quote.fee > 0 {
            ledgers
                .collateral
                .transfer_from(self.address, trader, ledgers.fees.address, quote.fee)?;
            ledgers.fees.record(self.address, quote.fee);
        }
        ledgers
            .tokens
            .mint(&self.address, &self.address, outcome, trader, shares)?;

        self.supplies[outcome] = new_supply;
        self.collateral_held = new_held;
        self.total_in += quote.cost;
        *self.volumes.entry(trader).or_insert(0) += quote.cost;

        debug!(
            market = %self.address,
            %trader,
            outcome,
            shares,
            cost = quote.cost,
            fee = quote.fee,
            "buy executed"
        );
        Ok(quote)
    }

    /// Sell `shares` of `outcome` back to the curve for at least `min_payout`.
    pub fn sell(
        &mut self,
        ledgers: &mut Ledgers<'_>,
        trader: Address,
        outcome: usize,
        shares: u128,
        min_payout: u128,
        now: u64,
    ) -> Result<TradeQuote> {
        self.ensure_trading(now)?;
        self.ensure_router(ledgers.fees)?;
        if shares == 0 {
            return Err(MarketError::InvalidTrade("shares must be positive".to_string()));
        }
        let quote = self.quote_sell(outcome, shares)?;
        if quote.total < min_payout {
            return Err(MarketError::SlippageExceeded {
                actual: quote.total,
                limit: min_payout,
            });
        }
        ledgers
            .tokens
            .ensure_balance(&self.address, outcome, &trader, shares)?;
        if self.collateral_held < quote.cost {
            return Err(MarketError::InsufficientCollateral {
                available: self.collateral_held,
                required: quote.cost,
            });
        }

        ledgers
            .tokens
            .burn(&self.address, &self.address, outcome, &trader, shares)?;
        ledgers
            .collateral
            .transfer(self.address, trader, quote.total)?;
        if quote.fee > 0 {
            ledgers
                .collateral
                .transfer(self.address, ledgers.fees.address, quote.fee)?;
            ledgers.fees.record(self.address, quote.fee);
        }

        self.supplies[outcome] -= shares;
        self.collateral_held -= quote.cost;
        self.total_out += quote.cost;
        *self.volumes.entry(trader).or_insert(0) += quote.cost;

        debug!(
            market = %self.address,
            %trader,
            outcome,
            shares,
            payout = quote.total,
            fee = quote.fee,
            "sell executed"
        );
        Ok(quote)
    }

    /// Stop trading. Anyone may call this once `end_time` has passed.
    pub fn close(&mut self, now: u64) -> Result<()> {
        self.ensure_state(MarketState::Open)?;
        if now < self.end_time {
            return Err(MarketError::MarketNotEnded {
                now,
                end_time: self.end_time,
            });
        }
        self.state = MarketState::Closed;
        info!(market = %self.address, "market closed");
        Ok(())
    }

    /// Check that `value` is a legal resolution without changing anything.
    pub fn resolution_for(&self, value: i128) -> Result<Resolution> {
        match &self.variant {
            MarketVariant::Scalar {
                lower_bound,
                upper_bound,
            } => Ok(Resolution::Scalar {
                value,
                ratio: curve::scalar_ratio(value, *lower_bound, *upper_bound)?,
            }),
            _ => {
                let index = usize::try_from(value)
                    .ok()
                    .filter(|i| *i < self.outcome_count())
                    .ok_or_else(|| {
                        MarketError::InvalidReport(format!(
                            "{value} is not an outcome of a {}-outcome market",
                            self.outcome_count()
                        ))
                    })?;
                Ok(Resolution::Outcome(index))
            }
        }
    }

    /// Face value per share of each outcome under `resolution`.
    pub fn face_values(&self, resolution: &Resolution) -> Vec<u128> {
        match resolution {
            Resolution::Outcome(winner) => (0..self.outcome_count())
                .map(|k| if k == *winner { UNIT } else { 0 })
                .collect(),
            Resolution::Scalar { ratio, .. } => curve::scalar_face_values(*ratio).to_vec(),
        }
    }

    /// Settlement the market would record if `value` were final at `now`.
    /// Read-only; fails exactly when `resolve` would fail on the same value.
    pub fn settlement_for(&self, value: i128, now: u64) -> Result<Settlement> {
        let resolution = self.resolution_for(value)?;
        let faces = self.face_values(&resolution);
        let mut claims = 0u128;
        for (supply, face) in self.supplies.iter().zip(&faces) {
            claims = claims
                .checked_add(curve::apply_factor(*supply, *face)?)
                .ok_or(MarketError::Overflow("settlement claims"))?;
        }
        let payout_factor = if claims <= self.collateral_held {
            UNIT
        } else {
            curve::mul_div(self.collateral_held, UNIT, claims, "payout factor")?
        };
        let reserved = curve::apply_factor(claims, payout_factor)?;
        Ok(Settlement {
            resolution,
            resolved_at: now,
            claims,
            payout_factor,
            surplus: self.collateral_held.saturating_sub(reserved),
            surplus_withdrawn: false,
        })
    }

    /// Apply the oracle's final value. Only the registered adapter may call
    /// this, only once, and only while the market is Closed.
    pub fn resolve(&mut self, caller: &Address, value: i128, now: u64) -> Result<Resolution> {
        if *caller != self.oracle_adapter {
            return Err(MarketError::Unauthorized(format!(
                "{caller} is not the oracle adapter of market {}",
                self.address
            )));
        }
        self.ensure_state(MarketState::Closed)?;
        let settlement = self.settlement_for(value, now)?;
        let resolution = settlement.resolution;
        info!(
            market = %self.address,
            ?resolution,
            claims = settlement.claims,
            payout_factor = settlement.payout_factor,
            surplus = settlement.surplus,
            "market resolved"
        );
        self.settlement = Some(settlement);
        self.state = MarketState::Resolved;
        Ok(resolution)
    }

    /// What `redeem` would pay `holder` right now.
    pub fn redeemable(&self, tokens: &OutcomeTokenLedger, holder: &Address) -> Result<u128> {
        let settlement = self.settled()?;
        let balances = tokens.balances_of(&self.address, holder);
        self.payout_for(settlement, &balances)
    }

    /// Burn all of `holder`'s outcome shares and pay out their settled value.
    /// Losing shares are burned for nothing.
    pub fn redeem(&mut self, ledgers: &mut Ledgers<'_>, holder: Address) -> Result<u128> {
        let settlement = self.settled()?;
        let balances = ledgers.tokens.balances_of(&self.address, &holder);
        if balances.iter().all(|b| *b == 0) {
            return Err(MarketError::NothingToRedeem(holder));
        }
        let payout = self.payout_for(settlement, &balances)?;
        if payout > self.collateral_held {
            return Err(MarketError::InsufficientCollateral {
                available: self.collateral_held,
                required: payout,
            });
        }

        for (outcome, balance) in balances.iter().enumerate() {
            if *balance > 0 {
                ledgers
                    .tokens
                    .burn(&self.address, &self.address, outcome, &holder, *balance)?;
                self.supplies[outcome] -= *balance;
            }
        }
        if payout > 0 {
            ledgers.collateral.transfer(self.address, holder, payout)?;
        }
        self.collateral_held -= payout;
        self.total_out += payout;
        info!(market = %self.address, %holder, payout, "shares redeemed");
        Ok(payout)
    }

    /// Hand the settlement surplus to the creator. Callable once.
    pub fn withdraw_surplus(&mut self, collateral: &mut CollateralToken, caller: &Address) -> Result<u128> {
        if *caller != self.creator {
            return Err(MarketError::Unauthorized(format!(
                "{caller} is not the creator of market {}",
                self.address
            )));
        }
        let settlement = self.settled()?;
        if settlement.surplus_withdrawn {
            return Err(MarketError::SurplusWithdrawn);
        }
        let amount = settlement.surplus.min(self.collateral_held);
        if amount > 0 {
            collateral.transfer(self.address, self.creator, amount)?;
        }
        self.collateral_held -= amount;
        self.total_out += amount;
        if let Some(s) = self.settlement.as_mut() {
            s.surplus_withdrawn = true;
        }
        info!(market = %self.address, amount, "surplus withdrawn");
        Ok(amount)
    }

    fn payout_for(&self, settlement: &Settlement, balances: &[u128]) -> Result<u128> {
        let faces = self.face_values(&settlement.resolution);
        let mut face_total = 0u128;
        for (balance, face) in balances.iter().zip(&faces) {
            face_total = face_total
                .checked_add(curve::apply_factor(*balance, *face)?)
                .ok_or(MarketError::Overflow("redemption"))?;
        }
        curve::apply_factor(face_total, settlement.payout_factor)
    }

    fn settled(&self) -> Result<&Settlement> {
        match (&self.settlement, self.state) {
            (Some(s), MarketState::Resolved) => Ok(s),
            _ => Err(MarketError::InvalidState {
                expected: MarketState::Resolved.as_str(),
                actual: self.state.as_str(),
            }),
        }
    }

    fn ensure_state(&self, expected: MarketState) -> Result<()> {
        if self.state != expected {
            return Err(MarketError::InvalidState {
                expected: expected.as_str(),
                actual: self.state.as_str(),
            });
        }
        Ok(())
    }

    fn ensure_trading(&self, now: u64) -> Result<()> {
        self.ensure_state(MarketState::Open)?;
        if now < self.start_time || now >= self.end_time {
            return Err(MarketError::TradingWindowClosed {
                now,
                start: self.start_time,
                end: self.end_time,
            });
        }
        Ok(())
    }

    fn ensure_router(&self, fees: &FeeRouter) -> Result<()> {
        if fees.address != self.fee_router {
            return Err(MarketError::Unauthorized(format!(
                "fee router {} is not the router of market {}",
                fees.address, self.address
            )));
        }
        Ok(())
    }

    /// Get market status summary
    pub fn get_status(&self, now: u64) -> String {
        match (&self.state, self.resolution()) {
            (MarketState::Resolved, Some(Resolution::Outcome(k))) => format!(
                "Resolved - {} won",
                self.variant
                    .outcome_label(k)
                    .unwrap_or_else(|| format!("outcome {k}"))
            ),
            (MarketState::Resolved, Some(Resolution::Scalar { value, ratio })) => format!(
                "Resolved - value {value}, LONG pays {}",
                crate::utils::format_amount(ratio)
            ),
            (MarketState::Closed, _) if self.is_resolution_overdue(now) => {
                "Closed - resolution overdue".to_string()
            }
            (MarketState::Closed, _) => "Closed - awaiting oracle".to_string(),
            (MarketState::Open, _) if now >= self.end_time => "Ended - awaiting close".to_string(),
            (MarketState::Open, _) if now < self.start_time => "Scheduled".to_string(),
            _ => "Open - trading".to_string(),
        }
    }
}
