//! # Optimistic Oracle Adapter
//!
//! One adapter per market category. A reporter posts a value together with a
//! bond; if nobody disputes it within the liveness window the value stands and
//! the bond is returned. A dispute freezes the report until an [`Arbitrator`]
//! rules, and the losing side's bond goes to the winner.
//!
//! ```text
//! Unreported --report--> Reported --(liveness elapsed)--> Finalized
//!                           |
//!                        dispute --> Disputed --adjudicate--> Finalized
//! ```
//!
//! Nothing here runs on a timer. Finalization happens when someone calls it,
//! which may be arbitrarily long after the window closed.

use crate::{collateral::CollateralToken, error::Result, utils::Address, MarketError, UNIT};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::{info, warn};

/// Bond sizes and dispute window of one adapter.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct AdapterConfig {
    /// Market category served (e.g. "crypto")
    pub category: String,
    pub reporter_bond: u128,
    pub disputer_bond: u128,
    /// Dispute window in seconds
    pub liveness: u64,
}

impl AdapterConfig {
    pub fn new(category: impl Into<String>, reporter_bond: u128, disputer_bond: u128, liveness: u64) -> Self {
        Self {
            category: category.into(),
            reporter_bond,
            disputer_bond,
            liveness,
        }
    }

    /// 100 / 200 collateral bonds, one hour liveness.
    pub fn crypto() -> Self {
        Self::new("crypto", 100 * UNIT, 200 * UNIT, 3_600)
    }

    /// 50 / 100 collateral bonds, thirty minutes liveness.
    pub fn sports() -> Self {
        Self::new("sports", 50 * UNIT, 100 * UNIT, 1_800)
    }

    /// 25 / 50 collateral bonds, fifteen minutes liveness.
    pub fn trends() -> Self {
        Self::new("trends", 25 * UNIT, 50 * UNIT, 900)
    }

    pub fn validate(&self) -> Result<()> {
        if self.category.trim().is_empty() {
            return Err(MarketError::Oracle("adapter category is empty".to_string()));
        }
        if self.liveness == 0 {
            return Err(MarketError::Oracle("liveness must be positive".to_string()));
        }
        Ok(())
    }
}

/// Values an adapter will accept for a market.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueDomain {
    /// An outcome index below `count`
    Outcome { count: usize },
    /// Any numeric value; the market clamps it into its range
    Scalar,
}

impl ValueDomain {
    fn check(&self, value: i128) -> Result<()> {
        match self {
            ValueDomain::Outcome { count } => {
                if value < 0 || value >= *count as i128 {
                    return Err(MarketError::InvalidReport(format!(
                        "{value} is not an outcome index below {count}"
                    )));
                }
                Ok(())
            }
            ValueDomain::Scalar => Ok(()),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportStatus {
    Unreported,
    Reported,
    Disputed,
    Finalized,
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReportStatus::Unreported => "unreported",
            ReportStatus::Reported => "reported",
            ReportStatus::Disputed => "disputed",
            ReportStatus::Finalized => "finalized",
        };
        f.write_str(s)
    }
}

/// A bonded report awaiting finalization.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct OracleReport {
    pub value: i128,
    pub reporter: Address,
    pub reporter_bond: u128,
    pub submitted_at: u64,
    pub disputer: Option<Address>,
    pub disputer_bond: u128,
    pub disputed_at: Option<u64>,
}

impl OracleReport {
    pub fn is_disputed(&self) -> bool {
        self.disputer.is_some()
    }
}

/// The write-once outcome of the protocol for a market.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Finalization {
    pub value: i128,
    pub finalized_at: u64,
    pub adjudicated: bool,
    /// Who collected the bonds
    pub bond_recipient: Address,
    pub bonds_paid: u128,
}

/// Side of a disputed report.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Party {
    Reporter,
    Disputer,
}

/// An arbitrator's decision on a disputed report.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ruling {
    pub final_value: i128,
    pub bond_winner: Party,
}

impl Ruling {
    /// The reporter was right: keep the value, reporter takes both bonds.
    pub fn uphold(report: &OracleReport) -> Self {
        Self {
            final_value: report.value,
            bond_winner: Party::Reporter,
        }
    }

    /// The disputer was right: replace the value, disputer takes both bonds.
    pub fn overturn(final_value: i128) -> Self {
        Self {
            final_value,
            bond_winner: Party::Disputer,
        }
    }
}

/// Decides disputed reports. How it reaches a decision is up to the implementor.
pub trait Arbitrator {
    fn adjudicate(&self, market: &Address, report: &OracleReport) -> Result<Ruling>;
}

/// Arbitration by a single designated address that records rulings up front.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct DesignatedArbitrator {
    pub arbiter: Address,
    rulings: BTreeMap<Address, Ruling>,
}

impl DesignatedArbitrator {
    pub fn new(arbiter: Address) -> Self {
        Self {
            arbiter,
            rulings: BTreeMap::new(),
        }
    }

    pub fn rule(&mut self, caller: &Address, market: Address, ruling: Ruling) -> Result<()> {
        if *caller != self.arbiter {
            return Err(MarketError::Unauthorized(format!(
                "{caller} is not the designated arbiter"
            )));
        }
        self.rulings.insert(market, ruling);
        Ok(())
    }

    pub fn ruling(&self, market: &Address) -> Option<&Ruling> {
        self.rulings.get(market)
    }
}

impl Arbitrator for DesignatedArbitrator {
    fn adjudicate(&self, market: &Address, _report: &OracleReport) -> Result<Ruling> {
        self.rulings
            .get(market)
            .copied()
            .ok_or_else(|| MarketError::Oracle(format!("no ruling recorded for market {market}")))
    }
}

/// Per-market record kept by an adapter.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Registration {
    pub factory: Address,
    pub domain: ValueDomain,
    pub report: Option<OracleReport>,
    pub finalization: Option<Finalization>,
}

impl Registration {
    pub fn status(&self) -> ReportStatus {
        match (&self.finalization, &self.report) {
            (Some(_), _) => ReportStatus::Finalized,
            (None, Some(r)) if r.is_disputed() => ReportStatus::Disputed,
            (None, Some(_)) => ReportStatus::Reported,
            (None, None) => ReportStatus::Unreported,
        }
    }
}

/// Bonded report / dispute / settlement for one market category.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct OracleAdapter {
    /// Custody address for bonds; also the only address allowed to resolve its markets
    pub address: Address,
    pub admin: Address,
    pub config: AdapterConfig,
    factories: BTreeSet<Address>,
    markets: BTreeMap<Address, Registration>,
}

impl OracleAdapter {
    pub fn new(address: Address, admin: Address, config: AdapterConfig) -> Result<Self> {
        if address.is_zero() {
            return Err(MarketError::ZeroAddress("oracle adapter"));
        }
        if admin.is_zero() {
            return Err(MarketError::ZeroAddress("oracle admin"));
        }
        config.validate()?;
        Ok(Self {
            address,
            admin,
            config,
            factories: BTreeSet::new(),
            markets: BTreeMap::new(),
        })
    }

    /// Allow or revoke a factory's right to register markets.
    pub fn set_factory(&mut self, caller: &Address, factory: Address, allowed: bool) -> Result<()> {
        if *caller != self.admin {
            return Err(MarketError::Unauthorized(format!(
                "{caller} is not the admin of the {} adapter",
                self.config.category
            )));
        }
        if factory.is_zero() {
            return Err(MarketError::ZeroAddress("factory"));
        }
        if allowed {
            self.factories.insert(factory);
        } else {
            self.factories.remove(&factory);
        }
        info!(category = %self.config.category, %factory, allowed, "factory authorization updated");
        Ok(())
    }

    pub fn is_factory_authorized(&self, factory: &Address) -> bool {
        self.factories.contains(factory)
    }

    /// Check `factory` may register `market` without changing anything.
    pub fn ensure_registrable(&self, factory: &Address, market: &Address) -> Result<()> {
        if !self.is_factory_authorized(factory) {
            return Err(MarketError::Unauthorized(format!(
                "factory {factory} is not authorized on the {} adapter",
                self.config.category
            )));
        }
        if self.markets.contains_key(market) {
            return Err(MarketError::AlreadyRegistered(*market));
        }
        Ok(())
    }

    pub fn register_market(&mut self, factory: &Address, market: Address, domain: ValueDomain) -> Result<()> {
        self.ensure_registrable(factory, &market)?;
        self.markets.insert(
            market,
            Registration {
                factory: *factory,
                domain,
                report: None,
                finalization: None,
            },
        );
        Ok(())
    }

    pub fn registration(&self, market: &Address) -> Option<&Registration> {
        self.markets.get(market)
    }

    pub fn status(&self, market: &Address) -> ReportStatus {
        self.markets
            .get(market)
            .map(Registration::status)
            .unwrap_or(ReportStatus::Unreported)
    }

    pub fn report_of(&self, market: &Address) -> Option<&OracleReport> {
        self.markets.get(market).and_then(|r| r.report.as_ref())
    }

    pub fn finalized_value(&self, market: &Address) -> Option<i128> {
        self.markets
            .get(market)
            .and_then(|r| r.finalization.as_ref())
            .map(|f| f.value)
    }

    /// Earliest time an undisputed report for `market` can finalize.
    pub fn ready_at(&self, market: &Address) -> Option<u64> {
        self.report_of(market)
            .map(|r| r.submitted_at.saturating_add(self.config.liveness))
    }

    /// Check a report could be posted right now.
    pub fn ensure_reportable(&self, collateral: &CollateralToken, reporter: &Address, market: &Address, value: i128) -> Result<()> {
        let registration = self.registered(market)?;
        if registration.finalization.is_some() {
            return Err(MarketError::AlreadyFinalized(*market));
        }
        if registration.report.is_some() {
            return Err(MarketError::ReportExists(*market));
        }
        registration.domain.check(value)?;
        collateral.ensure_balance(reporter, self.config.reporter_bond)
    }

    /// Post `value` for `market`, escrowing the reporter bond.
    pub fn report(
        &mut self,
        collateral: &mut CollateralToken,
        reporter: Address,
        market: &Address,
        value: i128,
        now: u64,
    ) -> Result<()> {
        self.ensure_reportable(collateral, &reporter, market, value)?;
        let bond = self.config.reporter_bond;
        if bond > 0 {
            collateral.transfer(reporter, self.address, bond)?;
        }
        let registration = self.registered_mut(market)?;
        registration.report = Some(OracleReport {
            value,
            reporter,
            reporter_bond: bond,
            submitted_at: now,
            disputer: None,
            disputer_bond: 0,
            disputed_at: None,
        });
        info!(%market, %reporter, value, bond, "report submitted");
        Ok(())
    }

    /// Challenge the live report for `market`, escrowing the disputer bond.
    pub fn dispute(
        &mut self,
        collateral: &mut CollateralToken,
        disputer: Address,
        market: &Address,
        now: u64,
    ) -> Result<()> {
        let liveness = self.config.liveness;
        let bond = self.config.disputer_bond;
        let registration = self.registered(market)?;
        if registration.finalization.is_some() {
            return Err(MarketError::AlreadyFinalized(*market));
        }
        let report = registration
            .report
            .as_ref()
            .ok_or(MarketError::NoReport(*market))?;
        if report.is_disputed() {
            return Err(MarketError::ReportDisputed(*market));
        }
        if report.reporter == disputer {
            return Err(MarketError::Oracle(
                "a reporter cannot dispute their own report".to_string(),
            ));
        }
        let deadline = report.submitted_at.saturating_add(liveness);
        if now >= deadline {
            warn!(%market, %disputer, now, deadline, "late dispute rejected");
            return Err(MarketError::DisputeWindowClosed { now, deadline });
        }
        collateral.ensure_balance(&disputer, bond)?;

        if bond > 0 {
            collateral.transfer(disputer, self.address, bond)?;
        }
        if let Some(report) = self.registered_mut(market)?.report.as_mut() {
            report.disputer = Some(disputer);
            report.disputer_bond = bond;
            report.disputed_at = Some(now);
        }
        info!(%market, %disputer, bond, "report disputed");
        Ok(())
    }

    /// Check an undisputed report can finalize at `now`, returning its value.
    pub fn ensure_finalizable(&self, market: &Address, now: u64) -> Result<i128> {
        let registration = self.registered(market)?;
        if registration.finalization.is_some() {
            return Err(MarketError::AlreadyFinalized(*market));
        }
        let report = registration
            .report
            .as_ref()
            .ok_or(MarketError::NoReport(*market))?;
        if report.is_disputed() {
            return Err(MarketError::ReportDisputed(*market));
        }
        let ready_at = report.submitted_at.saturating_add(self.config.liveness);
        if now < ready_at {
            return Err(MarketError::LivenessNotElapsed { now, ready_at });
        }
        Ok(report.value)
    }

    /// Accept an undisputed report after liveness and return the reporter's bond.
    pub fn finalize(&mut self, collateral: &mut CollateralToken, market: &Address, now: u64) -> Result<i128> {
        let value = self.ensure_finalizable(market, now)?;
        let report = self
            .report_of(market)
            .cloned()
            .ok_or(MarketError::NoReport(*market))?;
        self.payout_bonds(collateral, report.reporter, report.reporter_bond)?;
        self.registered_mut(market)?.finalization = Some(Finalization {
            value,
            finalized_at: now,
            adjudicated: false,
            bond_recipient: report.reporter,
            bonds_paid: report.reporter_bond,
        });
        info!(%market, value, "report finalized");
        Ok(value)
    }

    /// Ask `arbitrator` for a ruling and check it, without changing anything.
    pub fn ensure_adjudicable(&self, market: &Address, arbitrator: &dyn Arbitrator) -> Result<(OracleReport, Ruling)> {
        let registration = self.registered(market)?;
        if registration.finalization.is_some() {
            return Err(MarketError::AlreadyFinalized(*market));
        }
        let report = registration
            .report
            .as_ref()
            .ok_or(MarketError::NoReport(*market))?;
        if !report.is_disputed() {
            return Err(MarketError::NotDisputed(*market));
        }
        let ruling = arbitrator.adjudicate(market, report)?;
        registration.domain.check(ruling.final_value)?;
        Ok((report.clone(), ruling))
    }

    /// Settle a disputed report. The winner of the ruling collects both bonds.
    pub fn settle_dispute(
        &mut self,
        collateral: &mut CollateralToken,
        market: &Address,
        arbitrator: &dyn Arbitrator,
        now: u64,
    ) -> Result<i128> {
        let (report, ruling) = self.ensure_adjudicable(market, arbitrator)?;
        let winner = match ruling.bond_winner {
            Party::Reporter => report.reporter,
            Party::Disputer => report
                .disputer
                .ok_or(MarketError::NotDisputed(*market))?,
        };
        let pot = report
            .reporter_bond
            .checked_add(report.disputer_bond)
            .ok_or(MarketError::Overflow("bond pot"))?;
        self.payout_bonds(collateral, winner, pot)?;
        self.registered_mut(market)?.finalization = Some(Finalization {
            value: ruling.final_value,
            finalized_at: now,
            adjudicated: true,
            bond_recipient: winner,
            bonds_paid: pot,
        });
        info!(
            %market,
            value = ruling.final_value,
            winner = ?ruling.bond_winner,
            pot,
            "dispute adjudicated"
        );
        Ok(ruling.final_value)
    }

    /// Bonds currently escrowed by this adapter.
    pub fn escrowed(&self, collateral: &CollateralToken) -> u128 {
        collateral.balance_of(&self.address)
    }

    fn payout_bonds(&self, collateral: &mut CollateralToken, to: Address, amount: u128) -> Result<()> {
        if amount > 0 {
            collateral.transfer(self.address, to, amount)?;
        }
        Ok(())
    }

    fn registered(&self, market: &Address) -> Result<&Registration> {
        self.markets
            .get(market)
            .ok_or_else(|| MarketError::MarketNotFound(market.to_string()))
    }

    fn registered_mut(&mut self, market: &Address) -> Result<&mut Registration> {
        self.markets
            .get_mut(market)
            .ok_or_else(|| MarketError::MarketNotFound(market.to_string()))
    }
}
