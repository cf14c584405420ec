//! # Curation Council
//!
//! An advisory visibility gate over markets. Council members approve new
//! markets, flag problematic ones and reset flagged ones back into review.
//! Curation never touches market state, supplies or collateral: whether a
//! market can trade is decided by the market's own lifecycle.
//!
//! ```text
//! Pending --approve--> Approved
//!    |                    |
//!    +------flag----------+--> Flagged --reset--> Pending
//! ```

use crate::{error::Result, utils::Address, MarketError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::info;

/// Council membership, mutated only by the admin.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CouncilRegistry {
    pub admin: Address,
    members: BTreeSet<Address>,
}

impl CouncilRegistry {
    pub fn new(admin: Address) -> Result<Self> {
        if admin.is_zero() {
            return Err(MarketError::ZeroAddress("council admin"));
        }
        Ok(Self {
            admin,
            members: BTreeSet::new(),
        })
    }

    pub fn is_council_member(&self, who: &Address) -> bool {
        self.members.contains(who)
    }

    pub fn members(&self) -> impl Iterator<Item = &Address> {
        self.members.iter()
    }

    pub fn set_council_member(&mut self, caller: &Address, member: Address, enabled: bool) -> Result<()> {
        if *caller != self.admin {
            return Err(MarketError::Unauthorized(format!(
                "{caller} is not the council admin"
            )));
        }
        if member.is_zero() {
            return Err(MarketError::ZeroAddress("council member"));
        }
        if enabled {
            self.members.insert(member);
        } else {
            self.members.remove(&member);
        }
        info!(%member, enabled, "council membership updated");
        Ok(())
    }

    fn ensure_member(&self, who: &Address) -> Result<()> {
        if !self.is_council_member(who) {
            return Err(MarketError::Unauthorized(format!(
                "{who} is not a council member"
            )));
        }
        Ok(())
    }
}

/// Curation status of a market.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CurationStatus {
    Pending,
    Approved,
    Flagged,
}

impl CurationStatus {
    /// Numeric code exposed to front ends.
    pub fn code(&self) -> u8 {
        match self {
            CurationStatus::Pending => 0,
            CurationStatus::Approved => 1,
            CurationStatus::Flagged => 2,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            CurationStatus::Pending => "pending",
            CurationStatus::Approved => "approved",
            CurationStatus::Flagged => "flagged",
        }
    }
}

impl fmt::Display for CurationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CurationRecord {
    pub status: CurationStatus,
    pub updated_at: u64,
    /// Last council member to act; `None` while untouched since registration
    pub updated_by: Option<Address>,
    /// Times the market went Flagged -> Pending
    pub resets: u32,
}

/// Status map over registered markets.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Curation {
    records: BTreeMap<Address, CurationRecord>,
}

impl Curation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a freshly created market into the review queue.
    pub fn register(&mut self, market: Address, now: u64) -> Result<()> {
        if self.records.contains_key(&market) {
            return Err(MarketError::AlreadyRegistered(market));
        }
        self.records.insert(
            market,
            CurationRecord {
                status: CurationStatus::Pending,
                updated_at: now,
                updated_by: None,
                resets: 0,
            },
        );
        Ok(())
    }

    pub fn record(&self, market: &Address) -> Option<&CurationRecord> {
        self.records.get(market)
    }

    pub fn status_of(&self, market: &Address) -> Result<CurationStatus> {
        self.records
            .get(market)
            .map(|r| r.status)
            .ok_or_else(|| MarketError::MarketNotFound(market.to_string()))
    }

    /// Markets currently approved for display.
    pub fn listed(&self) -> Vec<Address> {
        self.with_status(CurationStatus::Approved)
    }

    pub fn with_status(&self, status: CurationStatus) -> Vec<Address> {
        self.records
            .iter()
            .filter(|(_, r)| r.status == status)
            .map(|(m, _)| *m)
            .collect()
    }

    pub fn approve_market(
        &mut self,
        council: &CouncilRegistry,
        caller: &Address,
        market: &Address,
        now: u64,
    ) -> Result<()> {
        self.transition(council, caller, market, now, "approve", |s| {
            matches!(s, CurationStatus::Pending).then_some(CurationStatus::Approved)
        })
    }

    pub fn flag_market(
        &mut self,
        council: &CouncilRegistry,
        caller: &Address,
        market: &Address,
        now: u64,
    ) -> Result<()> {
        self.transition(council, caller, market, now, "flag", |s| {
            matches!(s, CurationStatus::Pending | CurationStatus::Approved)
                .then_some(CurationStatus::Flagged)
        })
    }

    pub fn reset_market(
        &mut self,
        council: &CouncilRegistry,
        caller: &Address,
        market: &Address,
        now: u64,
    ) -> Result<()> {
        self.transition(council, caller, market, now, "reset", |s| {
            matches!(s, CurationStatus::Flagged).then_some(CurationStatus::Pending)
        })?;
        if let Some(record) = self.records.get_mut(market) {
            record.resets += 1;
        }
        Ok(())
    }

    fn transition(
        &mut self,
        council: &CouncilRegistry,
        caller: &Address,
        market: &Address,
        now: u64,
        action: &'static str,
        next: impl Fn(CurationStatus) -> Option<CurationStatus>,
    ) -> Result<()> {
        council.ensure_member(caller)?;
        let record = self
            .records
            .get_mut(market)
            .ok_or_else(|| MarketError::MarketNotFound(market.to_string()))?;
        let status = next(record.status).ok_or(MarketError::InvalidTransition {
            action,
            status: record.status.as_str(),
        })?;
        info!(%market, from = %record.status, to = %status, by = %caller, "curation status changed");
        record.status = status;
        record.updated_at = now;
        record.updated_by = Some(*caller);
        Ok(())
    }
}
