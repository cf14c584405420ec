//! # Fee Router
//!
//! Receives the fee leg of every trade and forwards accumulated fees to a
//! configured recipient. It keeps per-market attribution for reporting but
//! has no market logic of its own.

use crate::{collateral::CollateralToken, error::Result, utils::Address, MarketError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct FeeRouter {
    /// Custody address fees are paid into
    pub address: Address,
    /// Where `distribute` sends fees (e.g. protocol treasury)
    pub recipient: Address,
    /// May change the recipient
    pub admin: Address,
    accrued: BTreeMap<Address, u128>,
    total_accrued: u128,
    total_distributed: u128,
}

impl FeeRouter {
    pub fn new(address: Address, recipient: Address, admin: Address) -> Result<Self> {
        if address.is_zero() {
            return Err(MarketError::ZeroAddress("fee router"));
        }
        if recipient.is_zero() {
            return Err(MarketError::ZeroAddress("fee recipient"));
        }
        Ok(Self {
            address,
            recipient,
            admin,
            accrued: BTreeMap::new(),
            total_accrued: 0,
            total_distributed: 0,
        })
    }

    /// Attribute a fee already transferred to the router to `market`.
    pub fn record(&mut self, market: Address, fee: u128) {
        if fee == 0 {
            return;
        }
        *self.accrued.entry(market).or_insert(0) += fee;
        self.total_accrued += fee;
    }

    /// Lifetime fees attributed to `market`.
    pub fn accrued_for(&self, market: &Address) -> u128 {
        self.accrued.get(market).copied().unwrap_or(0)
    }

    pub fn total_accrued(&self) -> u128 {
        self.total_accrued
    }

    pub fn total_distributed(&self) -> u128 {
        self.total_distributed
    }

    /// Fees held by the router and not yet distributed.
    pub fn pending(&self, collateral: &CollateralToken) -> u128 {
        collateral.balance_of(&self.address)
    }

    /// Send everything the router holds to the recipient. Anyone may trigger it.
    pub fn distribute(&mut self, collateral: &mut CollateralToken) -> Result<u128> {
        let amount = self.pending(collateral);
        if amount == 0 {
            return Err(MarketError::NothingToDistribute);
        }
        collateral.transfer(self.address, self.recipient, amount)?;
        self.total_distributed += amount;
        info!(recipient = %self.recipient, amount, "fees distributed");
        Ok(amount)
    }

    pub fn set_recipient(&mut self, caller: &Address, recipient: Address) -> Result<()> {
        if *caller != self.admin {
            return Err(MarketError::Unauthorized(format!(
                "{caller} is not the fee router admin"
            )));
        }
        if recipient.is_zero() {
            return Err(MarketError::ZeroAddress("fee recipient"));
        }
        self.recipient = recipient;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UNIT;

    fn router() -> (FeeRouter, CollateralToken) {
        let router = FeeRouter::new(
            Address::from_label("router"),
            Address::from_label("treasury"),
            Address::from_label("admin"),
        )
        .unwrap();
        (router, CollateralToken::new("WETH"))
    }

    #[test]
    fn test_record_and_distribute() {
        let (mut router, mut collateral) = router();
        let m1 = Address::from_label("m1");
        let m2 = Address::from_label("m2");

        collateral.deposit(router.address, 3 * UNIT).unwrap();
        router.record(m1, 2 * UNIT);
        router.record(m2, UNIT);

        assert_eq!(router.accrued_for(&m1), 2 * UNIT);
        assert_eq!(router.total_accrued(), 3 * UNIT);
        assert_eq!(router.pending(&collateral), 3 * UNIT);

        assert_eq!(router.distribute(&mut collateral).unwrap(), 3 * UNIT);
        assert_eq!(collateral.balance_of(&router.recipient), 3 * UNIT);
        assert_eq!(router.pending(&collateral), 0);
        assert_eq!(router.total_distributed(), 3 * UNIT);
    }

    #[test]
    fn test_distribute_empty() {
        let (mut router, mut collateral) = router();
        assert!(matches!(
            router.distribute(&mut collateral),
            Err(MarketError::NothingToDistribute)
        ));
    }

    #[test]
    fn test_set_recipient_admin_only() {
        let (mut router, _) = router();
        let admin = Address::from_label("admin");
        let other = Address::from_label("other");
        assert!(router.set_recipient(&other, other).is_err());
        router.set_recipient(&admin, other).unwrap();
        assert_eq!(router.recipient, other);
    }
}
