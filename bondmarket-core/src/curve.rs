//! # Bonding Curve
//!
//! Pricing math shared by every market variant. All amounts are `UNIT`-scaled
//! fixed point, every product is formed before its quotient and every quotient
//! truncates toward zero.
//!
//! For an outcome with outstanding supply `q` in a market with `K` outcomes and
//! liquidity parameter `L`, buying `s` shares costs `s * K * L / q`. Binary and
//! scalar markets have `K = 2`, giving the familiar `s * 2L / q`.

use crate::{error::Result, MarketError, BPS_DENOMINATOR, UNIT};
use serde::{Deserialize, Serialize};

/// Scale used for inverse supplies when normalising prices into probabilities.
const INVERSE_SCALE: u128 = 1_000_000_000_000_000_000_000_000_000_000;

/// Price breakdown of a trade.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct TradeQuote {
    /// Outcome index being traded
    pub outcome: usize,
    /// Shares bought or sold
    pub shares: u128,
    /// Base cost on the curve
    pub cost: u128,
    /// Fee routed to the fee router
    pub fee: u128,
    /// `cost + fee` for a buy, `cost - fee` for a sell
    pub total: u128,
}

/// `a * b / c` with checked multiplication, truncating.
pub fn mul_div(a: u128, b: u128, c: u128, context: &'static str) -> Result<u128> {
    if c == 0 {
        return Err(MarketError::InvalidTrade(format!(
            "division by zero in {context}"
        )));
    }
    a.checked_mul(b)
        .map(|p| p / c)
        .ok_or(MarketError::Overflow(context))
}

/// Largest supply an outcome may reach, so `supply * UNIT` stays in range.
pub const MAX_OUTCOME_SUPPLY: u128 = u128::MAX / UNIT;

/// Widest scalar range whose interpolation `offset * UNIT` stays in range.
pub const MAX_SCALAR_SPAN: u128 = u128::MAX / UNIT;

/// Liquidity pooled across all outcomes (`K * L`).
pub fn pooled_liquidity(liquidity: u128, outcomes: usize) -> Result<u128> {
    liquidity
        .checked_mul(outcomes as u128)
        .ok_or(MarketError::Overflow("pooled liquidity"))
}

/// Base collateral cost of `shares` against an outcome whose supply is `supply`.
pub fn base_cost(shares: u128, supply: u128, liquidity: u128, outcomes: usize) -> Result<u128> {
    if supply == 0 {
        return Err(MarketError::InvalidTrade(
            "outcome supply is zero".to_string(),
        ));
    }
    let pooled = pooled_liquidity(liquidity, outcomes)?;
    mul_div(shares, pooled, supply, "trade cost")
}

/// Trading fee charged on a collateral leg.
pub fn trade_fee(cost: u128, fee_bps: u16) -> Result<u128> {
    mul_div(cost, fee_bps as u128, BPS_DENOMINATOR, "trade fee")
}

/// Marginal price of one whole share, in collateral units.
pub fn marginal_price(supply: u128, liquidity: u128, outcomes: usize) -> Result<u128> {
    base_cost(UNIT, supply, liquidity, outcomes)
}

/// Quote a buy of `shares` of `outcome` given all supplies.
pub fn quote_buy(
    supplies: &[u128],
    outcome: usize,
    shares: u128,
    liquidity: u128,
    fee_bps: u16,
) -> Result<TradeQuote> {
    let supply = supply_at(supplies, outcome)?;
    let cost = base_cost(shares, supply, liquidity, supplies.len())?;
    let fee = trade_fee(cost, fee_bps)?;
    let total = cost
        .checked_add(fee)
        .ok_or(MarketError::Overflow("buy total"))?;
    Ok(TradeQuote {
        outcome,
        shares,
        cost,
        fee,
        total,
    })
}

/// Quote a sell of `shares` of `outcome`, priced at the supply before burning.
///
/// Rejects sells that would bring the outcome supply to zero.
pub fn quote_sell(
    supplies: &[u128],
    outcome: usize,
    shares: u128,
    liquidity: u128,
    fee_bps: u16,
) -> Result<TradeQuote> {
    let supply = supply_at(supplies, outcome)?;
    if shares >= supply {
        return Err(MarketError::SupplyExhausted(outcome));
    }
    let cost = base_cost(shares, supply, liquidity, supplies.len())?;
    let fee = trade_fee(cost, fee_bps)?;
    Ok(TradeQuote {
        outcome,
        shares,
        cost,
        fee,
        total: cost - fee,
    })
}

/// Normalised prices: each outcome's share of `Σ 1/q_j`, scaled to `UNIT`.
///
/// Growing `q_k` strictly lowers entry `k` and strictly raises every other entry.
pub fn implied_probabilities(supplies: &[u128]) -> Result<Vec<u128>> {
    let inverses = supplies
        .iter()
        .map(|q| {
            if *q == 0 {
                Err(MarketError::InvalidTrade("outcome supply is zero".to_string()))
            } else {
                Ok(INVERSE_SCALE / q)
            }
        })
        .collect::<Result<Vec<_>>>()?;
    let total = inverses
        .iter()
        .try_fold(0u128, |acc, x| acc.checked_add(*x))
        .ok_or(MarketError::Overflow("probability normalisation"))?;
    inverses
        .iter()
        .map(|inv| mul_div(*inv, UNIT, total, "probability normalisation"))
        .collect()
}

/// Linear interpolation of `value` in `[lower, upper]`, clamped to `[0, UNIT]`.
pub fn scalar_ratio(value: i128, lower: i128, upper: i128) -> Result<u128> {
    if lower >= upper {
        return Err(MarketError::InvalidMarket(format!(
            "scalar lower bound {lower} must be below upper bound {upper}"
        )));
    }
    if value <= lower {
        return Ok(0);
    }
    if value >= upper {
        return Ok(UNIT);
    }
    let span = upper.abs_diff(lower);
    let offset = value.abs_diff(lower);
    mul_div(offset, UNIT, span, "scalar interpolation")
}

/// Face value per share of each scalar side: `[LONG, SHORT] = [r, 1 - r]`.
pub fn scalar_face_values(ratio: u128) -> [u128; 2] {
    let ratio = ratio.min(UNIT);
    [ratio, UNIT - ratio]
}

/// Scale `amount` by a `UNIT`-based factor.
pub fn apply_factor(amount: u128, factor: u128) -> Result<u128> {
    mul_div(amount, factor, UNIT, "payout")
}

fn supply_at(supplies: &[u128], outcome: usize) -> Result<u128> {
    supplies
        .get(outcome)
        .copied()
        .ok_or(MarketError::UnknownOutcome {
            index: outcome,
            count: supplies.len(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const L: u128 = 100 * UNIT;

    #[test]
    fn test_binary_buy_quote() {
        let supplies = [100 * UNIT, 100 * UNIT];
        let quote = quote_buy(&supplies, 0, 10 * UNIT, L, 100).unwrap();
        assert_eq!(quote.cost, 20 * UNIT);
        assert_eq!(quote.fee, 200_000);
        assert_eq!(quote.total, 20_200_000);
    }

    #[test]
    fn test_sell_quote_uses_pre_burn_supply() {
        let supplies = [110 * UNIT, 100 * UNIT];
        let quote = quote_sell(&supplies, 0, 10 * UNIT, L, 100).unwrap();
        // 10 * 200 / 110 = 18.181818
        assert_eq!(quote.cost, 18_181_818);
        assert_eq!(quote.fee, 181_818);
        assert_eq!(quote.total, 18_000_000);
    }

    #[test]
    fn test_sell_cannot_exhaust_supply() {
        let supplies = [10 * UNIT, 100 * UNIT];
        let err = quote_sell(&supplies, 0, 10 * UNIT, L, 0).unwrap_err();
        assert!(matches!(err, MarketError::SupplyExhausted(0)));
    }

    #[test]
    fn test_zero_supply_rejected() {
        assert!(base_cost(UNIT, 0, L, 2).is_err());
        assert!(implied_probabilities(&[0, UNIT]).is_err());
    }

    #[test]
    fn test_unknown_outcome() {
        let err = quote_buy(&[UNIT, UNIT], 2, UNIT, L, 0).unwrap_err();
        assert!(matches!(
            err,
            MarketError::UnknownOutcome { index: 2, count: 2 }
        ));
    }

    #[test]
    fn test_marginal_price() {
        assert_eq!(marginal_price(100 * UNIT, L, 2).unwrap(), 2 * UNIT);
        // 200 / 110 = 1.818181
        assert_eq!(marginal_price(110 * UNIT, L, 2).unwrap(), 1_818_181);
    }

    #[test]
    fn test_multi_outcome_pools_all_liquidity() {
        let supplies = [100 * UNIT, 100 * UNIT, 100 * UNIT, 100 * UNIT];
        let quote = quote_buy(&supplies, 3, UNIT, L, 0).unwrap();
        assert_eq!(quote.cost, 4 * UNIT);
    }

    #[test]
    fn test_price_falls_as_supply_grows() {
        let mut last = u128::MAX;
        for q in [50u128, 100, 150, 1000] {
            let p = marginal_price(q * UNIT, L, 3).unwrap();
            assert!(p < last);
            last = p;
        }
    }

    #[test]
    fn test_implied_probabilities_rebalance() {
        let even = implied_probabilities(&[100 * UNIT, 100 * UNIT, 100 * UNIT]).unwrap();
        assert_eq!(even, vec![333_333, 333_333, 333_333]);

        let skewed = implied_probabilities(&[110 * UNIT, 100 * UNIT, 100 * UNIT]).unwrap();
        assert!(skewed[0] < even[0]);
        assert!(skewed[1] > even[1]);
        assert!(skewed[2] > even[2]);
    }

    #[test]
    fn test_fee_truncates() {
        assert_eq!(trade_fee(99, 100).unwrap(), 0);
        assert_eq!(trade_fee(100, 100).unwrap(), 1);
        assert_eq!(trade_fee(1_000, 0).unwrap(), 0);
    }

    #[test]
    fn test_scalar_ratio() {
        assert_eq!(scalar_ratio(50, 0, 100).unwrap(), UNIT / 2);
        assert_eq!(scalar_ratio(-10, 0, 100).unwrap(), 0);
        assert_eq!(scalar_ratio(150, 0, 100).unwrap(), UNIT);
        assert_eq!(scalar_ratio(-50, -100, 100).unwrap(), UNIT / 4);
        assert_eq!(scalar_ratio(1, 0, 3).unwrap(), 333_333);
        assert!(scalar_ratio(1, 5, 5).is_err());
    }

    #[test]
    fn test_scalar_face_values_sum_to_one() {
        for ratio in [0, 1, 333_333, UNIT / 2, UNIT] {
            let [long, short] = scalar_face_values(ratio);
            assert_eq!(long + short, UNIT);
        }
    }

    #[test]
    fn test_mul_div_overflow() {
        let err = mul_div(u128::MAX, 2, 1, "test").unwrap_err();
        assert!(matches!(err, MarketError::Overflow("test")));
    }
}
